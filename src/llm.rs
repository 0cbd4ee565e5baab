//! Narration over a chat-completion service.

use anyhow::{anyhow, Context, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client as OpenAIClient;
use async_trait::async_trait;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::prompts::{image_explanation_prompt, STARGAZER_PERSONA};
use crate::TARGET_LLM_REQUEST;

/// Completion model used unless OPENAI_MODEL overrides it.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Turns an APOD title into stargazer narration. `image_url` travels
/// with every call but is not referenced in the prompt body.
#[async_trait]
pub trait NarrationService: Send + Sync {
    /// Generate the explanation for one picture. Failures propagate to
    /// the caller; there is no retry.
    async fn narrate(&self, title: &str, image_url: &str, timeout: Duration) -> Result<String>;
}

/// Narrator backed by an OpenAI-compatible chat completion API.
pub struct OpenAiNarrator {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiNarrator {
    pub fn new(client: OpenAIClient<OpenAIConfig>, model: impl Into<String>) -> Self {
        OpenAiNarrator {
            client,
            model: model.into(),
            temperature: None,
        }
    }

    /// Override the service-default sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl NarrationService for OpenAiNarrator {
    async fn narrate(&self, title: &str, image_url: &str, budget: Duration) -> Result<String> {
        debug!(
            target: TARGET_LLM_REQUEST,
            "Requesting narration for '{}' ({}) from {}", title, image_url, self.model
        );

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(STARGAZER_PERSONA)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(image_explanation_prompt(title))
                .build()?
                .into(),
        ]);
        if let Some(temperature) = self.temperature {
            builder.temperature(temperature);
        }
        let request = builder.build()?;

        let response = match timeout(budget, self.client.chat().create(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(target: TARGET_LLM_REQUEST, "Narration request failed: {}", e);
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    target: TARGET_LLM_REQUEST,
                    "Narration request timed out after {} seconds", budget.as_secs()
                );
                return Err(anyhow!(
                    "narration request timed out after {} seconds",
                    budget.as_secs()
                ));
            }
        };

        debug!(target: TARGET_LLM_REQUEST, "Narration received for '{}'", title);

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("completion response contained no message content")
    }
}
