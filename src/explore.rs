//! Request orchestration: one metadata fetch, then conditional narration.

use anyhow::Result;
use serde::Serialize;
use tokio::time::Duration;
use tracing::{debug, info};

use crate::apod::{ApodClient, ApodResult};
use crate::llm::NarrationService;
use crate::TARGET_LLM_REQUEST;

/// Everything the presentation layer renders for one request. `spacer`
/// stays empty; the page keeps a trailing layout cell.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApodView {
    pub title: String,
    pub image_url: Option<String>,
    pub narration: String,
    pub spacer: String,
}

/// Run one explore request: fetch the metadata, then narrate only when
/// an image came back. Without an image the fetched explanation, note,
/// or error text passes through unchanged. A narration failure is the
/// one hard error here and propagates to the caller.
pub async fn explore(
    apod: &ApodClient,
    narrator: &dyn NarrationService,
    date: Option<&str>,
    hd: bool,
    timeout: Duration,
) -> Result<ApodView> {
    let outcome = apod.fetch(date, hd, timeout).await;
    let result = ApodResult::from(&outcome);

    let narration = match &result.image_url {
        Some(url) => {
            info!(target: TARGET_LLM_REQUEST, "Narrating '{}'", result.title);
            narrator.narrate(&result.title, url, timeout).await?
        }
        None => {
            debug!(
                target: TARGET_LLM_REQUEST,
                "No image for '{}'; passing text through", result.title
            );
            result.explanation.clone()
        }
    };

    Ok(ApodView {
        title: result.title,
        image_url: result.image_url,
        narration,
        spacer: String::new(),
    })
}
