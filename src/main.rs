use anyhow::Result;
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use stargazer::apod::ApodClient;
use stargazer::environment::Config;
use stargazer::llm::OpenAiNarrator;
use stargazer::logging::configure_logging;
use stargazer::web::{self, AppState};

#[derive(Parser, Debug)]
#[clap(about = "NASA APOD explorer with stargazer narration")]
struct Args {
    /// Port to serve on (overrides PORT)
    #[clap(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[clap(long, default_value = "0.0.0.0")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading configuration
    let _ = dotenvy::dotenv();

    configure_logging();

    let args = Args::parse();
    let config = Config::from_env();

    let apod = ApodClient::with_base_url(
        config.nasa_api_key.clone(),
        config.apod_base_url.clone(),
    )?;

    let openai_config = match &config.openai_api_key {
        Some(api_key) => OpenAIConfig::new().with_api_key(api_key.clone()),
        None => OpenAIConfig::new(),
    };
    let mut narrator = OpenAiNarrator::new(
        OpenAIClient::with_config(openai_config),
        config.model.clone(),
    );
    if let Some(temperature) = config.temperature {
        narrator = narrator.with_temperature(temperature);
    }

    let state = AppState {
        apod,
        narrator: Arc::new(narrator),
        timeout: config.request_timeout,
    };

    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", args.bind, port);

    info!(
        "Starting APOD explorer (model: {}, timeout: {}s)",
        config.model,
        config.request_timeout.as_secs()
    );

    web::serve(state, &addr).await
}
