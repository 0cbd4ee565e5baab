use clap::Parser;
use tokio::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use stargazer::apod::{ApodClient, ApodResult, APOD_ENDPOINT, DEMO_KEY};

#[derive(Parser, Debug)]
#[clap(about = "Fetch one APOD record and print the classified result")]
struct Args {
    /// Date to fetch (YYYY-MM-DD); omit for today
    #[clap(short, long)]
    date: Option<String>,

    /// Ask for the high-definition image variant
    #[clap(long)]
    hd: bool,

    /// NASA API key (falls back to NASA_API_KEY, then the demo key)
    #[clap(short, long)]
    api_key: Option<String>,

    /// APOD endpoint to hit
    #[clap(long, default_value = APOD_ENDPOINT)]
    base_url: String,

    /// Request timeout in seconds
    #[clap(short, long, default_value = "20")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let api_key = args
        .api_key
        .or_else(|| std::env::var("NASA_API_KEY").ok())
        .unwrap_or_else(|| DEMO_KEY.to_string());

    info!(
        "Fetching APOD from {} (date: {:?}, hd: {})",
        args.base_url, args.date, args.hd
    );

    let client = ApodClient::with_base_url(api_key, args.base_url)?;
    let outcome = client
        .fetch(
            args.date.as_deref(),
            args.hd,
            Duration::from_secs(args.timeout),
        )
        .await;

    match &outcome {
        Ok(record) => info!("Classified as a record: {:#?}", record),
        Err(err) => info!("Classified as an error: {:?}", err),
    }

    let result = ApodResult::from(&outcome);
    println!("Title:       {}", result.title);
    println!("Image URL:   {}", result.image_url.as_deref().unwrap_or("-"));
    println!("Explanation: {}", result.explanation);

    Ok(())
}
