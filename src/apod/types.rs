//! Type definitions for the APOD module.

use serde::Serialize;
use serde_json::Value;
use tokio::time::Duration;

/// Primary content of a fetched APOD record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApodMedia {
    /// A displayable image; `url` is the resolved display URL, `None`
    /// when the record carried no usable one
    Image { url: Option<String> },
    /// Any other media kind (video and so on); the raw media URL is
    /// kept for the open-in-browser note
    Other {
        media_type: String,
        url: Option<String>,
    },
}

/// One successfully fetched APOD record, normalized for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApodRecord {
    pub title: String,
    pub media: ApodMedia,
    /// NASA-provided description; empty when the service sent none
    pub explanation: String,
}

impl ApodRecord {
    /// Builds a record from the service's success JSON. The HD flag
    /// resolves which image URL becomes the display URL; empty-string
    /// URLs count as absent.
    pub fn from_json(data: &Value, hd: bool) -> Self {
        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_TITLE)
            .to_string();
        let explanation = data
            .get("explanation")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let media_type = data
            .get("media_type")
            .and_then(Value::as_str)
            .unwrap_or("image");

        let url = non_empty(data.get("url"));
        let media = if media_type == "image" {
            let hdurl = non_empty(data.get("hdurl"));
            let display = if hd { hdurl.or(url) } else { url };
            ApodMedia::Image { url: display }
        } else {
            ApodMedia::Other {
                media_type: media_type.to_string(),
                url,
            }
        };

        ApodRecord {
            title,
            media,
            explanation,
        }
    }

    /// The URL to render as an image, when there is one.
    pub fn image_url(&self) -> Option<&str> {
        match &self.media {
            ApodMedia::Image { url } => url.as_deref(),
            ApodMedia::Other { .. } => None,
        }
    }

    /// Text for the explanation field: the NASA description for images,
    /// or the open-in-browser note for anything else.
    pub fn display_text(&self) -> String {
        match &self.media {
            ApodMedia::Image { .. } => self.explanation.clone(),
            ApodMedia::Other { media_type, url } => format!(
                "This APOD is a {}. Open in browser: {}\n\n{}",
                media_type,
                url.as_deref().unwrap_or_default(),
                self.explanation
            ),
        }
    }
}

/// Soft fetch failure, tagged so callers and tests can branch on the
/// kind; flattened to display strings only in [`ApodResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApodError {
    /// Transport failure: connect error, timeout, unreadable or
    /// undecodable body
    Network(String),
    /// Non-success HTTP status, with the message extracted from the body
    Http { status: u16, message: String },
    /// Success status whose JSON body carried an `error` field
    Api(String),
}

/// The flattened triple handed to the presentation layer. Fetch errors
/// become descriptive text here; the rendered output has no separate
/// error channel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ApodResult {
    pub title: String,
    pub image_url: Option<String>,
    pub explanation: String,
}

impl From<&Result<ApodRecord, ApodError>> for ApodResult {
    fn from(outcome: &Result<ApodRecord, ApodError>) -> Self {
        match outcome {
            Ok(record) => ApodResult {
                title: record.title.clone(),
                image_url: record.image_url().map(str::to_string),
                explanation: record.display_text(),
            },
            Err(ApodError::Network(message)) => ApodResult {
                title: "Network error".to_string(),
                image_url: None,
                explanation: message.clone(),
            },
            Err(ApodError::Http { status, message }) => ApodResult {
                title: "Error fetching APOD".to_string(),
                image_url: None,
                explanation: format!("{}: {}", status, message),
            },
            Err(ApodError::Api(message)) => ApodResult {
                title: "API error".to_string(),
                image_url: None,
                explanation: message.clone(),
            },
        }
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Constants
pub const APOD_ENDPOINT: &str = "https://api.nasa.gov/planetary/apod";
pub const DEMO_KEY: &str = "DEMO_KEY";
pub const DEFAULT_TITLE: &str = "Astronomy Picture of the Day";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
