//! Form-based web UI over the explore pipeline.

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::Duration;
use tracing::{error, info};

use crate::apod::ApodClient;
use crate::explore::{explore, ApodView};
use crate::llm::NarrationService;
use crate::TARGET_WEB_REQUEST;

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub apod: ApodClient,
    pub narrator: Arc<dyn NarrationService>,
    pub timeout: Duration,
}

/// Form and query inputs. The HD checkbox arrives as `on` from the
/// form and as `true` or `1` from API callers; a blank date means
/// "today".
#[derive(Debug, Deserialize)]
pub struct ExploreQuery {
    date: Option<String>,
    hd: Option<String>,
}

impl ExploreQuery {
    fn date(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    fn hd(&self) -> bool {
        self.hd.as_deref().map(str::trim).is_some_and(|v| {
            v.eq_ignore_ascii_case("on") || v.eq_ignore_ascii_case("true") || v == "1"
        })
    }
}

/// Narration failures surface as 502 with the error text. Fetch
/// problems never reach this path; they flatten into the rendered view.
struct NarrationError(anyhow::Error);

impl From<anyhow::Error> for NarrationError {
    fn from(err: anyhow::Error) -> Self {
        NarrationError(err)
    }
}

impl IntoResponse for NarrationError {
    fn into_response(self) -> Response {
        error!("Narration failed: {:#}", self.0);
        (
            StatusCode::BAD_GATEWAY,
            format!("Explanation service failed: {:#}", self.0),
        )
            .into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/explore", get(explore_page))
        .route("/api/apod", get(explore_json))
        .with_state(state)
}

/// Binds and serves the UI until the process exits.
pub async fn serve(state: AppState, addr: &str) -> Result<()> {
    let app = router(state);
    let listener = TcpListener::bind(addr).await?;

    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

async fn form_page() -> Html<String> {
    Html(render_page(None))
}

async fn explore_page(
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> Result<Html<String>, NarrationError> {
    info!(
        target: TARGET_WEB_REQUEST,
        "Explore request (date: {:?}, hd: {})", query.date(), query.hd()
    );
    let view = explore(
        &state.apod,
        state.narrator.as_ref(),
        query.date(),
        query.hd(),
        state.timeout,
    )
    .await?;
    Ok(Html(render_page(Some(&view))))
}

async fn explore_json(
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> Result<Json<ApodView>, NarrationError> {
    info!(
        target: TARGET_WEB_REQUEST,
        "API request (date: {:?}, hd: {})", query.date(), query.hd()
    );
    let view = explore(
        &state.apod,
        state.narrator.as_ref(),
        query.date(),
        query.hd(),
        state.timeout,
    )
    .await?;
    Ok(Json(view))
}

const PAGE_TITLE: &str = "🚀 NASA Astronomy Picture of the Day (APOD)";
const PAGE_DESCRIPTION: &str = "Enter optionally a date and check the HD checkbox to view the \
APOD in high definition and get the story from OpenAI-GPT-4o-mini.";

fn render_page(view: Option<&ApodView>) -> String {
    let result = match view {
        Some(view) => {
            let image = match &view.image_url {
                Some(url) => format!(
                    r#"<p><img src="{}" alt="NASA APOD Image" style="max-width:100%"></p>"#,
                    escape_html(url)
                ),
                None => String::new(),
            };
            format!(
                r#"<section>
  <h2>{title}</h2>
  {image}
  <h3>Explanation from OpenAI-GPT-4o-mini</h3>
  <p style="white-space:pre-line">{narration}</p>
  <div class="spacer">{spacer}</div>
</section>"#,
                title = escape_html(&view.title),
                image = image,
                narration = escape_html(&view.narration),
                spacer = escape_html(&view.spacer),
            )
        }
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{page_title}</title>
</head>
<body>
<h1>{page_title}</h1>
<p>{description}</p>
<form action="/explore" method="get">
  <label>Date (YYYY-MM-DD)
    <input type="text" name="date" placeholder="Optional, leave blank for today">
  </label>
  <label><input type="checkbox" name="hd"> High Definition Image (HD)</label>
  <button type="submit">Explore</button>
</form>
{result}
</body>
</html>"#,
        page_title = PAGE_TITLE,
        description = PAGE_DESCRIPTION,
        result = result,
    )
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::routing::get as axum_get;

    struct FixedNarrator(&'static str);

    #[async_trait]
    impl NarrationService for FixedNarrator {
        async fn narrate(&self, _title: &str, _image_url: &str, _timeout: Duration) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenNarrator;

    #[async_trait]
    impl NarrationService for BrokenNarrator {
        async fn narrate(&self, _title: &str, _image_url: &str, _timeout: Duration) -> Result<String> {
            Err(anyhow!("completion service unavailable"))
        }
    }

    async fn serve_apod(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route("/apod", axum_get(move || async move { (status, body) }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        format!("http://{}/apod", addr)
    }

    async fn serve_ui(state: AppState) -> String {
        let app = router(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service()).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn state_with(apod_url: String, narrator: Arc<dyn NarrationService>) -> AppState {
        AppState {
            apod: ApodClient::with_base_url("k", apod_url).unwrap(),
            narrator,
            timeout: Duration::from_secs(5),
        }
    }

    fn query(date: Option<&str>, hd: Option<&str>) -> ExploreQuery {
        ExploreQuery {
            date: date.map(str::to_string),
            hd: hd.map(str::to_string),
        }
    }

    #[test]
    fn blank_and_whitespace_dates_mean_today() {
        assert_eq!(query(None, None).date(), None);
        assert_eq!(query(Some(""), None).date(), None);
        assert_eq!(query(Some("   "), None).date(), None);
        assert_eq!(query(Some(" 2024-06-01 "), None).date(), Some("2024-06-01"));
    }

    #[test]
    fn hd_accepts_checkbox_and_api_spellings() {
        assert!(query(None, Some("on")).hd());
        assert!(query(None, Some("true")).hd());
        assert!(query(None, Some("True")).hd());
        assert!(query(None, Some("1")).hd());
        assert!(!query(None, Some("off")).hd());
        assert!(!query(None, Some("0")).hd());
        assert!(!query(None, None).hd());
    }

    #[test]
    fn escape_html_covers_the_usual_suspects() {
        assert_eq!(
            escape_html(r#"<b>"A & B"</b>'s"#),
            "&lt;b&gt;&quot;A &amp; B&quot;&lt;/b&gt;&#39;s"
        );
    }

    #[test]
    fn bare_page_has_the_form_and_no_result() {
        let page = render_page(None);
        assert!(page.contains(PAGE_TITLE));
        assert!(page.contains(r#"<form action="/explore" method="get">"#));
        assert!(page.contains(r#"name="date""#));
        assert!(page.contains(r#"name="hd""#));
        assert!(!page.contains("<section>"));
    }

    #[test]
    fn result_page_escapes_and_renders_the_view() {
        let view = ApodView {
            title: "Comet <Halley>".to_string(),
            image_url: Some("http://x/img.jpg".to_string()),
            narration: "dust & light".to_string(),
            spacer: String::new(),
        };
        let page = render_page(Some(&view));
        assert!(page.contains("Comet &lt;Halley&gt;"));
        assert!(page.contains(r#"<img src="http://x/img.jpg""#));
        assert!(page.contains("dust &amp; light"));
    }

    #[test]
    fn imageless_view_renders_without_an_img_tag() {
        let view = ApodView {
            title: "Comet".to_string(),
            image_url: None,
            narration: "This APOD is a video. Open in browser: http://y/vid.mp4\n\nd".to_string(),
            spacer: String::new(),
        };
        let page = render_page(Some(&view));
        assert!(!page.contains("<img"));
        assert!(page.contains("This APOD is a video."));
    }

    #[tokio::test]
    async fn api_endpoint_returns_the_view_as_json() {
        let apod_url = serve_apod(
            StatusCode::OK,
            r#"{"title":"Pillars","url":"http://x/img.jpg","media_type":"image","explanation":"desc"}"#,
        )
        .await;
        let ui = serve_ui(state_with(apod_url, Arc::new(FixedNarrator("A tale.")))).await;

        let view: serde_json::Value = reqwest::get(format!("{}/api/apod?hd=true", ui))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(view["title"], "Pillars");
        assert_eq!(view["image_url"], "http://x/img.jpg");
        assert_eq!(view["narration"], "A tale.");
        assert_eq!(view["spacer"], "");
    }

    #[tokio::test]
    async fn explore_page_renders_the_narrated_result() {
        let apod_url = serve_apod(
            StatusCode::OK,
            r#"{"title":"Pillars","url":"http://x/img.jpg","media_type":"image","explanation":"desc"}"#,
        )
        .await;
        let ui = serve_ui(state_with(apod_url, Arc::new(FixedNarrator("A tale.")))).await;

        let response = reqwest::get(format!("{}/explore?date=&hd=on", ui)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = response.text().await.unwrap();
        assert!(page.contains("<h2>Pillars</h2>"));
        assert!(page.contains("A tale."));
    }

    #[tokio::test]
    async fn fetch_errors_still_render_a_page() {
        let apod_url = serve_apod(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"message":"Date must be between Jun 16, 1995 and today."}}"#,
        )
        .await;
        let ui = serve_ui(state_with(apod_url, Arc::new(FixedNarrator("unused")))).await;

        let response = reqwest::get(format!("{}/explore?date=1066-01-01", ui)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = response.text().await.unwrap();
        assert!(page.contains("Error fetching APOD"));
        assert!(page.contains("400: Date must be between Jun 16, 1995 and today."));
    }

    #[tokio::test]
    async fn narration_failure_becomes_a_502() {
        let apod_url = serve_apod(
            StatusCode::OK,
            r#"{"title":"Pillars","url":"http://x/img.jpg","media_type":"image","explanation":"desc"}"#,
        )
        .await;
        let ui = serve_ui(state_with(apod_url, Arc::new(BrokenNarrator))).await;

        let response = reqwest::get(format!("{}/explore", ui)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.text().await.unwrap();
        assert!(body.contains("completion service unavailable"));
    }
}
