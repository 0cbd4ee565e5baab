pub mod apod;
pub mod environment;
pub mod explore;
pub mod llm;
pub mod logging;
pub mod prompts;
pub mod web;

pub use apod::{ApodClient, ApodError, ApodRecord, ApodResult};
pub use explore::{explore, ApodView};
pub use llm::{NarrationService, OpenAiNarrator};

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
