//! APOD metadata fetching for stargazer.
//!
//! This module handles requesting, classifying, and normalizing
//! Astronomy Picture of the Day records from the NASA service.

mod client;
mod types;

pub use self::client::ApodClient;
pub use self::types::*;
