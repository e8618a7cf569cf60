// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

use crate::error::Result;
use crate::models::CheckerConfig;

/// Create the HTTP client shared by the page check and the SMS gateway.
///
/// The configured timeout is the client default; callers with a tighter
/// budget set a per-request timeout.
pub fn create_client(config: &CheckerConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_str(&config.accept)?);

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page, returning its status code and body text.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<(u16, String)> {
    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;
    Ok((status, text))
}
