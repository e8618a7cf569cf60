// src/services/checker.rs

//! Event page availability checker.
//!
//! Fetches the event page and looks for phrases the ticket site shows when
//! nothing is listed. Absence of all of them counts as "available".

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Availability, CheckerConfig};
use crate::utils::http::fetch_text;

/// Anything that can tell whether tickets are listed at a URL.
#[async_trait]
pub trait AvailabilitySource: Send + Sync {
    /// Classify the page at `url`.
    ///
    /// Transport failures and non-200 responses are errors; the caller
    /// decides the fallback.
    async fn check(&self, url: &str) -> Result<Availability>;
}

/// Classify a page body against lower-case denylist phrases.
pub fn classify<S: AsRef<str>>(body: &str, phrases: &[S]) -> Availability {
    let text = body.to_lowercase();
    phrases
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .find(|p| text.contains(p.as_str()))
        .map(|phrase| Availability::Unavailable { phrase })
        .unwrap_or(Availability::Available)
}

/// HTTP-backed availability checker.
pub struct AvailabilityChecker {
    client: Client,
    phrases: Vec<String>,
}

impl AvailabilityChecker {
    /// Create a checker using a client built by [`crate::utils::http::create_client`].
    pub fn new(client: Client, config: &CheckerConfig) -> Self {
        Self {
            client,
            phrases: config.unavailable_phrases.clone(),
        }
    }
}

#[async_trait]
impl AvailabilitySource for AvailabilityChecker {
    async fn check(&self, url: &str) -> Result<Availability> {
        let (status, body) = fetch_text(&self.client, url).await?;

        // Anything but exactly 200 is treated as "not available" upstream,
        // including other 2xx codes.
        if status != 200 {
            return Err(AppError::status(url, status));
        }

        let availability = classify(&body, &self.phrases);
        if let Availability::Unavailable { phrase } = &availability {
            log::debug!("Event page contains \"{}\"", phrase);
        }
        Ok(availability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::create_client;

    fn default_phrases() -> Vec<String> {
        CheckerConfig::default().unavailable_phrases
    }

    fn checker() -> AvailabilityChecker {
        let config = CheckerConfig::default();
        AvailabilityChecker::new(create_client(&config).unwrap(), &config)
    }

    #[test]
    fn test_classify_denylist_any_case() {
        let phrases = default_phrases();
        for body in [
            "<p>Sorry, we don't currently have any tickets available</p>",
            "<div>NO RESULTS FOUND</div>",
            "Ticket Alerts Not Currently Available for this event",
        ] {
            assert!(
                !classify(body, &phrases).is_available(),
                "expected unavailable for {body:?}"
            );
        }
    }

    #[test]
    fn test_classify_reports_matched_phrase() {
        let result = classify("<b>No Results Found</b>", &default_phrases());
        assert_eq!(
            result,
            Availability::Unavailable {
                phrase: "no results found".to_string()
            }
        );
    }

    #[test]
    fn test_classify_without_phrases_is_available() {
        let phrases = default_phrases();
        assert!(classify("<ul><li>2 x Standing - £45</li></ul>", &phrases).is_available());
        assert!(classify("", &phrases).is_available());
    }

    #[test]
    fn test_classify_normalizes_configured_phrases() {
        let phrases = vec!["  SOLD OUT ".to_string(), String::new()];
        assert!(!classify("this event is sold out", &phrases).is_available());
        assert!(classify("tickets on sale", &phrases).is_available());
    }

    #[tokio::test]
    async fn test_check_available_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/event/1")
            .with_status(200)
            .with_body("<html><body>1 ticket listed</body></html>")
            .create_async()
            .await;

        let result = checker()
            .check(&format!("{}/event/1", server.url()))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.is_available());
    }

    #[tokio::test]
    async fn test_check_sold_out_page() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/event/1")
            .with_status(200)
            .with_body("Sorry, we don't currently have any tickets available")
            .create_async()
            .await;

        let result = checker()
            .check(&format!("{}/event/1", server.url()))
            .await
            .unwrap();
        assert!(!result.is_available());
    }

    #[tokio::test]
    async fn test_check_non_200_is_error() {
        let mut server = mockito::Server::new_async().await;
        for status in [204, 404, 503] {
            let mock = server
                .mock("GET", "/event/1")
                .with_status(status)
                .with_body("tickets!")
                .create_async()
                .await;

            let result = checker().check(&format!("{}/event/1", server.url())).await;
            match result {
                Err(AppError::Status { status: got, .. }) => assert_eq!(got as usize, status),
                other => panic!("expected status error for {status}, got {other:?}"),
            }
            mock.remove_async().await;
        }
    }

    #[tokio::test]
    async fn test_check_transport_error() {
        let result = checker().check("http://127.0.0.1:1/event").await;
        assert!(matches!(result, Err(AppError::Http(_))));
    }
}
