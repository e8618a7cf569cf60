// src/pipeline/notify.rs

//! Test notification through the configured channels.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, NotificationMessage};
use crate::services::{DispatchReport, Notifier};
use crate::utils::http::create_client;

/// Send a test message without checking the page or touching state.
pub async fn run_test_notify(config: &Config) -> Result<DispatchReport> {
    let client = create_client(&config.checker)?;
    let notifier = Notifier::from_config(config, client);

    let configured: Vec<&str> = notifier
        .channels()
        .filter(|c| c.is_configured())
        .map(|c| c.name())
        .collect();
    if configured.is_empty() {
        log::warn!("No notification channel is configured.");
    } else {
        log::info!("Sending test notification via {}", configured.join(", "));
    }

    let message = NotificationMessage::test(config.event_url.as_deref(), Utc::now());
    Ok(notifier.dispatch(&message).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SmsConfig;

    #[tokio::test]
    async fn test_notify_reaches_sms_gateway() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/text")
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let config = Config {
            sms: SmsConfig {
                phone: Some("447912345678".to_string()),
                endpoint: format!("{}/text", server.url()),
                ..SmsConfig::default()
            },
            ..Config::default()
        };

        let report = run_test_notify(&config).await.unwrap();

        mock.assert_async().await;
        assert_eq!(report.sent_count(), 1);
        assert_eq!(report.failed_count(), 0);
    }
}
