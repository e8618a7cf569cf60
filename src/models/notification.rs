// src/models/notification.rs

use chrono::{DateTime, Utc};

/// A message handed to every notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Alert sent when tickets become available for `event_url`.
    pub fn tickets_available(event_url: &str) -> Self {
        Self::new(
            "Twickets Alert: Tickets Available!",
            format!(
                "Tickets are now available for your event!\n\
                 Event URL: {event_url}\n\
                 \n\
                 Please visit the page quickly to purchase them.\n\
                 This is an automated notification."
            ),
        )
    }

    /// Message used by `test-notify` to exercise the configured channels.
    pub fn test(event_url: Option<&str>, sent_at: DateTime<Utc>) -> Self {
        let target = event_url.unwrap_or("(EVENT_URL not set)");
        Self::new(
            "Ticket Monitor: test notification",
            format!(
                "This is a test notification from ticket-monitor.\n\
                 Event URL: {target}\n\
                 Sent at: {}",
                sent_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_available_message() {
        let msg = NotificationMessage::tickets_available("https://example.com/e/1");
        assert_eq!(msg.subject, "Twickets Alert: Tickets Available!");
        assert_eq!(
            msg.body,
            "Tickets are now available for your event!\n\
             Event URL: https://example.com/e/1\n\n\
             Please visit the page quickly to purchase them.\n\
             This is an automated notification."
        );
    }

    #[test]
    fn test_test_message_mentions_missing_url() {
        let msg = NotificationMessage::test(None, Utc::now());
        assert!(msg.body.contains("EVENT_URL not set"));
    }
}
