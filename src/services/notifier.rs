// src/services/notifier.rs

//! Best-effort notification channels.
//!
//! Every channel is attempted in order and reports its own [`Delivery`];
//! a failure in one never stops the next.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Config, EmailConfig, NotificationMessage, SmsConfig, SmtpSettings};

/// Outcome of a single channel send.
#[derive(Debug)]
pub enum Delivery {
    Sent,
    /// Channel not configured; not an error
    Skipped(String),
    Failed(AppError),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Delivery::Failed(_))
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Sent => write!(f, "sent"),
            Delivery::Skipped(reason) => write!(f, "skipped ({reason})"),
            Delivery::Failed(e) => write!(f, "failed ({e})"),
        }
    }
}

/// A notification transport.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the channel has everything it needs to send.
    fn is_configured(&self) -> bool;

    /// Attempt delivery. Errors are returned, never logged here.
    async fn send(&self, message: &NotificationMessage) -> Result<Delivery>;

    /// Console wording for a delivery; `None` keeps it out of the default log.
    fn describe(&self, delivery: &Delivery) -> Option<String> {
        Some(format!("{} notification {}", self.name(), delivery))
    }
}

/// Per-channel results of one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub deliveries: Vec<(&'static str, Delivery)>,
}

impl DispatchReport {
    pub fn sent_count(&self) -> usize {
        self.deliveries.iter().filter(|(_, d)| d.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.deliveries.iter().filter(|(_, d)| d.is_failed()).count()
    }

    pub fn get(&self, channel: &str) -> Option<&Delivery> {
        self.deliveries
            .iter()
            .find(|(name, _)| *name == channel)
            .map(|(_, d)| d)
    }
}

/// Fans a message out to every channel in sequence.
pub struct Notifier {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Notifier {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    /// Email first, then SMS.
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self::new(vec![
            Box::new(EmailChannel::new(&config.email)),
            Box::new(SmsChannel::new(client, &config.sms)),
        ])
    }

    pub fn channels(&self) -> impl Iterator<Item = &dyn NotificationChannel> {
        self.channels.iter().map(|c| c.as_ref())
    }

    /// Send `message` through every channel; never short-circuits.
    pub async fn dispatch(&self, message: &NotificationMessage) -> DispatchReport {
        let mut report = DispatchReport::default();

        for channel in &self.channels {
            let delivery = match channel.send(message).await {
                Ok(delivery) => delivery,
                Err(e) => Delivery::Failed(e),
            };
            log_delivery(channel.as_ref(), &delivery);
            report.deliveries.push((channel.name(), delivery));
        }

        report
    }
}

fn log_delivery(channel: &dyn NotificationChannel, delivery: &Delivery) {
    match (channel.describe(delivery), delivery) {
        (Some(line), Delivery::Failed(_)) => log::error!("{}", line),
        (Some(line), _) => log::info!("{}", line),
        (None, _) => log::debug!("{} notification {}", channel.name(), delivery),
    }
}

// --- Email ---

/// SMTP channel using an authenticated STARTTLS session.
pub struct EmailChannel {
    settings: Option<SmtpSettings>,
    missing: Vec<&'static str>,
}

impl EmailChannel {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            settings: config.settings(),
            missing: config.missing(),
        }
    }

    fn build_message(smtp: &SmtpSettings, message: &NotificationMessage) -> Result<Message> {
        let mut builder = Message::builder()
            .from(smtp.from.parse::<Mailbox>()?)
            .subject(message.subject.as_str());
        for to in &smtp.to {
            builder = builder.to(to.parse::<Mailbox>()?);
        }

        let body = MultiPart::mixed().singlepart(
            SinglePart::builder()
                .header(header::ContentType::TEXT_PLAIN)
                .body(message.body.clone()),
        );
        Ok(builder.multipart(body)?)
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn is_configured(&self) -> bool {
        self.settings.is_some()
    }

    fn describe(&self, delivery: &Delivery) -> Option<String> {
        Some(match delivery {
            Delivery::Sent => "Email notification sent.".to_string(),
            Delivery::Skipped(_) => {
                "Email configuration incomplete; skipping email notification.".to_string()
            }
            Delivery::Failed(e) => format!("Failed to send email: {e}"),
        })
    }

    async fn send(&self, message: &NotificationMessage) -> Result<Delivery> {
        let Some(smtp) = &self.settings else {
            return Ok(Delivery::Skipped(format!(
                "missing {}",
                self.missing.join(", ")
            )));
        };

        let email = Self::build_message(smtp, message)?;
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.server)?
            .port(smtp.port)
            .credentials(Credentials::new(
                smtp.username.clone(),
                smtp.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(smtp.timeout_secs)))
            .build();

        mailer.send(email).await?;
        Ok(Delivery::Sent)
    }
}

// --- SMS ---

/// Reply body from the Textbelt gateway.
#[derive(Debug, Deserialize)]
struct TextbeltReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default, rename = "quotaRemaining")]
    quota_remaining: Option<i64>,
}

/// Textbelt SMS channel; off unless a phone number is configured.
pub struct SmsChannel {
    client: Client,
    phone: Option<String>,
    key: String,
    endpoint: String,
    timeout: Duration,
}

impl SmsChannel {
    pub fn new(client: Client, config: &SmsConfig) -> Self {
        Self {
            client,
            phone: config.phone.clone(),
            key: config.key.clone(),
            endpoint: config.endpoint.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[async_trait]
impl NotificationChannel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    fn is_configured(&self) -> bool {
        self.phone.is_some()
    }

    fn describe(&self, delivery: &Delivery) -> Option<String> {
        match delivery {
            Delivery::Sent => Some("SMS notification sent.".to_string()),
            Delivery::Skipped(_) => None,
            Delivery::Failed(AppError::Sms(reply)) => Some(format!("SMS failed: {reply}")),
            Delivery::Failed(e) => Some(format!("Failed to send SMS: {e}")),
        }
    }

    async fn send(&self, message: &NotificationMessage) -> Result<Delivery> {
        let Some(phone) = &self.phone else {
            return Ok(Delivery::Skipped("SMS_PHONE not set".to_string()));
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .form(&[
                ("phone", phone.as_str()),
                ("message", message.body.as_str()),
                ("key", self.key.as_str()),
            ])
            .send()
            .await?;

        let raw: serde_json::Value = response.json().await?;
        let reply: TextbeltReply = serde_json::from_value(raw.clone())?;

        if reply.success {
            if let Some(quota) = reply.quota_remaining {
                log::debug!("Textbelt quota remaining: {}", quota);
            }
            Ok(Delivery::Sent)
        } else {
            log::debug!("Textbelt error: {:?}", reply.error);
            Ok(Delivery::Failed(AppError::sms(raw)))
        }
    }
}
