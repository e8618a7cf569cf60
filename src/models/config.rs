//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use lettre::message::Mailbox;
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Root application configuration.
///
/// Built once at startup: tuning values come from an optional TOML file,
/// then [`Overrides`] taken from the environment are applied on top.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Event page to monitor
    #[serde(default)]
    pub event_url: Option<String>,

    /// Where the last observed availability is persisted
    #[serde(default = "defaults::state_file")]
    pub state_file: PathBuf,

    /// Page fetch and classification settings
    #[serde(default)]
    pub checker: CheckerConfig,

    /// SMTP channel settings
    #[serde(default)]
    pub email: EmailConfig,

    /// Textbelt channel settings
    #[serde(default)]
    pub sms: SmsConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    ///
    /// A missing file is the normal case and yields defaults silently.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}; using defaults.", path);
            return Self::default();
        }

        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Config load failed from {:?}: {}. Using defaults.", path, e);
            Self::default()
        })
    }

    /// Apply environment-level overrides. Empty strings count as unset.
    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(url) = non_empty(overrides.event_url) {
            self.event_url = Some(url);
        }
        if let Some(path) = non_empty(overrides.state_file) {
            self.state_file = PathBuf::from(path);
        }
        if let Some(server) = non_empty(overrides.smtp_server) {
            self.email.server = Some(server);
        }
        if let Some(raw) = non_empty(overrides.smtp_port) {
            match raw.trim().parse::<u16>() {
                Ok(port) if port > 0 => {
                    self.email.port = port;
                    self.email.invalid_port = None;
                }
                _ => {
                    log::warn!("SMTP_PORT '{}' is not a valid port; email is disabled.", raw);
                    self.email.invalid_port = Some(raw);
                }
            }
        }
        if let Some(username) = non_empty(overrides.smtp_username) {
            self.email.username = Some(username);
        }
        if let Some(password) = non_empty(overrides.smtp_password) {
            self.email.password = Some(password);
        }
        if let Some(from) = non_empty(overrides.email_from) {
            self.email.from = Some(from);
        }
        if let Some(to) = non_empty(overrides.email_to) {
            self.email.to = split_recipients(&to);
        }
        if let Some(phone) = non_empty(overrides.sms_phone) {
            self.sms.phone = Some(phone);
        }
        if let Some(key) = non_empty(overrides.textbelt_key) {
            self.sms.key = key;
        }
    }

    /// The configured event URL, or a configuration error when unset.
    pub fn require_event_url(&self) -> Result<&str> {
        self.event_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| AppError::config("EVENT_URL environment variable is not set"))
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = self.require_event_url()?;
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| AppError::validation(format!("EVENT_URL '{url}' is not a URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::validation(format!(
                "EVENT_URL must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.checker.user_agent.trim().is_empty() {
            return Err(AppError::validation("checker.user_agent is empty"));
        }
        if self.checker.timeout_secs == 0 {
            return Err(AppError::validation("checker.timeout_secs must be > 0"));
        }
        if self.checker.unavailable_phrases.iter().all(|p| p.trim().is_empty()) {
            return Err(AppError::validation("checker.unavailable_phrases is empty"));
        }
        if self.sms.timeout_secs == 0 {
            return Err(AppError::validation("sms.timeout_secs must be > 0"));
        }
        if self.email.timeout_secs == 0 {
            return Err(AppError::validation("email.timeout_secs must be > 0"));
        }

        if let Some(smtp) = self.email.settings() {
            smtp.from.parse::<Mailbox>().map_err(|e| {
                AppError::validation(format!("EMAIL_FROM '{}' is invalid: {e}", smtp.from))
            })?;
            for to in &smtp.to {
                to.parse::<Mailbox>().map_err(|e| {
                    AppError::validation(format!("EMAIL_TO entry '{to}' is invalid: {e}"))
                })?;
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_url: None,
            state_file: defaults::state_file(),
            checker: CheckerConfig::default(),
            email: EmailConfig::default(),
            sms: SmsConfig::default(),
        }
    }
}

/// Values read from the process environment (or matching CLI flags).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub event_url: Option<String>,
    pub state_file: Option<String>,
    pub smtp_server: Option<String>,
    /// Raw port text; parsed in [`Config::apply`]
    pub smtp_port: Option<String>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub email_from: Option<String>,
    /// Comma-separated recipient list
    pub email_to: Option<String>,
    pub sms_phone: Option<String>,
    pub textbelt_key: Option<String>,
}

/// Event page fetch and classification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckerConfig {
    /// User-Agent header for the page request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header for the page request
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::page_timeout")]
    pub timeout_secs: u64,

    /// Phrases whose presence means no tickets are listed
    #[serde(default = "defaults::unavailable_phrases")]
    pub unavailable_phrases: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            timeout_secs: defaults::page_timeout(),
            unavailable_phrases: defaults::unavailable_phrases(),
        }
    }
}

/// SMTP channel settings. Every field but `from` is required to send.
#[derive(Clone, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub server: Option<String>,

    #[serde(default = "defaults::smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Sender address; falls back to `username`
    #[serde(default)]
    pub from: Option<String>,

    #[serde(default)]
    pub to: Vec<String>,

    /// SMTP session timeout in seconds
    #[serde(default = "defaults::smtp_timeout")]
    pub timeout_secs: u64,

    /// Unparseable `SMTP_PORT` value; blocks sending until corrected
    #[serde(skip)]
    pub invalid_port: Option<String>,
}

impl EmailConfig {
    /// Resolved settings, or `None` when any required value is missing.
    pub fn settings(&self) -> Option<SmtpSettings> {
        if self.invalid_port.is_some() {
            return None;
        }
        let server = self.server.clone()?;
        let username = self.username.clone()?;
        let password = self.password.clone()?;
        if self.to.is_empty() {
            return None;
        }
        let from = self.from.clone().unwrap_or_else(|| username.clone());

        Some(SmtpSettings {
            server,
            port: self.port,
            username,
            password,
            from,
            to: self.to.clone(),
            timeout_secs: self.timeout_secs,
        })
    }

    /// Names of the required settings that are not configured.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.server.is_none() {
            missing.push("SMTP_SERVER");
        }
        if self.username.is_none() {
            missing.push("SMTP_USERNAME");
        }
        if self.password.is_none() {
            missing.push("SMTP_PASSWORD");
        }
        if self.to.is_empty() {
            missing.push("EMAIL_TO");
        }
        if self.invalid_port.is_some() {
            missing.push("SMTP_PORT (invalid)");
        }
        missing
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            server: None,
            port: defaults::smtp_port(),
            username: None,
            password: None,
            from: None,
            to: Vec::new(),
            timeout_secs: defaults::smtp_timeout(),
            invalid_port: None,
        }
    }
}

impl fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("timeout_secs", &self.timeout_secs)
            .field("invalid_port", &self.invalid_port)
            .finish()
    }
}

/// Complete SMTP settings, ready to open a session.
#[derive(Clone)]
pub struct SmtpSettings {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
    pub to: Vec<String>,
    pub timeout_secs: u64,
}

/// Textbelt channel settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsConfig {
    /// International number without a leading `+`; channel is off when unset
    #[serde(default)]
    pub phone: Option<String>,

    /// Textbelt API key
    #[serde(default = "defaults::textbelt_key")]
    pub key: String,

    /// Gateway endpoint
    #[serde(default = "defaults::textbelt_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::sms_timeout")]
    pub timeout_secs: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            phone: None,
            key: defaults::textbelt_key(),
            endpoint: defaults::textbelt_endpoint(),
            timeout_secs: defaults::sms_timeout(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn split_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

mod defaults {
    use std::path::PathBuf;

    pub fn state_file() -> PathBuf {
        PathBuf::from("state.json")
    }

    // Checker defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; TicketMonitor/1.0)".into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into()
    }
    pub fn page_timeout() -> u64 {
        30
    }
    pub fn unavailable_phrases() -> Vec<String> {
        [
            "sorry, we don't currently have any tickets",
            "no results found",
            "alerts not currently available",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    // Email defaults
    pub fn smtp_port() -> u16 {
        587
    }
    pub fn smtp_timeout() -> u64 {
        30
    }

    // SMS defaults
    pub fn textbelt_key() -> String {
        "textbelt".into()
    }
    pub fn textbelt_endpoint() -> String {
        "https://textbelt.com/text".into()
    }
    pub fn sms_timeout() -> u64 {
        15
    }
}
