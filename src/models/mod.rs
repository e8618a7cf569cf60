// src/models/mod.rs

//! Domain models for the ticket monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod availability;
mod config;
mod notification;
mod state;

// Re-export all public types
pub use availability::{Availability, Transition};
pub use config::{CheckerConfig, Config, EmailConfig, Overrides, SmsConfig, SmtpSettings};
pub use notification::NotificationMessage;
pub use state::AvailabilityState;
