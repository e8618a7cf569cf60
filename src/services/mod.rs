// src/services/mod.rs

//! Service layer for the ticket monitor.
//!
//! - `checker`: Fetches the event page and classifies availability
//! - `notifier`: Sends alerts over email and SMS

pub mod checker;
pub mod notifier;

pub use checker::{AvailabilityChecker, AvailabilitySource, classify};
pub use notifier::{
    Delivery, DispatchReport, EmailChannel, NotificationChannel, Notifier, SmsChannel,
};
