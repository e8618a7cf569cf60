//! Pipeline entry points for monitor operations.
//!
//! - `run_monitor`: One check → compare → notify → persist cycle
//! - `run_test_notify`: Send a test message through every channel

pub mod monitor;
pub mod notify;

pub use monitor::{Monitor, RunReport, run_monitor};
pub use notify::run_test_notify;
