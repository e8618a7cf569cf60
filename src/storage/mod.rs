//! Persistence for the last observed availability.
//!
//! The state is a single JSON record:
//!
//! ```text
//! {"has_tickets": true}
//! ```
//!
//! It is read once at the start of a run and written once at the end.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::AvailabilityState;

// Re-export for convenience
pub use local::LocalStateStore;

/// Trait for state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the persisted state; `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<AvailabilityState>>;

    /// Replace the persisted state.
    async fn save(&self, state: &AvailabilityState) -> Result<()>;

    /// Human-readable location for log lines.
    fn location(&self) -> String;
}
