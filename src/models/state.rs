// src/models/state.rs

use serde::{Deserialize, Serialize};

/// Last observed availability, persisted between runs.
///
/// Serialized as exactly `{"has_tickets": <bool>}`. A valid object without
/// the field reads as `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvailabilityState {
    #[serde(default)]
    pub has_tickets: bool,
}

impl AvailabilityState {
    pub fn new(has_tickets: bool) -> Self {
        Self { has_tickets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_string(&AvailabilityState::new(true)).unwrap();
        assert_eq!(json, r#"{"has_tickets":true}"#);
    }

    #[test]
    fn test_missing_field_reads_false() {
        let state: AvailabilityState = serde_json::from_str("{}").unwrap();
        assert!(!state.has_tickets);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(serde_json::from_str::<AvailabilityState>(r#"{"has_tickets":"yes"}"#).is_err());
        assert!(serde_json::from_str::<AvailabilityState>("[]").is_err());
    }
}
