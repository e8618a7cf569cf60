// src/models/availability.rs

use std::fmt;

/// Classification of one event page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// No unavailability phrase was found on the page
    Available,
    /// The page contains `phrase`
    Unavailable { phrase: String },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Edge between the previous and current availability of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// false -> true; the only edge that notifies
    Appeared,
    StillAvailable,
    StillUnavailable,
    Disappeared,
}

impl Transition {
    pub fn between(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => Transition::Appeared,
            (true, true) => Transition::StillAvailable,
            (false, false) => Transition::StillUnavailable,
            (true, false) => Transition::Disappeared,
        }
    }

    /// Notifications are edge-triggered.
    pub fn should_notify(self) -> bool {
        self == Transition::Appeared
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Transition::Appeared => "tickets appeared",
            Transition::StillAvailable => "tickets still available",
            Transition::StillUnavailable => "still no tickets",
            Transition::Disappeared => "tickets gone",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rising_edge_notifies() {
        assert!(Transition::between(false, true).should_notify());
        assert!(!Transition::between(true, true).should_notify());
        assert!(!Transition::between(false, false).should_notify());
        assert!(!Transition::between(true, false).should_notify());
    }

    #[test]
    fn test_is_available() {
        assert!(Availability::Available.is_available());
        let unavailable = Availability::Unavailable {
            phrase: "no results found".to_string(),
        };
        assert!(!unavailable.is_available());
    }
}
