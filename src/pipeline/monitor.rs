// src/pipeline/monitor.rs

//! One monitor run: load state → check page → notify on rising edge → save.

use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::models::{AvailabilityState, Config, NotificationMessage, Transition};
use crate::services::{AvailabilityChecker, AvailabilitySource, DispatchReport, Notifier};
use crate::storage::{LocalStateStore, StateStore};
use crate::utils::http::create_client;

/// Summary of a single run.
#[derive(Debug)]
pub struct RunReport {
    pub checked_at: DateTime<Utc>,
    pub previous: bool,
    pub current: bool,
    pub transition: Transition,
    /// Present only when a notification was dispatched
    pub dispatch: Option<DispatchReport>,
    pub state_saved: bool,
}

impl RunReport {
    pub fn notified(&self) -> bool {
        self.dispatch.is_some()
    }
}

/// Edge-triggered availability monitor over borrowed components.
pub struct Monitor<'a> {
    event_url: &'a str,
    source: &'a dyn AvailabilitySource,
    notifier: &'a Notifier,
    store: &'a dyn StateStore,
    dry_run: bool,
}

impl<'a> Monitor<'a> {
    pub fn new(
        event_url: &'a str,
        source: &'a dyn AvailabilitySource,
        notifier: &'a Notifier,
        store: &'a dyn StateStore,
    ) -> Self {
        Self {
            event_url,
            source,
            notifier,
            store,
            dry_run: false,
        }
    }

    /// Check and report only; no notification, no state write.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute one run. Every failure past this point is logged and folded
    /// into a safe default, so the run itself cannot fail.
    pub async fn run_once(&self) -> RunReport {
        let checked_at = Utc::now();

        let previous = match self.store.load().await {
            Ok(Some(state)) => state.has_tickets,
            Ok(None) => {
                log::debug!("No previous state at {}", self.store.location());
                false
            }
            Err(e) => {
                log::warn!("Failed to read state file: {}", e);
                false
            }
        };

        let current = match self.source.check(self.event_url).await {
            Ok(availability) => availability.is_available(),
            Err(e) => {
                log::warn!("{}", fetch_failure_line(&e));
                false
            }
        };
        log::info!("Tickets available: {}", current);

        let transition = Transition::between(previous, current);
        log::debug!("Transition: {}", transition);

        if self.dry_run {
            log::info!(
                "Dry run: {} (would notify: {}); state not written.",
                transition,
                transition.should_notify()
            );
            return RunReport {
                checked_at,
                previous,
                current,
                transition,
                dispatch: None,
                state_saved: false,
            };
        }

        let dispatch = if transition.should_notify() {
            let message = NotificationMessage::tickets_available(self.event_url);
            let report = self.notifier.dispatch(&message).await;
            log::debug!(
                "Notification dispatched: {} sent, {} failed",
                report.sent_count(),
                report.failed_count()
            );
            Some(report)
        } else {
            None
        };

        let state_saved = match self.store.save(&AvailabilityState::new(current)).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write state file: {}", e);
                false
            }
        };

        RunReport {
            checked_at,
            previous,
            current,
            transition,
            dispatch,
            state_saved,
        }
    }
}

/// Log line for a failed page check. A non-200 reply is its own condition,
/// not a fetch error.
fn fetch_failure_line(error: &AppError) -> String {
    match error {
        AppError::Status { .. } => error.to_string(),
        other => format!("Error fetching event page: {other}"),
    }
}

/// Build the real components from `config` and run once.
///
/// Errors only for setup problems: a missing event URL or an HTTP client
/// that cannot be constructed.
pub async fn run_monitor(config: &Config, dry_run: bool) -> Result<RunReport> {
    let event_url = config.require_event_url()?;

    let client = create_client(&config.checker)?;
    let checker = AvailabilityChecker::new(client.clone(), &config.checker);
    let notifier = Notifier::from_config(config, client);
    let store = LocalStateStore::new(&config.state_file);

    let report = Monitor::new(event_url, &checker, &notifier, &store)
        .dry_run(dry_run)
        .run_once()
        .await;
    Ok(report)
}
