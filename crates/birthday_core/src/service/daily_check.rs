//! Daily birthday check use-case.
//!
//! # Responsibility
//! - Reload the full record list, evaluate it against today and deliver one
//!   greeting per match.
//! - Report what happened to the caller (scheduler callback or "check now").
//!
//! # Invariants
//! - Records are re-fetched on every run; nothing is cached between runs.
//! - A failed delivery is counted and logged, never aborting later ones.
//! - Greeting settings come from the injected `NotifySettings`.

use crate::clock::Clock;
use crate::config::NotifySettings;
use crate::engine::date_window::todays_matches;
use crate::notify::notifier::Notifier;
use crate::repo::birthday_repo::{BirthdayRepository, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::time::Instant;

/// Outcome of one daily check run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyCheckReport {
    pub today: Option<NaiveDate>,
    /// Number of records evaluated.
    pub checked: usize,
    /// Names whose birthday is today, in list order.
    pub names: Vec<String>,
    pub notified: usize,
    pub failed: usize,
}

impl DailyCheckReport {
    pub fn matched(&self) -> usize {
        self.names.len()
    }
}

/// Daily check service wired to one store and one notifier.
pub struct DailyCheckService<R: BirthdayRepository, N: Notifier> {
    repo: R,
    notifier: N,
    settings: NotifySettings,
}

impl<R: BirthdayRepository, N: Notifier> DailyCheckService<R, N> {
    pub fn new(repo: R, notifier: N, settings: NotifySettings) -> Self {
        Self {
            repo,
            notifier,
            settings,
        }
    }

    /// Runs the check for the date reported by `clock`.
    pub fn run_with_clock(&self, clock: &dyn Clock) -> RepoResult<DailyCheckReport> {
        self.run(clock.today())
    }

    /// Runs the check for an explicit reference date.
    ///
    /// # Errors
    /// - Propagates store failures; delivery failures are only counted.
    pub fn run(&self, today: NaiveDate) -> RepoResult<DailyCheckReport> {
        let started_at = Instant::now();
        let records = self.repo.load_all()?;
        let matches = todays_matches(&records, today, &self.settings.default_greeting);

        let mut report = DailyCheckReport {
            today: Some(today),
            checked: records.len(),
            ..DailyCheckReport::default()
        };

        for found in matches {
            let record = &found.record;
            match self
                .notifier
                .notify(&record.name, &found.resolved_message, &record.phone)
            {
                Ok(()) => report.notified += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        "event=birthday_notify module=service status=error channel={} index={} error={}",
                        self.notifier.channel(),
                        found.index,
                        err
                    );
                }
            }
            report.names.push(record.name.clone());
        }

        info!(
            "event=daily_check module=service status=ok channel={} checked={} matched={} notified={} failed={} duration_ms={}",
            self.notifier.channel(),
            report.checked,
            report.matched(),
            report.notified,
            report.failed,
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}
