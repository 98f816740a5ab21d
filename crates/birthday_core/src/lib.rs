//! Core domain logic for the birthday notifier.
//! This crate is the single source of truth for record invariants and for
//! deciding whose birthday is today.

pub mod clock;
pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;
pub mod sync;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, CoreConfig, NotifyChannel, NotifySettings};
pub use engine::date_window::{
    days_until_next, evaluate, is_today, is_within_next_month, next_occurrence, next_upcoming,
    parse_date, resolve_message, todays_matches, Evaluation, RecordFlags, TodayMatch,
    UNPARSEABLE_DISTANCE,
};
pub use engine::greeting::GreetingTemplate;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::birthday::{BirthdayDate, BirthdayRecord, BirthdayValidationError, RecordId};
pub use notify::notifier::{Delivery, LogNotifier, Notifier, NotifyError, OutboxNotifier};
pub use notify::whatsapp::whatsapp_link;
pub use repo::birthday_repo::{BirthdayRepository, RepoError, RepoResult, SqliteBirthdayRepository};
pub use service::birthday_service::{BirthdayDraft, BirthdayService};
pub use service::daily_check::{DailyCheckReport, DailyCheckService};
pub use service::listing::{list_view, scroll_target, ListItem, SortOrder};
pub use sync::blob::{export_json, import_json, pull, push, BlobStore, MemoryBlobStore, SyncError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
