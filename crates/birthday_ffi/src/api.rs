//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list/edit/check use-cases to Dart via FRB.
//! - Hand pending greetings back to the shell, which owns notifications,
//!   alarms and the cloud document.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in envelopes, never as Dart exceptions.

use birthday_core::db::open_db;
use birthday_core::{
    core_version as core_version_inner, evaluate, export_json, import_json,
    init_logging as init_logging_inner, list_view, ping as ping_inner, scroll_target,
    BirthdayDraft, BirthdayRepository, BirthdayService, Clock, CoreConfig, DailyCheckService,
    GreetingTemplate, NotifySettings, OutboxNotifier, RepoResult, SortOrder,
    SqliteBirthdayRepository, SystemClock, UNPARSEABLE_DISTANCE,
};
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the birthday list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayItem {
    /// Position in the store; pass back to save/delete calls.
    pub index: u32,
    pub id: String,
    pub name: String,
    pub date: String,
    pub phone: String,
    pub message: String,
    /// `None` when the stored date cannot be parsed.
    pub days_until: Option<i64>,
    /// Cake badge.
    pub is_today: bool,
    /// "Soon" badge.
    pub is_soon: bool,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayListResponse {
    pub ok: bool,
    pub items: Vec<BirthdayItem>,
    /// Row the list should scroll to.
    pub scroll_to: Option<u32>,
    pub message: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirthdayActionResponse {
    pub ok: bool,
    /// Affected record ID when applicable.
    pub id: Option<String>,
    pub message: String,
}

impl BirthdayActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// A greeting the shell should post as a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingGreeting {
    pub name: String,
    pub message: String,
    pub phone: String,
    /// WhatsApp link opened when the notification is tapped.
    pub link: String,
}

/// Daily check response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCheckResponse {
    pub ok: bool,
    pub names: Vec<String>,
    pub greetings: Vec<PendingGreeting>,
    pub message: String,
}

/// Evaluation envelope used by the home screen summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResponse {
    pub ok: bool,
    /// Names whose birthday is today, in list order.
    pub today_names: Vec<String>,
    /// Store index of the nearest upcoming birthday.
    pub upcoming_index: Option<u32>,
    /// Days until that birthday.
    pub upcoming_days: Option<i64>,
    pub message: String,
}

/// JSON blob envelope for cloud sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobResponse {
    pub ok: bool,
    pub json: String,
    pub message: String,
}

/// Lists records with badges, sort and name filter applied.
///
/// Input semantics:
/// - `today_iso`: `YYYY-MM-DD`; empty uses the device date.
/// - `sort`: `date_asc|date_desc|name_asc|name_desc`; unknown values use `date_asc`.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_list(today_iso: String, sort: String, filter: String) -> BirthdayListResponse {
    let today = match resolve_today(&today_iso) {
        Ok(today) => today,
        Err(err) => return list_failure(err),
    };
    let records = match with_service(|service| service.list()) {
        Ok(records) => records,
        Err(err) => return list_failure(format!("birthday_list failed: {err}")),
    };

    let view = list_view(&records, today, parse_sort(&sort), &filter);
    let scroll_to = scroll_target(&view).and_then(|position| u32::try_from(position).ok());
    let items = view
        .into_iter()
        .map(|item| BirthdayItem {
            index: u32::try_from(item.index).unwrap_or(u32::MAX),
            id: item.record.id.to_string(),
            name: item.record.name,
            date: item.record.date,
            phone: item.record.phone,
            message: item.record.message,
            days_until: Some(item.flags.days_until)
                .filter(|days| *days != UNPARSEABLE_DISTANCE),
            is_today: item.flags.is_today,
            is_soon: item.flags.is_soon,
        })
        .collect::<Vec<_>>();

    let message = if items.is_empty() {
        "No birthdays.".to_string()
    } else {
        format!("{} birthday(s).", items.len())
    };
    BirthdayListResponse {
        ok: true,
        items,
        scroll_to,
        message,
    }
}

/// Evaluates the stored list against `today_iso` (empty uses the device date).
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_evaluate(today_iso: String) -> EvaluationResponse {
    let failure = |message: String| EvaluationResponse {
        ok: false,
        today_names: Vec::new(),
        upcoming_index: None,
        upcoming_days: None,
        message,
    };
    let today = match resolve_today(&today_iso) {
        Ok(today) => today,
        Err(err) => return failure(err),
    };
    let records = match with_repo(|repo| repo.load_all()) {
        Ok(records) => records,
        Err(err) => return failure(format!("birthday_evaluate failed: {err}")),
    };

    let evaluation = evaluate(&records, today, &GreetingTemplate::default());
    let upcoming_days = evaluation
        .upcoming
        .and_then(|index| evaluation.flags.get(index))
        .map(|flags| flags.days_until)
        .filter(|days| *days != UNPARSEABLE_DISTANCE);
    let today_names = evaluation
        .matches_today
        .into_iter()
        .map(|found| found.record.name)
        .collect::<Vec<_>>();
    let message = if today_names.is_empty() {
        "No birthdays today.".to_string()
    } else {
        format!("{} birthday(s) today.", today_names.len())
    };
    EvaluationResponse {
        ok: true,
        today_names,
        upcoming_index: evaluation
            .upcoming
            .and_then(|index| u32::try_from(index).ok()),
        upcoming_days,
        message,
    }
}

/// Saves one record: replaces at `index` when set, appends otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_save(
    index: Option<u32>,
    name: String,
    date: String,
    phone: String,
    message: String,
) -> BirthdayActionResponse {
    let draft = BirthdayDraft::new(name, date).phone(phone).message(message);
    let index = index.map(|value| value as usize);
    match with_service(|service| service.save_at(index, draft)) {
        Ok(record) => BirthdayActionResponse::success("Birthday saved.", Some(record.id.to_string())),
        Err(err) => BirthdayActionResponse::failure(format!("birthday_save failed: {err}")),
    }
}

/// Deletes the record at store position `index`.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_delete(index: u32) -> BirthdayActionResponse {
    match with_service(|service| service.delete_at(index as usize)) {
        Ok(()) => BirthdayActionResponse::success("Birthday deleted.", None),
        Err(err) => BirthdayActionResponse::failure(format!("birthday_delete failed: {err}")),
    }
}

/// Deletes the record with stable `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_delete_by_id(id: String) -> BirthdayActionResponse {
    let Ok(record_id) = Uuid::parse_str(id.trim()) else {
        return BirthdayActionResponse::failure(format!("invalid birthday id: `{id}`"));
    };
    match with_service(|service| service.delete(record_id)) {
        Ok(()) => BirthdayActionResponse::success("Birthday deleted.", Some(record_id.to_string())),
        Err(err) => BirthdayActionResponse::failure(format!("birthday_delete failed: {err}")),
    }
}

/// Runs the daily check and returns the greetings to post.
///
/// Always queues into an outbox; the shell posts the notifications, so the
/// configured notify channel does not apply here. `default_greeting` may
/// contain `{name}`; empty uses the built-in greeting.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_check_today(today_iso: String, default_greeting: String) -> DailyCheckResponse {
    let failure = |message: String| DailyCheckResponse {
        ok: false,
        names: Vec::new(),
        greetings: Vec::new(),
        message,
    };
    let today = match resolve_today(&today_iso) {
        Ok(today) => today,
        Err(err) => return failure(err),
    };

    let mut settings = NotifySettings::default();
    if !default_greeting.trim().is_empty() {
        settings.default_greeting = GreetingTemplate::new(default_greeting);
    }

    let outbox = OutboxNotifier::new();
    let report = with_repo(|repo| DailyCheckService::new(repo, &outbox, settings).run(today));
    match report {
        Ok(report) => {
            let greetings = outbox
                .drain()
                .into_iter()
                .map(|delivery| PendingGreeting {
                    name: delivery.recipient_name,
                    message: delivery.message,
                    phone: delivery.phone,
                    link: delivery.link,
                })
                .collect::<Vec<_>>();
            let message = if report.names.is_empty() {
                "No birthdays today.".to_string()
            } else {
                format!("Birthdays today: {}", report.names.join(", "))
            };
            DailyCheckResponse {
                ok: true,
                names: report.names,
                greetings,
                message,
            }
        }
        Err(err) => failure(format!("birthday_check_today failed: {err}")),
    }
}

/// Exports the list as the JSON document stored in the cloud.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_export_json() -> BlobResponse {
    let exported = with_repo(|repo| repo.load_all())
        .map_err(|err| err.to_string())
        .and_then(|records| export_json(&records).map_err(|err| err.to_string()));
    match exported {
        Ok(json) => BlobResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Err(err) => BlobResponse {
            ok: false,
            json: String::new(),
            message: format!("birthday_export_json failed: {err}"),
        },
    }
}

/// Replaces the local list with a downloaded JSON document.
#[flutter_rust_bridge::frb(sync)]
pub fn birthday_import_json(json: String) -> BirthdayActionResponse {
    let records = match import_json(&json) {
        Ok(records) => records,
        Err(err) => {
            return BirthdayActionResponse::failure(format!("birthday_import_json failed: {err}"))
        }
    };
    match with_repo(|repo| repo.replace_all(&records)) {
        Ok(()) => BirthdayActionResponse::success(
            format!("Imported {} birthday(s).", records.len()),
            None,
        ),
        Err(err) => BirthdayActionResponse::failure(format!("birthday_import_json failed: {err}")),
    }
}

fn list_failure(message: String) -> BirthdayListResponse {
    BirthdayListResponse {
        ok: false,
        items: Vec::new(),
        scroll_to: None,
        message,
    }
}

fn parse_sort(value: &str) -> SortOrder {
    match value.trim().to_ascii_lowercase().as_str() {
        "date_desc" => SortOrder::DateDesc,
        "name_asc" => SortOrder::NameAsc,
        "name_desc" => SortOrder::NameDesc,
        _ => SortOrder::DateAsc,
    }
}

fn resolve_today(today_iso: &str) -> Result<NaiveDate, String> {
    let trimmed = today_iso.trim();
    if trimmed.is_empty() {
        return Ok(SystemClock.today());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|err| format!("invalid today `{trimmed}`; expected YYYY-MM-DD: {err}"))
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::default().resolve_db_path())
        .clone()
}

fn with_repo<T>(
    f: impl FnOnce(SqliteBirthdayRepository<'_>) -> RepoResult<T>,
) -> Result<T, String> {
    let conn = open_db(resolve_db_path()).map_err(|err| {
        log::warn!("event=ffi_db_open module=ffi status=error");
        format!("DB open failed: {err}")
    })?;
    let repo = SqliteBirthdayRepository::try_new(&conn)
        .map_err(|err| format!("repo init failed: {err}"))?;
    f(repo).map_err(|err| err.to_string())
}

fn with_service<T>(
    f: impl FnOnce(&BirthdayService<SqliteBirthdayRepository<'_>>) -> RepoResult<T>,
) -> Result<T, String> {
    with_repo(|repo| f(&BirthdayService::new(repo)))
}

#[cfg(test)]
mod tests {
    use super::{
        birthday_check_today, birthday_delete_by_id, birthday_export_json, birthday_list,
        birthday_save, core_version, init_logging, parse_sort, ping, resolve_db_path,
        resolve_today, DB_PATH,
    };
    use birthday_core::SortOrder;
    use std::path::Path;
    use std::sync::OnceLock;
    use std::time::{SystemTime, UNIX_EPOCH};

    static SCRATCH_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();

    /// Pins the process-wide store to a scratch folder before any DB call.
    fn scratch_store() -> &'static Path {
        let dir = SCRATCH_DIR
            .get_or_init(|| tempfile::tempdir().expect("scratch dir"))
            .path();
        let path = DB_PATH.get_or_init(|| dir.join("birthdays.sqlite3"));
        assert!(path.starts_with(dir), "store already pinned to {}", path.display());
        dir
    }

    #[test]
    fn store_used_by_tests_is_scratch_only() {
        let dir = scratch_store();
        assert_eq!(resolve_db_path(), dir.join("birthdays.sqlite3"));
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
    }

    #[test]
    fn parse_sort_defaults_to_date_ascending() {
        assert_eq!(parse_sort("NAME_DESC"), SortOrder::NameDesc);
        assert_eq!(parse_sort("bogus"), SortOrder::DateAsc);
    }

    #[test]
    fn resolve_today_rejects_non_iso_dates() {
        assert!(resolve_today("25-12-2025").is_err());
        assert!(resolve_today("2025-12-25").is_ok());
    }

    #[test]
    fn saved_birthday_shows_up_with_today_badge_and_greeting() {
        scratch_store();
        let name = unique_token("ffi-check");
        let saved = birthday_save(
            None,
            name.clone(),
            "29/07".to_string(),
            "+34 600 000 000".to_string(),
            String::new(),
        );
        assert!(saved.ok, "{}", saved.message);
        let id = saved.id.clone().expect("save should return id");

        let listed = birthday_list("2031-07-29".to_string(), "name_asc".to_string(), name.clone());
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);
        assert!(listed.items[0].is_today);
        assert_eq!(listed.items[0].days_until, Some(0));

        let checked = birthday_check_today("2031-07-29".to_string(), "Hey {name}".to_string());
        assert!(checked.ok, "{}", checked.message);
        let greeting = checked
            .greetings
            .iter()
            .find(|greeting| greeting.name == name)
            .expect("greeting for saved record");
        assert_eq!(greeting.message, format!("Hey {name}"));
        assert!(greeting.link.starts_with("https://wa.me/34600000000?text="));

        let exported = birthday_export_json();
        assert!(exported.ok, "{}", exported.message);
        assert!(exported.json.contains(&name));

        let deleted = birthday_delete_by_id(id);
        assert!(deleted.ok, "{}", deleted.message);
    }

    #[test]
    fn save_rejects_malformed_date() {
        scratch_store();
        let response = birthday_save(
            None,
            "Bad".to_string(),
            "soon".to_string(),
            String::new(),
            String::new(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("invalid date"));
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
