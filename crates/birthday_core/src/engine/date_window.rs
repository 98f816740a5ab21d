//! Date window engine.
//!
//! # Responsibility
//! - Match records against today's day and month.
//! - Measure the distance to each record's next yearly occurrence.
//! - Flag records inside the natural month window `(today, today + 1 month]`.
//! - Pick the single nearest upcoming record for list highlighting.
//!
//! # Invariants
//! - Every function is pure and idempotent for identical inputs.
//! - A malformed record never aborts evaluation of the others.
//! - Parseable records always have a distance in `0..=366`.

use crate::engine::greeting::GreetingTemplate;
use crate::model::birthday::{BirthdayDate, BirthdayRecord};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

/// Distance reported for records whose date cannot be parsed.
pub const UNPARSEABLE_DISTANCE: i64 = i64::MAX;

/// A record that falls on today, with its greeting resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayMatch {
    /// Position of the record in the evaluated slice.
    pub index: usize,
    pub record: BirthdayRecord,
    /// Custom message when set, otherwise the rendered default greeting.
    pub resolved_message: String,
}

/// Per-record classification for list presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordFlags {
    pub index: usize,
    /// Whole days to the next occurrence; `UNPARSEABLE_DISTANCE` when malformed.
    pub days_until: i64,
    pub is_today: bool,
    /// Inside the natural month window; never set together with `is_today`.
    pub is_soon: bool,
}

/// Aggregate result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub matches_today: Vec<TodayMatch>,
    pub upcoming: Option<usize>,
    pub flags: Vec<RecordFlags>,
}

/// Parses a `dd-mm` / `dd/mm` date; see [`BirthdayDate::parse`].
pub fn parse_date(text: &str) -> Option<BirthdayDate> {
    BirthdayDate::parse(text)
}

/// Returns whether the record's day and month equal today's.
pub fn is_today(record: &BirthdayRecord, today: NaiveDate) -> bool {
    record
        .parsed_date()
        .is_some_and(|date| date.day == today.day() && date.month == today.month())
}

/// Returns the next calendar date (today included) matching the record.
///
/// Day/month pairs missing from a year roll over into the next month
/// (`29-02` in 2025 is 2025-03-01).
pub fn next_occurrence(record: &BirthdayRecord, today: NaiveDate) -> Option<NaiveDate> {
    let date = record.parsed_date()?;
    let this_year = occurrence_in_year(date, today.year())?;
    if this_year >= today {
        return Some(this_year);
    }
    occurrence_in_year(date, today.year() + 1)
}

/// Whole days from today to the next occurrence; `0` on the day itself.
pub fn days_until_next(record: &BirthdayRecord, today: NaiveDate) -> i64 {
    next_occurrence(record, today)
        .map(|target| (target - today).num_days())
        .unwrap_or(UNPARSEABLE_DISTANCE)
}

/// Returns whether the next occurrence lies in `(today, today + 1 month]`.
///
/// The month limit clamps to the end of shorter months (Jan 31 -> Feb 28).
pub fn is_within_next_month(record: &BirthdayRecord, today: NaiveDate) -> bool {
    let Some(target) = next_occurrence(record, today) else {
        return false;
    };
    let Some(limit) = today.checked_add_months(Months::new(1)) else {
        return false;
    };
    target > today && target <= limit
}

/// Index of the nearest record strictly after today.
///
/// Ties go to the first record in input order. When nothing lies in the
/// future the smallest distance overall wins, so a today-only list still
/// highlights a record. Returns `None` only for an empty slice.
pub fn next_upcoming(records: &[BirthdayRecord], today: NaiveDate) -> Option<usize> {
    let distances = records
        .iter()
        .map(|record| days_until_next(record, today))
        .collect::<Vec<_>>();
    first_min_index(
        distances
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, days)| *days > 0 && *days != UNPARSEABLE_DISTANCE),
    )
    .or_else(|| first_min_index(distances.iter().copied().enumerate()))
}

/// Records falling on today in input order, with greetings resolved.
pub fn todays_matches(
    records: &[BirthdayRecord],
    today: NaiveDate,
    greeting: &GreetingTemplate,
) -> Vec<TodayMatch> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| is_today(record, today))
        .map(|(index, record)| TodayMatch {
            index,
            record: record.clone(),
            resolved_message: resolve_message(record, greeting),
        })
        .collect()
}

/// Custom message when non-blank, otherwise the rendered default greeting.
pub fn resolve_message(record: &BirthdayRecord, greeting: &GreetingTemplate) -> String {
    match record.custom_message() {
        Some(message) => message.to_string(),
        None => greeting.render(&record.name),
    }
}

/// Classifies every record and collects today's matches and the upcoming one.
pub fn evaluate(
    records: &[BirthdayRecord],
    today: NaiveDate,
    greeting: &GreetingTemplate,
) -> Evaluation {
    let flags = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let is_today = is_today(record, today);
            RecordFlags {
                index,
                days_until: days_until_next(record, today),
                is_today,
                is_soon: !is_today && is_within_next_month(record, today),
            }
        })
        .collect();

    Evaluation {
        matches_today: todays_matches(records, today, greeting),
        upcoming: next_upcoming(records, today),
        flags,
    }
}

fn occurrence_in_year(date: BirthdayDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month, 1)?
        .checked_add_days(Days::new(u64::from(date.day.saturating_sub(1))))
}

fn first_min_index(values: impl Iterator<Item = (usize, i64)>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, days) in values {
        match best {
            Some((_, best_days)) if best_days <= days => {}
            _ => best = Some((index, days)),
        }
    }
    best.map(|(index, _)| index)
}
