//! List screen projection: sorting, name filter, badges and scroll target.
//!
//! # Invariants
//! - Every item keeps its store `index`, so edits and deletes issued from a
//!   sorted or filtered view address the right record.
//! - Sorting is stable; equal keys keep store order.
//! - Unparseable dates sort as key `0` (before January).

use crate::engine::date_window::{evaluate, RecordFlags, UNPARSEABLE_DISTANCE};
use crate::engine::greeting::GreetingTemplate;
use crate::model::birthday::BirthdayRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sort options offered by the list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateAsc,
    DateDesc,
    NameAsc,
    NameDesc,
}

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    /// Position of the record in the store.
    pub index: usize,
    pub record: BirthdayRecord,
    pub flags: RecordFlags,
}

/// Builds the visible list: badge flags, sort, then case-insensitive
/// name substring filter.
pub fn list_view(
    records: &[BirthdayRecord],
    today: NaiveDate,
    order: SortOrder,
    name_filter: &str,
) -> Vec<ListItem> {
    let evaluation = evaluate(records, today, &GreetingTemplate::default());
    let mut items = records
        .iter()
        .zip(evaluation.flags)
        .enumerate()
        .map(|(index, (record, flags))| ListItem {
            index,
            record: record.clone(),
            flags,
        })
        .collect::<Vec<_>>();

    match order {
        SortOrder::DateAsc => items.sort_by_key(|item| date_sort_key(&item.record)),
        SortOrder::DateDesc => {
            items.sort_by(|a, b| date_sort_key(&b.record).cmp(&date_sort_key(&a.record)))
        }
        SortOrder::NameAsc => items.sort_by_key(|item| item.record.name.to_lowercase()),
        SortOrder::NameDesc => items.sort_by(|a, b| {
            b.record
                .name
                .to_lowercase()
                .cmp(&a.record.name.to_lowercase())
        }),
    }

    let needle = name_filter.trim().to_lowercase();
    if needle.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| item.record.name.to_lowercase().contains(&needle))
        .collect()
}

/// Row the list should scroll to, as a position in `items`.
///
/// Priority: first birthday today, then first "soon" badge, then the
/// nearest future birthday (first wins on ties).
pub fn scroll_target(items: &[ListItem]) -> Option<usize> {
    if let Some(position) = items.iter().position(|item| item.flags.days_until == 0) {
        return Some(position);
    }
    if let Some(position) = items.iter().position(|item| item.flags.is_soon) {
        return Some(position);
    }

    let mut best: Option<(usize, i64)> = None;
    for (position, item) in items.iter().enumerate() {
        let days = item.flags.days_until;
        if days <= 0 || days == UNPARSEABLE_DISTANCE {
            continue;
        }
        match best {
            Some((_, best_days)) if best_days <= days => {}
            _ => best = Some((position, days)),
        }
    }
    best.map(|(position, _)| position)
}

fn date_sort_key(record: &BirthdayRecord) -> u32 {
    record.parsed_date().map_or(0, |date| date.sort_key())
}
