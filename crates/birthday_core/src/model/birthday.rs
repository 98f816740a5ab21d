//! Birthday record domain model.
//!
//! # Responsibility
//! - Define the canonical record stored, synced and evaluated by core.
//! - Parse the recurring `dd-mm` / `dd/mm` textual date.
//!
//! # Invariants
//! - `id` is stable and never reused for another record.
//! - `date` is stored as entered; parsing never fails loudly on read paths.
//! - An empty or blank `message` means "use the default greeting".

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a birthday record.
pub type RecordId = Uuid;

/// Day and month of a recurring yearly date.
///
/// Day-in-month existence is not checked: `31-02` parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BirthdayDate {
    pub day: u32,
    pub month: u32,
}

impl BirthdayDate {
    /// Parses `dd-mm` or `dd/mm`, tolerating surrounding whitespace.
    ///
    /// Returns `None` when either token is missing, non-numeric, or outside
    /// `1..=31` (day) / `1..=12` (month). Tokens past the second are ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().replace('/', "-");
        let mut parts = normalized.split('-');
        let day = parts.next()?.trim().parse::<u32>().ok()?;
        let month = parts.next()?.trim().parse::<u32>().ok()?;
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { day, month })
    }

    /// Sort key in `MMdd` form, e.g. `901` for `01-09`.
    pub fn sort_key(self) -> u32 {
        self.month * 100 + self.day
    }
}

impl Display for BirthdayDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}-{:02}", self.day, self.month)
    }
}

/// Validation failures for record write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BirthdayValidationError {
    EmptyName,
    InvalidDate(String),
    InvalidPhone(String),
}

impl Display for BirthdayValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name cannot be empty"),
            Self::InvalidDate(value) => {
                write!(f, "invalid date `{value}`; expected dd-mm or dd/mm")
            }
            Self::InvalidPhone(value) => write!(f, "invalid phone `{value}`"),
        }
    }
}

impl Error for BirthdayValidationError {}

/// One birthday entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    /// Stable identity; list position is only a display concern.
    pub id: RecordId,
    /// Display name, not guaranteed unique.
    pub name: String,
    /// Recurring date as `dd-mm` or `dd/mm`.
    pub date: String,
    /// International dialing format, may be empty.
    pub phone: String,
    /// Custom greeting; blank falls back to the default greeting.
    pub message: String,
}

impl BirthdayRecord {
    /// Creates a record with a generated stable ID and an empty message.
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, date, phone)
    }

    /// Creates a record with a caller-provided ID.
    ///
    /// Used by storage read-back where identity already exists.
    pub fn with_id(
        id: RecordId,
        name: impl Into<String>,
        date: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            date: date.into(),
            phone: phone.into(),
            message: String::new(),
        }
    }

    /// Builder-style setter for the custom greeting.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Parsed recurring date, or `None` when the stored text is malformed.
    pub fn parsed_date(&self) -> Option<BirthdayDate> {
        BirthdayDate::parse(&self.date)
    }

    /// Returns the custom message when set.
    pub fn custom_message(&self) -> Option<&str> {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(self.message.as_str())
        }
    }

    /// Checks write-path invariants.
    ///
    /// Day-in-month existence (`31-02`) is intentionally not rejected.
    pub fn validate(&self) -> Result<(), BirthdayValidationError> {
        if self.name.trim().is_empty() {
            return Err(BirthdayValidationError::EmptyName);
        }
        if self.parsed_date().is_none() {
            return Err(BirthdayValidationError::InvalidDate(self.date.clone()));
        }
        if !self
            .phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
        {
            return Err(BirthdayValidationError::InvalidPhone(self.phone.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BirthdayDate, BirthdayRecord, BirthdayValidationError};

    #[test]
    fn parse_accepts_both_separators_and_whitespace() {
        let expected = Some(BirthdayDate { day: 5, month: 6 });
        assert_eq!(BirthdayDate::parse("05-06"), expected);
        assert_eq!(BirthdayDate::parse("5/6"), expected);
        assert_eq!(BirthdayDate::parse("  05/06 "), expected);
    }

    #[test]
    fn parse_rejects_missing_or_non_numeric_tokens() {
        assert_eq!(BirthdayDate::parse(""), None);
        assert_eq!(BirthdayDate::parse("abc"), None);
        assert_eq!(BirthdayDate::parse("13"), None);
        assert_eq!(BirthdayDate::parse("12-xx"), None);
        assert_eq!(BirthdayDate::parse("00-05"), None);
        assert_eq!(BirthdayDate::parse("10-13"), None);
    }

    #[test]
    fn parse_keeps_impossible_day_month_combinations() {
        assert_eq!(
            BirthdayDate::parse("31-02"),
            Some(BirthdayDate { day: 31, month: 2 })
        );
    }

    #[test]
    fn sort_key_is_month_major() {
        let key = BirthdayDate::parse("01-09").expect("valid date").sort_key();
        assert_eq!(key, 901);
    }

    #[test]
    fn validate_reports_first_broken_field() {
        let record = BirthdayRecord::new(" ", "01-01", "");
        assert_eq!(record.validate(), Err(BirthdayValidationError::EmptyName));

        let record = BirthdayRecord::new("Ana", "someday", "");
        assert!(matches!(
            record.validate(),
            Err(BirthdayValidationError::InvalidDate(_))
        ));

        let record = BirthdayRecord::new("Ana", "01-01", "call me");
        assert!(matches!(
            record.validate(),
            Err(BirthdayValidationError::InvalidPhone(_))
        ));

        let record = BirthdayRecord::new("Ana", "01-01", "+34 600-000 000");
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn blank_message_is_unset() {
        let record = BirthdayRecord::new("Ana", "01-01", "").with_message("   ");
        assert_eq!(record.custom_message(), None);
        let record = record.with_message("Hi!");
        assert_eq!(record.custom_message(), Some("Hi!"));
    }
}
