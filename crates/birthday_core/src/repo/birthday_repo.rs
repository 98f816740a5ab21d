//! Birthday repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide the record store used by the daily check and the list screen.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `position` values form the contiguous range `0..len` after every write.
//! - `load_all` always re-reads the full list; nothing is cached.
//! - Interactive write paths call `BirthdayRecord::validate()`.
//! - `replace_all` stores imported records as-is; malformed dates survive
//!   storage and degrade at evaluation time.

use crate::db::migrations::latest_version;
use crate::db::{schema_version, DbError};
use crate::model::birthday::{BirthdayRecord, BirthdayValidationError, RecordId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const BIRTHDAY_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    date,
    phone,
    message
FROM birthdays";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for birthday persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BirthdayValidationError),
    Db(DbError),
    NotFound(RecordId),
    IndexOutOfRange { index: usize, len: usize },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "birthday not found: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "birthday index {index} out of range for {len} record(s)")
            }
            Self::InvalidData(message) => {
                write!(f, "invalid persisted birthday data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BirthdayValidationError> for RepoError {
    fn from(value: BirthdayValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store contract.
///
/// Positional operations mirror the list screen; id-based operations are
/// the stable handles edits and deletes should prefer.
pub trait BirthdayRepository {
    /// Loads every record in display order.
    fn load_all(&self) -> RepoResult<Vec<BirthdayRecord>>;
    /// Replaces the record at `index` when `Some`, appends when `None`.
    fn save(&self, index: Option<usize>, record: &BirthdayRecord) -> RepoResult<RecordId>;
    /// Overwrites the fields at `index`, keeping the identity stored there.
    ///
    /// Returns that identity; `record.id` is ignored.
    fn replace_at(&self, index: usize, record: &BirthdayRecord) -> RepoResult<RecordId>;
    /// Removes the record at `index`; later records shift down by one.
    fn delete(&self, index: usize) -> RepoResult<()>;
    fn get(&self, id: RecordId) -> RepoResult<Option<BirthdayRecord>>;
    fn update(&self, record: &BirthdayRecord) -> RepoResult<()>;
    fn delete_by_id(&self, id: RecordId) -> RepoResult<()>;
    /// Atomically swaps the whole list, keeping the given order.
    fn replace_all(&self, records: &[BirthdayRecord]) -> RepoResult<()>;
}

/// SQLite-backed birthday repository.
pub struct SqliteBirthdayRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBirthdayRepository<'conn> {
    /// Wraps a connection produced by `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version = schema_version(conn)?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    fn begin(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl BirthdayRepository for SqliteBirthdayRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<BirthdayRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} ORDER BY position ASC"))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_birthday_row(row)?);
        }
        Ok(records)
    }

    fn save(&self, index: Option<usize>, record: &BirthdayRecord) -> RepoResult<RecordId> {
        record.validate()?;

        let tx = self.begin()?;
        match index {
            Some(index) => {
                let changed = tx.execute(
                    "UPDATE birthdays
                     SET
                        uuid = ?1,
                        name = ?2,
                        date = ?3,
                        phone = ?4,
                        message = ?5,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE position = ?6;",
                    params![
                        record.id.to_string(),
                        record.name.as_str(),
                        record.date.as_str(),
                        record.phone.as_str(),
                        record.message.as_str(),
                        position_to_db(index),
                    ],
                )?;
                if changed == 0 {
                    let len = count_in_tx(&tx)?;
                    return Err(RepoError::IndexOutOfRange { index, len });
                }
            }
            None => {
                let next_position = count_in_tx(&tx)?;
                insert_in_tx(&tx, next_position, record)?;
            }
        }
        tx.commit()?;

        Ok(record.id)
    }

    fn replace_at(&self, index: usize, record: &BirthdayRecord) -> RepoResult<RecordId> {
        record.validate()?;

        let tx = self.begin()?;
        let stored: Option<String> = tx
            .query_row(
                "SELECT uuid FROM birthdays WHERE position = ?1;",
                [position_to_db(index)],
                |row| row.get(0),
            )
            .optional()?;
        let Some(stored) = stored else {
            let len = count_in_tx(&tx)?;
            return Err(RepoError::IndexOutOfRange { index, len });
        };
        let id = Uuid::parse_str(&stored).map_err(|_| {
            RepoError::InvalidData(format!("invalid uuid value `{stored}` in birthdays.uuid"))
        })?;

        tx.execute(
            "UPDATE birthdays
             SET
                name = ?1,
                date = ?2,
                phone = ?3,
                message = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE position = ?5;",
            params![
                record.name.as_str(),
                record.date.as_str(),
                record.phone.as_str(),
                record.message.as_str(),
                position_to_db(index),
            ],
        )?;
        tx.commit()?;
        Ok(id)
    }

    fn delete(&self, index: usize) -> RepoResult<()> {
        let tx = self.begin()?;
        let changed = tx.execute(
            "DELETE FROM birthdays WHERE position = ?1;",
            [position_to_db(index)],
        )?;
        if changed == 0 {
            let len = count_in_tx(&tx)?;
            return Err(RepoError::IndexOutOfRange { index, len });
        }
        close_gap_in_tx(&tx, index)?;
        tx.commit()?;
        Ok(())
    }

    fn get(&self, id: RecordId) -> RepoResult<Option<BirthdayRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BIRTHDAY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_birthday_row(row)?));
        }
        Ok(None)
    }

    fn update(&self, record: &BirthdayRecord) -> RepoResult<()> {
        record.validate()?;

        let changed = self.conn.execute(
            "UPDATE birthdays
             SET
                name = ?1,
                date = ?2,
                phone = ?3,
                message = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?5;",
            params![
                record.name.as_str(),
                record.date.as_str(),
                record.phone.as_str(),
                record.message.as_str(),
                record.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(record.id));
        }
        Ok(())
    }

    fn delete_by_id(&self, id: RecordId) -> RepoResult<()> {
        let tx = self.begin()?;
        let position: Option<i64> = tx
            .query_row(
                "SELECT position FROM birthdays WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(position) = position else {
            return Err(RepoError::NotFound(id));
        };

        tx.execute("DELETE FROM birthdays WHERE uuid = ?1;", [id.to_string()])?;
        close_gap_in_tx(&tx, position_from_db(position)?)?;
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&self, records: &[BirthdayRecord]) -> RepoResult<()> {
        let tx = self.begin()?;
        tx.execute("DELETE FROM birthdays;", [])?;
        for (position, record) in records.iter().enumerate() {
            insert_in_tx(&tx, position, record)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn insert_in_tx(tx: &Transaction<'_>, position: usize, record: &BirthdayRecord) -> RepoResult<()> {
    tx.execute(
        "INSERT INTO birthdays (
            uuid,
            position,
            name,
            date,
            phone,
            message
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            record.id.to_string(),
            position_to_db(position),
            record.name.as_str(),
            record.date.as_str(),
            record.phone.as_str(),
            record.message.as_str(),
        ],
    )?;
    Ok(())
}

fn close_gap_in_tx(tx: &Transaction<'_>, removed_position: usize) -> RepoResult<()> {
    tx.execute(
        "UPDATE birthdays SET position = position - 1 WHERE position > ?1;",
        [position_to_db(removed_position)],
    )?;
    Ok(())
}

fn count_in_tx(tx: &Transaction<'_>) -> RepoResult<usize> {
    let count: i64 = tx.query_row("SELECT COUNT(*) FROM birthdays;", [], |row| row.get(0))?;
    position_from_db(count)
}

fn parse_birthday_row(row: &Row<'_>) -> RepoResult<BirthdayRecord> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in birthdays.uuid"))
    })?;

    Ok(BirthdayRecord {
        id,
        name: row.get("name")?,
        date: row.get("date")?,
        phone: row.get("phone")?,
        message: row.get("message")?,
    })
}

fn position_to_db(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

fn position_from_db(value: i64) -> RepoResult<usize> {
    usize::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid position value `{value}`")))
}
