//! JSON blob codec and per-user blob store contract.

use crate::model::birthday::BirthdayRecord;
use crate::repo::birthday_repo::{BirthdayRepository, RepoError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;

pub type SyncResult<T> = Result<T, SyncError>;

/// Sync-layer errors.
#[derive(Debug)]
pub enum SyncError {
    InvalidUserId(String),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
    /// Remote store failure, with a stable code and human-readable message.
    Remote { code: &'static str, message: String },
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUserId(value) => write!(f, "invalid sync user id: `{value}`"),
            Self::Decode(err) => write!(f, "invalid birthday blob: {err}"),
            Self::Encode(err) => write!(f, "failed to encode birthday blob: {err}"),
            Self::Remote { code, message } => write!(f, "remote store error [{code}]: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Wire shape of one record inside the blob.
///
/// Identity is local-only and not part of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct BlobEntry {
    name: String,
    date: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    message: String,
}

/// Encodes records as a JSON array of `{name, date, phone, message}`.
pub fn export_json(records: &[BirthdayRecord]) -> SyncResult<String> {
    let entries = records
        .iter()
        .map(|record| BlobEntry {
            name: record.name.clone(),
            date: record.date.clone(),
            phone: record.phone.clone(),
            message: record.message.clone(),
        })
        .collect::<Vec<_>>();
    serde_json::to_string(&entries).map_err(SyncError::Encode)
}

/// Decodes a blob into records with freshly generated IDs.
///
/// Dates are kept verbatim; malformed ones degrade at evaluation time.
pub fn import_json(text: &str) -> SyncResult<Vec<BirthdayRecord>> {
    let entries: Vec<BlobEntry> = serde_json::from_str(text).map_err(SyncError::Decode)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            BirthdayRecord::new(entry.name, entry.date, entry.phone).with_message(entry.message)
        })
        .collect())
}

/// Remote document store holding one blob per user.
pub trait BlobStore {
    fn upload(&self, user_id: &str, json: &str) -> SyncResult<()>;
    fn download(&self, user_id: &str) -> SyncResult<Option<String>>;
}

/// Uploads the full local list for `user_id`. Returns the record count.
pub fn push<R: BirthdayRepository, B: BlobStore + ?Sized>(
    repo: &R,
    store: &B,
    user_id: &str,
) -> SyncResult<usize> {
    let user_id = normalize_user_id(user_id)?;
    let records = repo.load_all()?;
    let json = export_json(&records)?;
    if let Err(err) = store.upload(user_id, &json) {
        error!("event=sync_push module=sync status=error error={err}");
        return Err(err);
    }
    info!(
        "event=sync_push module=sync status=ok records={}",
        records.len()
    );
    Ok(records.len())
}

/// Replaces the local list with the remote blob for `user_id`.
///
/// A missing document clears local state. Returns the record count.
pub fn pull<R: BirthdayRepository, B: BlobStore + ?Sized>(
    repo: &R,
    store: &B,
    user_id: &str,
) -> SyncResult<usize> {
    let user_id = normalize_user_id(user_id)?;
    let records = match store.download(user_id)? {
        Some(json) => import_json(&json)?,
        None => Vec::new(),
    };
    repo.replace_all(&records)?;
    info!(
        "event=sync_pull module=sync status=ok records={}",
        records.len()
    );
    Ok(records.len())
}

/// In-process blob store keyed by user id.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    documents: Mutex<BTreeMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn upload(&self, user_id: &str, json: &str) -> SyncResult<()> {
        let mut documents = self.documents.lock().map_err(|_| SyncError::Remote {
            code: "lock_poisoned",
            message: "memory blob store lock poisoned".to_string(),
        })?;
        documents.insert(user_id.to_string(), json.to_string());
        Ok(())
    }

    fn download(&self, user_id: &str) -> SyncResult<Option<String>> {
        let documents = self.documents.lock().map_err(|_| SyncError::Remote {
            code: "lock_poisoned",
            message: "memory blob store lock poisoned".to_string(),
        })?;
        Ok(documents.get(user_id).cloned())
    }
}

fn normalize_user_id(user_id: &str) -> SyncResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() || trimmed.contains('/') {
        return Err(SyncError::InvalidUserId(user_id.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::{export_json, import_json, SyncError};
    use crate::model::birthday::BirthdayRecord;

    #[test]
    fn import_defaults_missing_phone_and_message() {
        let records = import_json(r#"[{"name":"Ana","date":"01/02"}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, "01/02");
        assert_eq!(records[0].phone, "");
        assert_eq!(records[0].message, "");
    }

    #[test]
    fn import_rejects_non_array_document() {
        let err = import_json(r#"{"name":"Ana"}"#).unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[test]
    fn export_keeps_custom_message_and_omits_ids() {
        let record = BirthdayRecord::new("Ana", "01-02", "+34").with_message("Hi");
        let json = export_json(&[record]).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"Ana","date":"01-02","phone":"+34","message":"Hi"}]"#
        );
    }
}
