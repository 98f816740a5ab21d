//! Birthday CRUD service.
//!
//! # Responsibility
//! - Provide add/edit/delete entry points for the list screen.
//! - Normalize user input before it reaches the repository.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Replacing a record by position keeps the identity already stored there.

use crate::model::birthday::{BirthdayRecord, RecordId};
use crate::repo::birthday_repo::{BirthdayRepository, RepoResult};
use log::info;

/// User input for creating or editing a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthdayDraft {
    pub name: String,
    pub date: String,
    pub phone: String,
    pub message: String,
}

impl BirthdayDraft {
    pub fn new(name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    fn into_record(self, id: Option<RecordId>) -> BirthdayRecord {
        let id = id.unwrap_or_else(uuid::Uuid::new_v4);
        BirthdayRecord::with_id(id, self.name.trim(), self.date.trim(), self.phone.trim())
            .with_message(self.message.trim())
    }
}

/// Use-case service wrapper for birthday CRUD operations.
pub struct BirthdayService<R: BirthdayRepository> {
    repo: R,
}

impl<R: BirthdayRepository> BirthdayService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a new record with a generated stable ID.
    pub fn create(&self, draft: BirthdayDraft) -> RepoResult<BirthdayRecord> {
        let record = draft.into_record(None);
        self.repo.save(None, &record)?;
        info!("event=birthday_create module=service status=ok");
        Ok(record)
    }

    /// Saves by position: replaces at `index` when `Some`, appends otherwise.
    pub fn save_at(
        &self,
        index: Option<usize>,
        draft: BirthdayDraft,
    ) -> RepoResult<BirthdayRecord> {
        let Some(index) = index else {
            return self.create(draft);
        };

        let mut record = draft.into_record(None);
        record.id = self.repo.replace_at(index, &record)?;
        info!("event=birthday_replace module=service status=ok index={index}");
        Ok(record)
    }

    /// Edits the record with stable `id`.
    pub fn update(&self, id: RecordId, draft: BirthdayDraft) -> RepoResult<BirthdayRecord> {
        let record = draft.into_record(Some(id));
        self.repo.update(&record)?;
        info!("event=birthday_update module=service status=ok");
        Ok(record)
    }

    /// Deletes by display position.
    pub fn delete_at(&self, index: usize) -> RepoResult<()> {
        self.repo.delete(index)?;
        info!("event=birthday_delete module=service status=ok index={index}");
        Ok(())
    }

    /// Deletes by stable ID.
    pub fn delete(&self, id: RecordId) -> RepoResult<()> {
        self.repo.delete_by_id(id)?;
        info!("event=birthday_delete module=service status=ok");
        Ok(())
    }

    pub fn get(&self, id: RecordId) -> RepoResult<Option<BirthdayRecord>> {
        self.repo.get(id)
    }

    /// Lists every record in display order.
    pub fn list(&self) -> RepoResult<Vec<BirthdayRecord>> {
        self.repo.load_all()
    }
}
