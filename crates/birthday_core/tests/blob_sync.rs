use birthday_core::db::open_db_in_memory;
use birthday_core::{
    pull, push, BirthdayRecord, BirthdayRepository, BlobStore, MemoryBlobStore,
    SqliteBirthdayRepository, SyncError,
};

#[test]
fn push_then_pull_restores_list_on_another_device() {
    let store = MemoryBlobStore::new();

    let phone_conn = open_db_in_memory().unwrap();
    let phone = SqliteBirthdayRepository::try_new(&phone_conn).unwrap();
    phone
        .save(None, &BirthdayRecord::new("Ana", "01-02", "+34").with_message("Hi"))
        .unwrap();
    phone
        .save(None, &BirthdayRecord::new("Bo", "03/04", ""))
        .unwrap();
    assert_eq!(push(&phone, &store, "user-1").unwrap(), 2);

    let tablet_conn = open_db_in_memory().unwrap();
    let tablet = SqliteBirthdayRepository::try_new(&tablet_conn).unwrap();
    tablet
        .save(None, &BirthdayRecord::new("Stale", "05-05", ""))
        .unwrap();
    assert_eq!(pull(&tablet, &store, "user-1").unwrap(), 2);

    let restored = tablet.load_all().unwrap();
    let summary = restored
        .iter()
        .map(|record| (record.name.as_str(), record.date.as_str(), record.message.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![("Ana", "01-02", "Hi"), ("Bo", "03/04", "")]);
}

#[test]
fn pull_without_remote_document_clears_local_list() {
    let store = MemoryBlobStore::new();
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    repo.save(None, &BirthdayRecord::new("Ana", "01-02", "")).unwrap();

    assert_eq!(pull(&repo, &store, "nobody").unwrap(), 0);
    assert!(repo.load_all().unwrap().is_empty());
}

#[test]
fn corrupt_remote_document_leaves_local_list_untouched() {
    let store = MemoryBlobStore::new();
    store.upload("user-1", "{not json").unwrap();
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();
    repo.save(None, &BirthdayRecord::new("Ana", "01-02", "")).unwrap();

    let err = pull(&repo, &store, "user-1").unwrap_err();
    assert!(matches!(err, SyncError::Decode(_)));
    assert_eq!(repo.load_all().unwrap().len(), 1);
}

#[test]
fn blank_user_id_is_rejected() {
    let store = MemoryBlobStore::new();
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBirthdayRepository::try_new(&conn).unwrap();

    let err = push(&repo, &store, "  ").unwrap_err();
    assert!(matches!(err, SyncError::InvalidUserId(_)));
}
