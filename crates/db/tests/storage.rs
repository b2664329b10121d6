mod support;

use std::sync::Arc;

use support::{day, focus_point, make_cycle};
use youknow_core::TimeRange;
use youknow_db::{
    MemoryStorage, SqliteStorage, StorageAdapter, StorageBackend, StorageConfig, StorageError,
    select_storage,
};

fn week_range() -> TimeRange {
    TimeRange {
        start: day(1).to_rfc3339(),
        end: day(8).to_rfc3339(),
    }
}

fn exercise(storage: &dyn StorageAdapter) {
    storage.health_check().expect("healthy");
    assert!(storage.latest().expect("latest").is_none());

    for d in [2, 4, 6] {
        let points = vec![focus_point(7, day(d), u64::from(d)), focus_point(1, day(d), 0)];
        assert_eq!(storage.write(&make_cycle(day(d)), &points).expect("write"), 2);
    }

    let points = storage.query("focus", 7, &week_range()).expect("query");
    assert_eq!(points.len(), 3);
    assert!(points.windows(2).all(|pair| pair[0].ts < pair[1].ts));

    let (cycle, latest) = storage.latest().expect("latest").expect("some");
    assert_eq!(cycle.ts, day(6));
    assert_eq!(latest.len(), 2);

    assert_eq!(storage.delete_before(day(4)).expect("delete"), 2);
    assert_eq!(storage.query("focus", 7, &week_range()).expect("query").len(), 2);
}

#[test]
fn memory_storage_contract() {
    let storage = MemoryStorage::new();
    exercise(&storage);
    assert_eq!(storage.backend_name(), "memory");
    assert!(!storage.is_durable());
}

#[test]
fn sqlite_storage_contract() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = SqliteStorage::open(dir.path().join("points.sqlite")).expect("open");
    exercise(&storage);
    assert_eq!(storage.backend_name(), "sqlite");
    assert!(storage.is_durable());
}

#[test]
fn selection_honours_configured_backend() {
    let dir = tempfile::tempdir().expect("temp dir");
    let sqlite = select_storage(&StorageConfig {
        backend: StorageBackend::Sqlite,
        db_path: dir.path().join("youknow.sqlite"),
    });
    assert!(!sqlite.fallback);
    assert_eq!(sqlite.adapter.backend_name(), "sqlite");

    let memory = select_storage(&StorageConfig {
        backend: StorageBackend::Memory,
        db_path: dir.path().join("unused.sqlite"),
    });
    assert!(!memory.fallback);
    assert_eq!(memory.adapter.backend_name(), "memory");
}

#[test]
fn removed_database_reports_backend_unreachable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_dir = dir.path().join("data");
    std::fs::create_dir_all(&db_dir).expect("mkdir");
    let storage: Arc<dyn StorageAdapter> =
        Arc::new(SqliteStorage::open(db_dir.join("youknow.sqlite")).expect("open"));
    std::fs::remove_dir_all(&db_dir).expect("remove data dir");

    let err = storage
        .write(&make_cycle(day(2)), &[focus_point(7, day(2), 1)])
        .expect_err("unreachable");
    assert!(matches!(err, StorageError::BackendUnreachable(_)));
    assert!(storage.health_check().is_err());
}

#[test]
fn bad_range_is_invalid_request() {
    let storage = MemoryStorage::new();
    let err = storage
        .query(
            "focus",
            7,
            &TimeRange {
                start: "nope".to_string(),
                end: "nope".to_string(),
            },
        )
        .expect_err("invalid");
    assert!(matches!(err, StorageError::InvalidRequest(_)));
}
