#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tempfile::TempDir;
use youknow_db::{CycleRecord, Db, MetricPoint};

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap()
}

pub fn make_cycle(ts: DateTime<Utc>) -> CycleRecord {
    CycleRecord {
        ts,
        source_path: "/tmp/History".to_string(),
        visits_read: 42,
        windows: vec![1, 7],
    }
}

pub fn focus_point(window_days: u32, ts: DateTime<Utc>, docs_min: u64) -> MetricPoint {
    MetricPoint::new(
        "focus",
        window_days,
        ts,
        json!({ "docs_min": docs_min, "social_min": 5, "score": 0.5 }),
    )
}
