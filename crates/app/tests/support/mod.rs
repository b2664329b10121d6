#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rusqlite::{Connection, params};
use tempfile::TempDir;
use youknow_app::{AppConfig, AppState, PipelineConfig};
use youknow_db::StorageBackend;

const CHROME_EPOCH_OFFSET_US: i64 = 11_644_473_600 * 1_000_000;

const CHROMIUM_SCHEMA: &str = r#"
CREATE TABLE urls (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  url LONGVARCHAR,
  title LONGVARCHAR,
  visit_count INTEGER DEFAULT 0 NOT NULL,
  last_visit_time INTEGER NOT NULL
);
CREATE TABLE visits (
  id INTEGER PRIMARY KEY,
  url INTEGER NOT NULL,
  visit_time INTEGER NOT NULL,
  transition INTEGER DEFAULT 0 NOT NULL
);
"#;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    now() - Duration::minutes(minutes)
}

/// Replaces `path` with a Chromium-shaped history holding one visit per entry.
pub fn write_history(path: &Path, visits: &[(&str, DateTime<Utc>)]) {
    if path.exists() {
        fs::remove_file(path).expect("remove old history");
    }
    let conn = Connection::open(path).expect("open history");
    conn.execute_batch(CHROMIUM_SCHEMA).expect("schema");
    for (url, ts) in visits {
        let chrome = ts.timestamp_micros() + CHROME_EPOCH_OFFSET_US;
        conn.execute(
            "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, '', 1, ?2)",
            params![url, chrome],
        )
        .expect("insert url");
        let url_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO visits (url, visit_time) VALUES (?1, ?2)",
            params![url_id, chrome],
        )
        .expect("insert visit");
    }
}

pub fn morning_history() -> Vec<(&'static str, DateTime<Utc>)> {
    vec![
        ("https://github.com/rust-lang/rust", minutes_ago(120)),
        ("https://github.com/rust-lang/rust/pulls", minutes_ago(115)),
        ("https://docs.rs/tokio/latest/tokio/", minutes_ago(110)),
        ("https://www.google.com/search?q=tokio+interval", minutes_ago(108)),
        ("https://twitter.com/home", minutes_ago(60)),
    ]
}

pub struct TestApp {
    pub _dir: TempDir,
    pub history_path: PathBuf,
    pub db_path: PathBuf,
    pub config: AppConfig,
}

pub fn test_config(dir: &Path, storage: StorageBackend, windows_days: Vec<u32>) -> AppConfig {
    AppConfig {
        db_path: dir.join("youknow.sqlite"),
        history_path: Some(dir.join("History")),
        pipeline: PipelineConfig {
            windows_days,
            storage,
            ..PipelineConfig::default()
        },
    }
}

pub fn setup_app(storage: StorageBackend, windows_days: Vec<u32>) -> TestApp {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = test_config(dir.path(), storage, windows_days);
    let history_path = dir.path().join("History");
    write_history(&history_path, &morning_history());
    TestApp {
        history_path,
        db_path: config.db_path.clone(),
        config,
        _dir: dir,
    }
}

impl TestApp {
    pub fn state(&self) -> AppState {
        AppState::new(self.config.clone())
    }
}
