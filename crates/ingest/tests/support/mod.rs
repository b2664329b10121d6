#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{Connection, params};
use tempfile::TempDir;

const CHROME_EPOCH_OFFSET_US: i64 = 11_644_473_600 * 1_000_000;

const CHROMIUM_SCHEMA: &str = r#"
CREATE TABLE urls (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  url LONGVARCHAR,
  title LONGVARCHAR,
  visit_count INTEGER DEFAULT 0 NOT NULL,
  typed_count INTEGER DEFAULT 0 NOT NULL,
  last_visit_time INTEGER NOT NULL,
  hidden INTEGER DEFAULT 0 NOT NULL
);
CREATE TABLE visits (
  id INTEGER PRIMARY KEY,
  url INTEGER NOT NULL,
  visit_time INTEGER NOT NULL,
  from_visit INTEGER,
  transition INTEGER DEFAULT 0 NOT NULL,
  segment_id INTEGER,
  visit_duration INTEGER DEFAULT 0 NOT NULL
);
"#;

pub struct HistoryFixture {
    pub _dir: TempDir,
    pub path: PathBuf,
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 6, hour, minute, 0).unwrap()
}

pub fn chrome_time(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros() + CHROME_EPOCH_OFFSET_US
}

/// Builds a Chromium-shaped `History` file with one visit per `(url, title, ts)` entry.
pub fn history_fixture(visits: &[(&str, &str, DateTime<Utc>)]) -> HistoryFixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("History");
    let conn = Connection::open(&path).expect("open history");
    conn.execute_batch(CHROMIUM_SCHEMA).expect("schema");
    for (url, title, ts) in visits {
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM urls WHERE url = ?1", [url], |row| row.get(0))
            .ok();
        let url_id = match existing {
            Some(id) => {
                conn.execute(
                    "UPDATE urls SET visit_count = visit_count + 1, last_visit_time = MAX(last_visit_time, ?2) WHERE id = ?1",
                    params![id, chrome_time(*ts)],
                )
                .expect("bump url");
                id
            }
            None => {
                conn.execute(
                    "INSERT INTO urls (url, title, visit_count, last_visit_time) VALUES (?1, ?2, 1, ?3)",
                    params![url, title, chrome_time(*ts)],
                )
                .expect("insert url");
                conn.last_insert_rowid()
            }
        };
        conn.execute(
            "INSERT INTO visits (url, visit_time) VALUES (?1, ?2)",
            params![url_id, chrome_time(*ts)],
        )
        .expect("insert visit");
    }
    HistoryFixture { _dir: dir, path }
}
