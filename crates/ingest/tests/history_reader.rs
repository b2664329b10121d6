mod support;

use std::fs;

use chrono::Duration;
use ingest::{IngestError, locate_history, probe_history, read_history};
use rusqlite::Connection;
use support::{at, history_fixture};

#[test]
fn reads_visits_in_time_order_across_pages() {
    let fixture = history_fixture(&[
        ("https://twitter.com/home", "Home / X", at(10, 40)),
        ("https://github.com/rust-lang/rust", "rust-lang/rust", at(10, 0)),
        ("https://github.com/rust-lang/rust/pulls", "Pull requests", at(10, 5)),
        ("https://github.com/rust-lang/rust", "rust-lang/rust", at(10, 10)),
        ("https://www.google.com/search?q=rusqlite+wal", "rusqlite wal - Google", at(10, 5)),
    ]);

    let mut stream = read_history(&fixture.path, at(0, 0))
        .expect("open history")
        .with_batch_size(2);
    let visits: Vec<_> = stream
        .by_ref()
        .collect::<Result<_, _>>()
        .expect("read visits");

    assert_eq!(visits.len(), 5);
    assert!(visits.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert_eq!(visits[0].url, "https://github.com/rust-lang/rust");
    assert_eq!(visits[4].url, "https://twitter.com/home");
    assert_eq!(visits[0].visit_count, 2);
    assert_eq!(stream.stats().visits_read, 5);
}

#[test]
fn filters_visits_before_since() {
    let fixture = history_fixture(&[
        ("https://news.ycombinator.com/", "Hacker News", at(8, 0)),
        ("https://docs.rs/tokio", "tokio - Rust", at(9, 0)),
        ("https://docs.rs/axum", "axum - Rust", at(9, 30)),
    ]);

    let visits: Vec<_> = read_history(&fixture.path, at(9, 0))
        .expect("open history")
        .collect::<Result<_, _>>()
        .expect("read visits");

    assert_eq!(visits.len(), 2);
    assert_eq!(visits[0].timestamp, at(9, 0));
    assert_eq!(visits[1].title, "axum - Rust");
}

#[test]
fn oldest_visit_ignores_since() {
    let fixture = history_fixture(&[
        ("https://news.ycombinator.com/", "Hacker News", at(8, 0)),
        ("https://docs.rs/tokio", "tokio - Rust", at(9, 0)),
    ]);
    let stream = read_history(&fixture.path, at(9, 0)).expect("open history");
    assert_eq!(stream.oldest_visit().expect("oldest"), Some(at(8, 0)));

    let empty = history_fixture(&[]);
    let stream = read_history(&empty.path, at(0, 0)).expect("open history");
    assert_eq!(stream.oldest_visit().expect("oldest"), None);
}

#[test]
fn stream_is_finite_and_not_restartable() {
    let fixture = history_fixture(&[("https://example.com/", "Example", at(12, 0))]);
    let mut stream = read_history(&fixture.path, at(0, 0)).expect("open history");
    assert!(stream.next().is_some());
    assert!(stream.next().is_none());
    assert!(stream.next().is_none());
}

#[test]
fn original_file_is_left_untouched() {
    let fixture = history_fixture(&[("https://example.com/", "Example", at(12, 0))]);
    let before = fs::read(&fixture.path).expect("read original");
    let visits: Vec<_> = read_history(&fixture.path, at(0, 0) - Duration::days(1))
        .expect("open history")
        .collect();
    assert_eq!(visits.len(), 1);
    assert_eq!(fs::read(&fixture.path).expect("read original"), before);
}

#[test]
fn missing_snapshot_is_source_unavailable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = read_history(&dir.path().join("History"), at(0, 0))
        .err()
        .expect("missing history");
    assert!(err.is_unavailable());
}

#[test]
fn unexpected_schema_is_malformed() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("History");
    {
        let conn = Connection::open(&path).expect("open");
        conn.execute_batch("CREATE TABLE bookmarks (id INTEGER PRIMARY KEY, url TEXT);")
            .expect("schema");
    }
    let err = read_history(&path, at(0, 0)).err().expect("bad schema");
    assert!(matches!(err, IngestError::MalformedSource { .. }));
    assert!(err.to_string().contains("urls"));
}

#[test]
fn locate_prefers_explicit_path() {
    let fixture = history_fixture(&[("https://example.com/", "Example", at(12, 0))]);
    let found = locate_history(Some(&fixture.path)).expect("locate");
    assert_eq!(found, fixture.path);
}

#[test]
fn probe_reports_counts() {
    let fixture = history_fixture(&[
        ("https://github.com/", "GitHub", at(9, 0)),
        ("https://github.com/", "GitHub", at(9, 5)),
        ("https://docs.rs/", "Docs.rs", at(9, 10)),
    ]);
    let probe = probe_history(&fixture.path);
    assert!(probe.accessible);
    assert_eq!(probe.url_count, Some(2));
    assert_eq!(probe.visit_count, Some(3));
    assert!(probe.error.is_none());
    assert!(probe.size_bytes > 0);

    let missing = probe_history(&fixture.path.with_file_name("Missing"));
    assert!(!missing.accessible);
    assert!(missing.error.is_some());
}
