use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use youknow_core::Visit;

use crate::snapshot::Snapshot;
use crate::types::{IngestStats, Result, SourceProbe};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Microseconds between 1601-01-01 and 1970-01-01.
const CHROME_EPOCH_OFFSET_US: i64 = 11_644_473_600 * 1_000_000;

const PAGE_SQL: &str = "
    SELECT v.id, v.visit_time, u.url, u.title, u.visit_count
    FROM visits v
    JOIN urls u ON u.id = v.url
    WHERE v.visit_time >= ?1
      AND (v.visit_time > ?2 OR (v.visit_time = ?2 AND v.id > ?3))
    ORDER BY v.visit_time ASC, v.id ASC
    LIMIT ?4";

pub fn chrome_time_to_utc(chrome_us: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(chrome_us.checked_sub(CHROME_EPOCH_OFFSET_US)?)
}

pub fn utc_to_chrome_time(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros().saturating_add(CHROME_EPOCH_OFFSET_US)
}

/// Opens a private copy of `path` and streams its visits at or after `since`.
pub fn read_history(path: &Path, since: DateTime<Utc>) -> Result<VisitStream> {
    let snapshot = Snapshot::take(path)?;
    let conn = snapshot.open()?;
    Ok(VisitStream {
        conn,
        since: utc_to_chrome_time(since),
        cursor: (i64::MIN, i64::MIN),
        batch_size: DEFAULT_BATCH_SIZE,
        buffer: VecDeque::new(),
        exhausted: false,
        visits_read: 0,
        snapshot,
    })
}

/// Visits in ascending time order, paged from the snapshot on demand.
///
/// Dropping the stream closes the connection and then removes the copy.
pub struct VisitStream {
    conn: Connection,
    since: i64,
    cursor: (i64, i64),
    batch_size: usize,
    buffer: VecDeque<Visit>,
    exhausted: bool,
    visits_read: usize,
    snapshot: Snapshot,
}

impl VisitStream {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            source_path: self.snapshot.source().display().to_string(),
            visits_read: self.visits_read,
            snapshot_bytes: self.snapshot.bytes(),
        }
    }

    /// Time of the oldest visit the snapshot holds, whether or not it falls after `since`.
    pub fn oldest_visit(&self) -> Result<Option<DateTime<Utc>>> {
        let oldest: Option<i64> = self
            .conn
            .query_row("SELECT MIN(visit_time) FROM visits", [], |row| row.get(0))
            .map_err(|err| self.snapshot.malformed(err))?;
        Ok(oldest.and_then(chrome_time_to_utc))
    }

    fn fetch_page(&mut self) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare_cached(PAGE_SQL)
            .map_err(|err| self.snapshot.malformed(err))?;
        let rows = stmt
            .query_map(
                params![self.since, self.cursor.0, self.cursor.1, self.batch_size as i64],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                        row.get::<_, Option<i64>>(4)?,
                    ))
                },
            )
            .map_err(|err| self.snapshot.malformed(err))?;

        let mut fetched = 0usize;
        for row in rows {
            let (id, visit_time, url, title, visit_count) =
                row.map_err(|err| self.snapshot.malformed(err))?;
            let timestamp = chrome_time_to_utc(visit_time).ok_or_else(|| {
                self.snapshot
                    .malformed(format!("visit {id} has out-of-range time {visit_time}"))
            })?;
            self.cursor = (visit_time, id);
            self.buffer.push_back(Visit {
                url,
                title: title.unwrap_or_default(),
                timestamp,
                visit_count: visit_count.unwrap_or(1).clamp(1, u32::MAX as i64) as u32,
            });
            fetched += 1;
        }
        if fetched < self.batch_size {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl Iterator for VisitStream {
    type Item = Result<Visit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
        let visit = self.buffer.pop_front()?;
        self.visits_read += 1;
        Some(Ok(visit))
    }
}

/// Checks a history file through a private copy and reports what it holds.
pub fn probe_history(path: &Path) -> SourceProbe {
    let mut probe = SourceProbe {
        path: path.display().to_string(),
        accessible: false,
        size_bytes: fs::metadata(path).map(|meta| meta.len()).unwrap_or(0),
        url_count: None,
        visit_count: None,
        error: None,
    };
    let counted = Snapshot::take(path).and_then(|snapshot| {
        let conn = snapshot.open()?;
        let count = |table: &str| -> Result<u64> {
            conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get::<_, i64>(0)
            })
            .map(|n| n.max(0) as u64)
            .map_err(|err| snapshot.malformed(err))
        };
        Ok((count("urls")?, count("visits")?))
    });
    match counted {
        Ok((urls, visits)) => {
            probe.accessible = true;
            probe.url_count = Some(urls);
            probe.visit_count = Some(visits);
        }
        Err(err) => probe.error = Some(err.to_string()),
    }
    probe
}
