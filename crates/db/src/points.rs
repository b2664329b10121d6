use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{OptionalExtension, Row, params};
use youknow_core::TimeRange;

use crate::Db;
use crate::error::Result;
use crate::types::{CycleRecord, MetricPoint};

pub(crate) fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

fn normalize_range(range: &TimeRange) -> Result<(String, String)> {
    Ok((
        format_ts(parse_ts(&range.start)?),
        format_ts(parse_ts(&range.end)?),
    ))
}

fn point_from_row(row: &Row<'_>) -> rusqlite::Result<(String, i64, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode_point(raw: (String, i64, String, String)) -> Result<MetricPoint> {
    let (metric, window_days, ts, value_json) = raw;
    Ok(MetricPoint {
        metric,
        window_days: window_days.max(0) as u32,
        ts: parse_ts(&ts)?,
        value: serde_json::from_str(&value_json)?,
    })
}

impl Db {
    /// Writes a cycle record and its points in one transaction.
    pub fn insert_cycle(&mut self, cycle: &CycleRecord, points: &[MetricPoint]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO pipeline_cycle (ts, source_path, visits_read, windows)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(ts) DO UPDATE SET
              source_path = excluded.source_path,
              visits_read = excluded.visits_read,
              windows = excluded.windows
            "#,
            params![
                format_ts(cycle.ts),
                cycle.source_path,
                cycle.visits_read as i64,
                serde_json::to_string(&cycle.windows)?,
            ],
        )?;
        let mut written = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO metric_point (metric, window_days, ts, value_json)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )?;
            for point in points {
                written += stmt.execute(params![
                    point.metric,
                    point.window_days as i64,
                    format_ts(point.ts),
                    serde_json::to_string(&point.value)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(written)
    }

    /// Points for one metric and window size with `start <= ts < end`, oldest first.
    pub fn query_points(
        &self,
        metric: &str,
        window_days: u32,
        range: &TimeRange,
    ) -> Result<Vec<MetricPoint>> {
        let (start, end) = normalize_range(range)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT metric, window_days, ts, value_json
            FROM metric_point
            WHERE metric = ?1 AND window_days = ?2 AND ts >= ?3 AND ts < ?4
            ORDER BY ts ASC
            "#,
        )?;
        let rows = stmt.query_map(
            params![metric, window_days as i64, start, end],
            point_from_row,
        )?;
        let mut points = Vec::new();
        for row in rows {
            points.push(decode_point(row?)?);
        }
        Ok(points)
    }

    pub fn latest_cycle(&self) -> Result<Option<CycleRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT ts, source_path, visits_read, windows
                FROM pipeline_cycle
                ORDER BY ts DESC
                LIMIT 1
                "#,
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;
        let Some((ts, source_path, visits_read, windows)) = row else {
            return Ok(None);
        };
        Ok(Some(CycleRecord {
            ts: parse_ts(&ts)?,
            source_path,
            visits_read: visits_read.max(0) as u64,
            windows: serde_json::from_str(&windows)?,
        }))
    }

    /// Every point stamped with exactly `ts`.
    pub fn points_at(&self, ts: DateTime<Utc>) -> Result<Vec<MetricPoint>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT metric, window_days, ts, value_json
            FROM metric_point
            WHERE ts = ?1
            ORDER BY window_days ASC, metric ASC
            "#,
        )?;
        let rows = stmt.query_map([format_ts(ts)], point_from_row)?;
        let mut points = Vec::new();
        for row in rows {
            points.push(decode_point(row?)?);
        }
        Ok(points)
    }

    /// Deletes points and cycle records older than `cutoff`.
    pub fn delete_before(&mut self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = format_ts(cutoff);
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM metric_point WHERE ts < ?1", [&cutoff])?;
        tx.execute("DELETE FROM pipeline_cycle WHERE ts < ?1", [&cutoff])?;
        tx.commit()?;
        Ok(deleted)
    }

    pub fn count_points(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM metric_point", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}
