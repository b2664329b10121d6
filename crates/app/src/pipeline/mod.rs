//! Periodic ingest → aggregate → persist cycle and the read model it publishes.

mod flight;
mod points;
mod read_model;
mod status;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use analytics::{Aggregates, Window, analyze_window};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use youknow_core::{CategorizedVisit, Dashboard, FocusMetrics, TimeRange, TrendMetrics, trend};
use youknow_db::{CycleRecord, MetricPoint, StorageSelection};

use crate::app::AppConfig;
use crate::error::{AppError, Result};
use flight::{Claim, Flight};
use points::{METRIC_FOCUS, METRIC_SEARCH_COUNT, nearest_value, restore_dashboards, stage_points};

pub use points::{
    METRIC_CATEGORY_MINUTES, METRIC_CHAINS, METRIC_GOLDEN_HOURS, METRIC_INTERESTS,
    METRIC_SESSIONS, METRIC_TOP_DOMAINS, METRIC_TOP_SEARCHES, METRIC_TRENDS, METRIC_VISIT_COUNT,
};
pub use read_model::Published;
pub use status::{BackendStatus, CycleCounters, ErrorRecord, PipelineState, PipelineStatus};

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub published: bool,
    pub persisted: bool,
    pub visits_read: u64,
    pub windows: Vec<u32>,
    /// No visits fell inside any window. A valid state, not a failure.
    pub empty_window: bool,
    pub points_written: usize,
    pub retention_deleted: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorRecord>,
}

/// How a cycle request was satisfied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "report", rename_all = "snake_case")]
pub enum RunResult {
    /// This call ran the cycle.
    Ran(CycleReport),
    /// Another caller's cycle was in flight; its report is returned.
    Joined(CycleReport),
    /// A cycle finished within the debounce window; its report is returned.
    Debounced(CycleReport),
    /// A cycle was already running and this call did not wait for it.
    Skipped,
}

impl RunResult {
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Ran(report) | Self::Joined(report) | Self::Debounced(report) => Some(report),
            Self::Skipped => None,
        }
    }
}

/// Owns the pipeline cycle, its single-flight guard and the published read model.
pub struct PipelineCoordinator {
    config: Arc<AppConfig>,
    storage: StorageSelection,
    flight: Flight,
    published: RwLock<Arc<Published>>,
    status: Mutex<status::StatusRecord>,
}

impl PipelineCoordinator {
    pub fn new(config: Arc<AppConfig>, storage: StorageSelection) -> Self {
        Self {
            config,
            storage,
            flight: Flight::default(),
            published: RwLock::new(Arc::new(Published::default())),
            status: Mutex::new(status::StatusRecord::default()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageSelection {
        &self.storage
    }

    /// Current read model. Never observes a half-built cycle.
    pub fn published(&self) -> Arc<Published> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, next: Published) {
        let mut slot = self.published.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Arc::new(next);
    }

    fn status_lock(&self) -> MutexGuard<'_, status::StatusRecord> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: PipelineState) {
        self.status_lock().state = state;
    }

    /// Timer entry point: runs one cycle now, or returns `Skipped` if one is running.
    pub fn run_cycle(&self) -> RunResult {
        self.run_cycle_at(Utc::now())
    }

    /// Runs one cycle as of `now`.
    pub fn run_cycle_at(&self, now: DateTime<Utc>) -> RunResult {
        let ticket = match self.flight.try_claim() {
            Claim::Acquired(ticket) => ticket,
            Claim::Busy => {
                self.status_lock().counters.skipped += 1;
                tracing::debug!("cycle already running, skipping");
                return RunResult::Skipped;
            }
        };
        let report = self.execute(now);
        ticket.finish(&report);
        RunResult::Ran(report)
    }

    /// On-demand refresh: joins a running cycle, reuses a very recent one, or runs a new one.
    pub fn force_refresh(&self) -> RunResult {
        self.force_refresh_at(Utc::now())
    }

    pub fn force_refresh_at(&self, now: DateTime<Utc>) -> RunResult {
        if let Some(report) = self.flight.join() {
            return RunResult::Joined(report);
        }
        let debounce = std::time::Duration::from_secs(self.config.pipeline.refresh_debounce_secs);
        if let Some(report) = self.flight.recent_report(debounce) {
            tracing::debug!("refresh debounced");
            return RunResult::Debounced(report);
        }
        match self.run_cycle_at(now) {
            RunResult::Skipped => match self.flight.join() {
                Some(report) => RunResult::Joined(report),
                None => RunResult::Skipped,
            },
            other => other,
        }
    }

    fn execute(&self, now: DateTime<Utc>) -> CycleReport {
        let started = Instant::now();
        let windows = self.config.pipeline.windows();
        let mut report = CycleReport {
            started_at: now,
            finished_at: now,
            published: false,
            persisted: false,
            visits_read: 0,
            windows: windows.clone(),
            empty_window: false,
            points_written: 0,
            retention_deleted: 0,
            error: None,
        };
        {
            let mut status = self.status_lock();
            status.last_cycle_at = Some(now);
            status.state = PipelineState::Ingesting;
        }

        let Ingested {
            visits,
            source_path,
            history_from,
        } = match self.ingest(now) {
            Ok(ingested) => ingested,
            Err(err) => {
                tracing::warn!(%err, "ingest failed, keeping last published results");
                let record = ErrorRecord::new(&err, now);
                {
                    let mut status = self.status_lock();
                    status.last_error = Some(record.clone());
                    status.counters.failed += 1;
                    status.state = PipelineState::Idle;
                }
                report.error = Some(record);
                report.finished_at = finished_at(now, started);
                return report;
            }
        };
        report.visits_read = visits.len() as u64;

        self.set_state(PipelineState::Aggregating);
        let mut computed: Vec<(Dashboard, Aggregates)> = Vec::with_capacity(windows.len());
        for days in &windows {
            let window = Window::ending_at(now, *days);
            let (_, aggregates) = analyze_window(&visits, &window, &self.config.pipeline.analytics);
            let trends = self.trends_for(&window, &aggregates, &visits, history_from);
            let dashboard = read_model::build_dashboard(&window, &aggregates, trends, now);
            computed.push((dashboard, aggregates));
        }
        report.empty_window = computed.iter().all(|(_, aggregates)| aggregates.is_empty());

        self.set_state(PipelineState::Persisting);
        let persist = self.persist(now, &source_path, &visits, &computed);
        let storage_ok = persist.is_ok();
        match persist {
            Ok(written) => {
                report.persisted = true;
                report.points_written = written;
            }
            Err(err) => {
                tracing::warn!(%err, backend = self.storage.adapter.backend_name(), "persisting cycle failed, publishing non-durable results");
                report.error = Some(ErrorRecord::new(&err, now));
            }
        }

        let degraded = !storage_ok || self.storage.fallback;
        let dashboards: BTreeMap<u32, Dashboard> = computed
            .into_iter()
            .map(|(mut dashboard, _)| {
                dashboard.degraded = degraded;
                (dashboard.window_days, dashboard)
            })
            .collect();
        self.publish(Published {
            generated_at: Some(now),
            dashboards,
            visits: Arc::new(visits),
            degraded,
            restored: false,
        });
        report.published = true;

        {
            let mut status = self.status_lock();
            status.last_success_at = Some(now);
            status.last_visits_read = report.visits_read;
            status.storage_degraded = !storage_ok;
            status.counters.completed += 1;
            if !storage_ok {
                status.counters.degraded += 1;
                status.last_error = report.error.clone();
            }
            status.state = PipelineState::Idle;
        }

        if storage_ok {
            report.retention_deleted = self.run_retention(now);
        }
        report.finished_at = finished_at(now, started);
        tracing::info!(
            visits = report.visits_read,
            windows = ?report.windows,
            persisted = report.persisted,
            empty_window = report.empty_window,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cycle complete"
        );
        report
    }

    fn ingest(&self, now: DateTime<Utc>) -> Result<Ingested> {
        let since = now - Duration::days(i64::from(self.config.pipeline.lookback_days()));
        let path = ingest::locate_history(self.config.history_path.as_deref())?;
        let mut stream = ingest::read_history(&path, since)?;
        let history_from = stream.oldest_visit()?;
        let mut visits = Vec::new();
        for visit in stream.by_ref() {
            let visit = visit?;
            if visit.timestamp <= now {
                visits.push(CategorizedVisit::from_visit(visit));
            }
        }
        let stats = stream.stats();
        tracing::debug!(
            source = %stats.source_path,
            visits = stats.visits_read,
            snapshot_bytes = stats.snapshot_bytes,
            "history ingested"
        );
        Ok(Ingested {
            visits,
            source_path: stats.source_path,
            history_from,
        })
    }

    /// Deltas against the previous window of equal length.
    ///
    /// The previous window is recomputed from the ingested visits whenever the
    /// history reaches back to its start. A browser that pruned older visits
    /// leaves it incomplete; then the focus and search count stored by a cycle
    /// that ran at the previous window's end stand in for it.
    fn trends_for(
        &self,
        window: &Window,
        current: &Aggregates,
        visits: &[CategorizedVisit],
        history_from: Option<DateTime<Utc>>,
    ) -> TrendMetrics {
        let previous = window.previous();
        let covered = history_from.is_some_and(|oldest| oldest <= previous.start);
        let stored = if covered {
            None
        } else {
            self.stored_previous(window)
        };
        let (previous_focus, previous_searches) = match stored {
            Some(stored) => stored,
            None => {
                let (_, aggregates) =
                    analyze_window(visits, &previous, &self.config.pipeline.analytics);
                (aggregates.focus, aggregates.search_total)
            }
        };
        trend(
            &current.focus,
            &previous_focus,
            current.search_total,
            previous_searches,
        )
    }

    /// Focus and search count of the cycle closest to `window.start`, if one
    /// ran within one scheduling interval of it.
    fn stored_previous(&self, window: &Window) -> Option<(FocusMetrics, u64)> {
        let anchor = window.start;
        let tolerance = Duration::seconds(self.config.pipeline.interval().as_secs() as i64);
        let range = TimeRange {
            start: (anchor - tolerance).to_rfc3339(),
            end: (anchor + tolerance + Duration::seconds(1)).to_rfc3339(),
        };
        let adapter = &self.storage.adapter;
        let focus = adapter.query(METRIC_FOCUS, window.days, &range);
        let searches = adapter.query(METRIC_SEARCH_COUNT, window.days, &range);
        match (focus, searches) {
            (Ok(focus), Ok(searches)) => Some((
                nearest_value(&focus, anchor)?,
                nearest_value(&searches, anchor)?,
            )),
            (Err(err), _) | (_, Err(err)) => {
                tracing::debug!(%err, "previous window not readable from storage, recomputing");
                None
            }
        }
    }

    fn persist(
        &self,
        now: DateTime<Utc>,
        source_path: &str,
        visits: &[CategorizedVisit],
        computed: &[(Dashboard, Aggregates)],
    ) -> Result<usize> {
        let mut staged: Vec<MetricPoint> = Vec::new();
        for (dashboard, aggregates) in computed {
            staged.extend(stage_points(now, dashboard, aggregates)?);
        }
        let cycle = CycleRecord {
            ts: now,
            source_path: source_path.to_string(),
            visits_read: visits.len() as u64,
            windows: computed.iter().map(|(dashboard, _)| dashboard.window_days).collect(),
        };
        Ok(self.storage.adapter.write(&cycle, &staged)?)
    }

    fn run_retention(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::days(i64::from(self.config.pipeline.retention_days()));
        match self.storage.adapter.delete_before(cutoff) {
            Ok(deleted) => {
                if deleted > 0 {
                    tracing::debug!(deleted, %cutoff, "retention removed old points");
                }
                deleted
            }
            Err(err) => {
                tracing::warn!(%err, "retention cleanup failed");
                0
            }
        }
    }

    /// Loads the latest persisted cycle into the read model. Returns whether anything was restored.
    pub fn restore(&self) -> Result<bool> {
        if self.published().generated_at.is_some() {
            return Ok(false);
        }
        let Some((cycle, points)) = self.storage.adapter.latest()? else {
            return Ok(false);
        };
        let dashboards = restore_dashboards(cycle.ts, points);
        if dashboards.is_empty() {
            return Ok(false);
        }
        tracing::info!(cycle = %cycle.ts, windows = dashboards.len(), "restored published results");
        {
            let mut status = self.status_lock();
            status.last_success_at = Some(cycle.ts);
            status.last_visits_read = cycle.visits_read;
        }
        self.publish(Published {
            generated_at: Some(cycle.ts),
            dashboards,
            visits: Arc::new(Vec::new()),
            degraded: false,
            restored: true,
        });
        Ok(true)
    }

    /// Dashboard for `days`, from the published cycle or computed from its visits.
    ///
    /// `days` may not exceed the largest configured window: a cycle only reads
    /// enough history for that window and the one before it.
    pub fn dashboard(&self, days: i64) -> Result<Dashboard> {
        let max_days = i64::from(self.config.pipeline.max_window_days());
        if days <= 0 {
            return Err(AppError::InvalidInput(format!(
                "days must be positive, got {}",
                days
            )));
        }
        if days > max_days {
            return Err(AppError::InvalidInput(format!(
                "days must be at most {}, got {}",
                max_days, days
            )));
        }
        let days = days as u32;
        let published = self.published();
        Ok(read_model::dashboard_for(
            &published,
            days,
            &self.config.pipeline.analytics,
        ))
    }

    pub fn status(&self) -> PipelineStatus {
        let record = self.status_lock().clone();
        let adapter = &self.storage.adapter;
        let health = adapter.health_check();
        let backend = BackendStatus {
            name: adapter.backend_name(),
            durable: adapter.is_durable(),
            healthy: health.is_ok(),
            fallback: self.storage.fallback,
            detail: health
                .err()
                .map(|err| err.to_string())
                .or_else(|| self.storage.fallback_reason.clone()),
        };
        PipelineStatus {
            state: record.state,
            running: self.flight.is_running(),
            last_cycle_at: record.last_cycle_at,
            last_success_at: record.last_success_at,
            last_error: record.last_error,
            degraded: record.storage_degraded || self.storage.fallback || !backend.healthy,
            backend,
            last_visits_read: record.last_visits_read,
            counters: record.counters,
        }
    }
}

struct Ingested {
    visits: Vec<CategorizedVisit>,
    source_path: String,
    /// Oldest visit in the history file, including ones before the lookback.
    history_from: Option<DateTime<Utc>>,
}

fn finished_at(now: DateTime<Utc>, started: Instant) -> DateTime<Utc> {
    now + Duration::from_std(started.elapsed()).unwrap_or_else(|_| Duration::zero())
}
