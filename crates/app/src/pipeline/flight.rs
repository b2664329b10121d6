use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use super::CycleReport;

#[derive(Debug, Default)]
struct FlightState {
    running: bool,
    generation: u64,
    last_finished: Option<Instant>,
    last_report: Option<CycleReport>,
}

/// Single-flight record: at most one cycle runs, others wait on or skip it.
#[derive(Debug, Default)]
pub(crate) struct Flight {
    state: Mutex<FlightState>,
    done: Condvar,
}

pub(crate) enum Claim<'a> {
    /// The caller owns the next cycle and must finish it through the ticket.
    Acquired(Ticket<'a>),
    Busy,
}

impl Flight {
    fn lock(&self) -> MutexGuard<'_, FlightState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.lock().running
    }

    pub(crate) fn try_claim(&self) -> Claim<'_> {
        let mut state = self.lock();
        if state.running {
            return Claim::Busy;
        }
        state.running = true;
        Claim::Acquired(Ticket {
            flight: self,
            finished: false,
        })
    }

    /// Blocks until the in-flight cycle ends and returns its report.
    ///
    /// Returns `None` when nothing was running.
    pub(crate) fn join(&self) -> Option<CycleReport> {
        let mut state = self.lock();
        if !state.running {
            return None;
        }
        let generation = state.generation;
        while state.running && state.generation == generation {
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.last_report.clone()
    }

    /// The last report if a cycle finished less than `window` ago.
    pub(crate) fn recent_report(&self, window: Duration) -> Option<CycleReport> {
        let state = self.lock();
        let finished = state.last_finished?;
        if finished.elapsed() < window {
            state.last_report.clone()
        } else {
            None
        }
    }
}

/// Proof of ownership of the running cycle; releases the flight on drop.
pub(crate) struct Ticket<'a> {
    flight: &'a Flight,
    finished: bool,
}

impl Ticket<'_> {
    pub(crate) fn finish(mut self, report: &CycleReport) {
        self.release(Some(report.clone()));
        self.finished = true;
    }

    fn release(&self, report: Option<CycleReport>) {
        let mut state = self.flight.lock();
        state.running = false;
        state.generation += 1;
        state.last_finished = Some(Instant::now());
        if report.is_some() {
            state.last_report = report;
        }
        self.flight.done.notify_all();
    }
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        // A cycle that panicked still frees the flight for the next one.
        if !self.finished {
            self.release(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_busy_until_released() {
        let flight = Flight::default();
        let Claim::Acquired(ticket) = flight.try_claim() else {
            panic!("first claim should succeed");
        };
        assert!(matches!(flight.try_claim(), Claim::Busy));
        assert!(flight.is_running());
        drop(ticket);
        assert!(!flight.is_running());
        assert!(matches!(flight.try_claim(), Claim::Acquired(_)));
    }

    #[test]
    fn join_without_flight_returns_none() {
        let flight = Flight::default();
        assert!(flight.join().is_none());
        assert!(flight.recent_report(Duration::from_secs(60)).is_none());
    }
}
