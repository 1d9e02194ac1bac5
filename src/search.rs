//! The owner side of a search: consumes pool events until the search ends.

use std::io::{self, Write};
use std::time::Duration;

use crate::crypto::KeygenError;
use crate::report::Reporter;
use crate::worker::{SearchEvent, WorkerPool};

/// Errors that end a search early.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to write hit record: {0}")]
    Output(#[from] io::Error),

    #[error("worker {worker_id} failed: {source}")]
    WorkerFailed {
        worker_id: usize,
        #[source]
        source: KeygenError,
    },
}

/// Why a search ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `target` hits were reported
    TargetReached,
    /// The stop flag was set from outside, e.g. by Ctrl-C
    Interrupted,
}

/// Totals for a finished search.
#[derive(Debug, Clone, Copy)]
pub struct SearchSummary {
    pub reason: StopReason,
    /// Every counted try, including those no tick had drained yet
    pub total_tries: u64,
    /// Hits found by workers, reported or not
    pub total_hits: u64,
    /// Hit records written
    pub hits_reported: u64,
    pub elapsed: Duration,
}

impl SearchSummary {
    /// Average tries per second over the whole search.
    pub fn average_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total_tries as f64 / secs
        } else {
            0.0
        }
    }
}

/// Feeds pool events to `reporter` until `target` hits are reported (0 means
/// no target), the pool's stop flag is set, or a worker fails.
///
/// The pool is then joined and whatever it still had queued is reported too,
/// so a hit that received an ordinal is never silently dropped. With a target,
/// hits beyond it are counted in `total_hits` but not written.
pub fn run_search<W: Write>(
    pool: &mut WorkerPool,
    reporter: &mut Reporter<W>,
    target: u64,
    poll_interval: Duration,
) -> Result<SearchSummary, SearchError> {
    let mut failure = None;

    loop {
        if let Some(event) = pool.wait_for_event(poll_interval) {
            dispatch(event, pool, reporter, target, &mut failure)?;
        }
        if failure.is_some() || target_reached(reporter, target) || pool.is_stopped() {
            break;
        }
    }

    let reason = if target_reached(reporter, target) {
        StopReason::TargetReached
    } else {
        StopReason::Interrupted
    };

    for event in pool.drain() {
        dispatch(event, pool, reporter, target, &mut failure)?;
    }

    if let Some(error) = failure {
        return Err(error);
    }

    Ok(SearchSummary {
        reason,
        total_tries: reporter.total_tries() + pool.stats().pending_tries(),
        total_hits: pool.stats().total_hits(),
        hits_reported: reporter.hits_reported(),
        elapsed: pool.elapsed(),
    })
}

fn target_reached<W: Write>(reporter: &Reporter<W>, target: u64) -> bool {
    target > 0 && reporter.hits_reported() >= target
}

fn dispatch<W: Write>(
    event: SearchEvent,
    pool: &WorkerPool,
    reporter: &mut Reporter<W>,
    target: u64,
    failure: &mut Option<SearchError>,
) -> io::Result<()> {
    match event {
        SearchEvent::Hit(hit) => {
            if !target_reached(reporter, target) {
                reporter.report_hit(&hit, pool.elapsed())?;
            }
        }
        SearchEvent::Progress(tick) => reporter.report_progress(&tick),
        SearchEvent::Failed { worker_id, error } => {
            // Only the first failure is kept; the rest are the same shutdown
            if failure.is_none() {
                *failure = Some(SearchError::WorkerFailed {
                    worker_id,
                    source: error,
                });
            }
        }
    }
    Ok(())
}
