//! Worker pool management.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};
use tracing::{debug, error};

use crate::crypto::{
    EncodedAddress, KeyGenerator, KeyPair, KeygenError, OsSeedSource, SeedSource,
};
use crate::matcher::MatchRule;

use super::cpu::CpuWorker;
use super::stats::{SearchStats, ThroughputMeter, ThroughputTick};

/// A keypair whose address satisfied the match rule.
#[derive(Debug, Clone)]
pub struct Hit {
    /// The full encoded address
    pub address: EncodedAddress,
    /// The matching keypair
    pub keypair: KeyPair,
    /// 1-based position of this hit among all hits
    pub ordinal: u64,
    /// The ID of the worker that found this hit
    pub worker_id: usize,
}

/// Everything the pool reports to its owner.
#[derive(Debug)]
pub enum SearchEvent {
    /// A worker found a match
    Hit(Hit),
    /// The ticker drained the try counter
    Progress(ThroughputTick),
    /// A worker's key generator failed; the pool is stopping
    Failed { worker_id: usize, error: KeygenError },
}

/// Manages a pool of workers plus the throughput ticker.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// The rule to search for
    rule: Arc<MatchRule>,
    /// Thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Channel receiver for events
    event_rx: Receiver<SearchEvent>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Wakes the ticker so it does not sit out a full interval on stop
    shutdown_tx: Sender<()>,
    /// Shared statistics
    stats: Arc<SearchStats>,
}

impl WorkerPool {
    /// Starts `num_workers` workers and a ticker that publishes throughput
    /// every `report_interval`.
    pub fn new(num_workers: usize, rule: MatchRule, report_interval: Duration) -> io::Result<Self> {
        Self::with_source(num_workers, rule, report_interval, |_| OsSeedSource)
    }

    /// Like [`WorkerPool::new`], but each worker draws seeds from the source
    /// `make_source` builds for its ID.
    pub fn with_source<S, F>(
        num_workers: usize,
        rule: MatchRule,
        report_interval: Duration,
        make_source: F,
    ) -> io::Result<Self>
    where
        S: SeedSource + 'static,
        F: Fn(usize) -> S,
    {
        let (event_tx, event_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = bounded(1);

        let mut pool = Self {
            num_workers,
            rule: Arc::new(rule),
            handles: Some(Vec::with_capacity(num_workers + 1)),
            event_rx,
            stop_flag: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            stats: Arc::new(SearchStats::new()),
        };

        // On error the pool is dropped, which stops and joins whatever started
        pool.spawn_workers(&event_tx, make_source)?;
        let ticker = Self::spawn_ticker(
            report_interval,
            event_tx,
            shutdown_rx,
            pool.stop_flag.clone(),
            pool.stats.clone(),
        )?;
        if let Some(handles) = pool.handles.as_mut() {
            handles.push(ticker);
        }

        debug!(workers = num_workers, ?report_interval, "worker pool started");
        Ok(pool)
    }

    /// Spawns worker threads.
    fn spawn_workers<S, F>(
        &mut self,
        event_tx: &Sender<SearchEvent>,
        make_source: F,
    ) -> io::Result<()>
    where
        S: SeedSource + 'static,
        F: Fn(usize) -> S,
    {
        for id in 0..self.num_workers {
            let keygen = KeyGenerator::new(make_source(id));
            let rule = self.rule.clone();
            let event_tx = event_tx.clone();
            let stop_flag = self.stop_flag.clone();
            let stats = self.stats.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    let mut worker = CpuWorker::new(
                        id,
                        rule,
                        keygen,
                        event_tx.clone(),
                        stop_flag.clone(),
                        stats,
                    );
                    if let Err(error) = worker.run() {
                        error!(worker = id, %error, "key generation failed, stopping search");
                        stop_flag.store(true, Ordering::Relaxed);
                        let _ = event_tx.send(SearchEvent::Failed {
                            worker_id: id,
                            error,
                        });
                    }
                })?;

            if let Some(handles) = self.handles.as_mut() {
                handles.push(handle);
            }
        }
        Ok(())
    }

    /// Spawns the ticker thread that drains the try counter.
    fn spawn_ticker(
        interval: Duration,
        event_tx: Sender<SearchEvent>,
        shutdown_rx: Receiver<()>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<SearchStats>,
    ) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("vanity-ticker".into())
            .spawn(move || {
                let ticker = tick(interval);
                let mut meter = ThroughputMeter::new();

                loop {
                    select! {
                        recv(ticker) -> _ => {
                            if stop_flag.load(Ordering::Relaxed) {
                                break;
                            }
                            let progress = SearchEvent::Progress(meter.tick(&stats));
                            if event_tx.send(progress).is_err() {
                                break;
                            }
                        }
                        recv(shutdown_rx) -> _ => break,
                    }
                }
            })
    }

    /// Waits for an event with timeout.
    ///
    /// Returns `None` if the timeout expires first.
    pub fn wait_for_event(&self, timeout: Duration) -> Option<SearchEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Attempts to receive an event without blocking.
    pub fn try_recv(&self) -> Option<SearchEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Signals all threads to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        // Full means a wake-up is already pending
        let _ = self.shutdown_tx.try_send(());
    }

    /// Stops and waits for all threads to complete.
    pub fn join(mut self) {
        self.stop_and_join();
    }

    /// Stops and joins every thread, then returns the events still queued.
    ///
    /// Once the threads are gone nothing else can be sent, so the returned
    /// events are the complete remainder of the search.
    pub fn drain(&mut self) -> Vec<SearchEvent> {
        self.stop_and_join();
        self.event_rx.try_iter().collect()
    }

    fn stop_and_join(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the rule being searched for.
    pub fn rule(&self) -> &MatchRule {
        &self.rule
    }

    /// Returns the shared statistics.
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Returns the elapsed time since the pool was created.
    pub fn elapsed(&self) -> Duration {
        self.stats.elapsed()
    }

    /// Returns a clone of the stop flag for external use (e.g., signal handlers).
    pub fn stop_flag_clone(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Returns true if the pool has been signaled to stop.
    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
