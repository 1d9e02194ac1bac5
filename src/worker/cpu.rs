//! CPU-based worker for vanity key search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::debug;

use crate::crypto::{encode_prefix, KeyGenerator, KeyPair, KeygenError, OsSeedSource, SeedSource};
use crate::matcher::MatchRule;

use super::stats::SearchStats;
use super::{Hit, SearchEvent};

/// Worker states. `Reporting` lasts for exactly one hand-off.
enum State {
    Searching,
    Reporting(KeyPair),
}

/// A CPU worker that generates and tests keypairs.
pub struct CpuWorker<S = OsSeedSource> {
    /// Worker ID
    id: usize,
    /// The rule to match against
    rule: Arc<MatchRule>,
    /// Cached truncation hint from the rule
    prefix_len: Option<usize>,
    /// Source of fresh keypairs
    keygen: KeyGenerator<S>,
    /// Channel to send hits
    event_tx: Sender<SearchEvent>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
    /// Shared statistics
    stats: Arc<SearchStats>,
}

impl<S: SeedSource> CpuWorker<S> {
    /// Creates a new CPU worker.
    pub fn new(
        id: usize,
        rule: Arc<MatchRule>,
        keygen: KeyGenerator<S>,
        event_tx: Sender<SearchEvent>,
        stop_flag: Arc<AtomicBool>,
        stats: Arc<SearchStats>,
    ) -> Self {
        let prefix_len = rule.required_prefix_len();
        Self {
            id,
            rule,
            prefix_len,
            keygen,
            event_tx,
            stop_flag,
            stats,
        }
    }

    /// Runs the worker loop until the stop flag is set.
    ///
    /// Returns an error only if the key generator fails, which ends the
    /// worker.
    pub fn run(&mut self) -> Result<(), KeygenError> {
        let stop_flag = self.stop_flag.clone();
        self.drive(|| !stop_flag.load(Ordering::Relaxed))
    }

    /// Runs exactly `attempts` attempts, or fewer if the stop flag is set.
    pub fn run_attempts(&mut self, attempts: u64) -> Result<(), KeygenError> {
        let stop_flag = self.stop_flag.clone();
        let mut remaining = attempts;
        self.drive(move || {
            if remaining == 0 || stop_flag.load(Ordering::Relaxed) {
                return false;
            }
            remaining -= 1;
            true
        })
    }

    /// Steps the state machine. `proceed` is asked before every attempt.
    fn drive(&mut self, mut proceed: impl FnMut() -> bool) -> Result<(), KeygenError> {
        let mut state = State::Searching;

        loop {
            state = match state {
                State::Searching => {
                    if !proceed() {
                        return Ok(());
                    }
                    match self.attempt()? {
                        Some(keypair) => State::Reporting(keypair),
                        None => State::Searching,
                    }
                }
                State::Reporting(keypair) => {
                    self.report(keypair);
                    State::Searching
                }
            };
        }
    }

    /// Generates one keypair and tests it. Counts the attempt either way.
    #[inline]
    fn attempt(&mut self) -> Result<Option<KeyPair>, KeygenError> {
        let keypair = self.keygen.generate()?;

        let matched = match self.prefix_len {
            Some(len) => self.rule.matches(&encode_prefix(keypair.public_key(), len)),
            None => self.rule.matches(keypair.address().as_str()),
        };

        self.stats.record_try();
        Ok(matched.then_some(keypair))
    }

    /// Hands a matching keypair to the reporter.
    fn report(&self, keypair: KeyPair) {
        // Always re-encode in full, the match may have seen a truncated prefix
        let address = keypair.address();
        let ordinal = self.stats.record_hit();
        debug!(worker = self.id, ordinal, %address, "match found");

        // Try to send result (ignore if channel closed)
        let _ = self.event_tx.send(SearchEvent::Hit(Hit {
            address,
            keypair,
            ordinal,
            worker_id: self.id,
        }));
    }

    /// Returns the worker ID.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the worker's key generator.
    pub fn keygen(&self) -> &KeyGenerator<S> {
        &self.keygen
    }
}
