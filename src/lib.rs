//! # ed25519_vanity
//!
//! High-performance Ed25519 vanity key generator. Searches for keypairs whose
//! public key, in unpadded upper-case base32, starts with a chosen prefix or
//! matches a pattern.
//!
//! ## Architecture
//!
//! - `crypto`: Key generation and address encoding
//! - `matcher`: Prefix and pattern match rules
//! - `worker`: Parallel execution, shared counters and the throughput ticker
//! - `report`: Hit records and log lines
//! - `search`: The event loop that drives a pool to completion
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod report;
pub mod search;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{EncodedAddress, KeyGenerator, KeyPair, KeygenError, SeedSource};
pub use matcher::{MatchRule, MatchRuleError};
pub use report::{HitRates, Reporter};
pub use search::{run_search, SearchError, SearchSummary, StopReason};
pub use worker::{CpuWorker, Hit, SearchEvent, SearchStats, ThroughputTick, WorkerPool};
