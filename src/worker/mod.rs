//! Worker pool for parallel vanity key search.
//!
//! This module provides:
//! - Multi-threaded CPU workers
//! - Lock-free try and hit counters
//! - A ticker thread publishing throughput once per interval

mod cpu;
mod pool;
mod stats;

pub use cpu::CpuWorker;
pub use pool::{Hit, SearchEvent, WorkerPool};
pub use stats::{SearchStats, ThroughputMeter, ThroughputTick};
