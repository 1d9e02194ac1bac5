//! Ed25519 Vanity Key Generator CLI
//!
//! Usage:
//!   ed25519_vanity -p tor              # Find keys whose address starts with "TOR"
//!   ed25519_vanity -e '^ab.*xyz$' -n 3 # Find 3 keys matching a pattern
//!   ed25519_vanity -p abc -w 4 --rates # Use 4 workers and report hit rates
//!
//! Hit records (`ADDRESS|BASE64_KEY`) go to stdout, everything else to stderr.

use std::io;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ed25519_vanity::report::format_number;
use ed25519_vanity::{run_search, Config, Reporter, StopReason, WorkerPool};

/// How long the event loop blocks before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Config::parse()) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    config.validate().context("Configuration error")?;
    let rule = config.match_rule().context("Configuration error")?;

    info!("Searching for a public key matching {}", rule);
    info!("Difficulty: {}", rule.difficulty_description());
    info!("Spawning {} workers.", config.worker_count());
    if config.has_target() {
        info!("Target: {} key(s)", config.count);
    }

    let mut pool = WorkerPool::new(config.worker_count(), rule, config.report_interval())
        .context("Failed to start worker pool")?;

    ctrlc_handler(pool.stop_flag_clone())?;

    let mut reporter =
        Reporter::new(io::stdout(), config.rates).with_report_interval(config.report_interval());

    let summary = run_search(&mut pool, &mut reporter, config.count, POLL_INTERVAL)?;

    match summary.reason {
        StopReason::TargetReached => {
            info!("Target reached! Found {} key(s).", summary.hits_reported)
        }
        StopReason::Interrupted => info!("Stopped by user."),
    }

    info!("--- Final Statistics ---");
    info!("Total keys generated: {}", format_number(summary.total_tries));
    info!("Total matches found:  {}", summary.total_hits);
    info!("Time elapsed:         {:.2}s", summary.elapsed.as_secs_f64());
    info!("Average speed:        {}/s", format_number(summary.average_rate() as u64));

    Ok(())
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .context("Error setting Ctrl-C handler")
}
