//! Hit records, progress lines and hit-rate statistics.

use std::io::{self, Write};
use std::time::Duration;

use tracing::info;

use crate::crypto::onion_hostname;
use crate::worker::{Hit, ThroughputTick};

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const WEEK: f64 = 7.0 * DAY;

/// Hits per unit of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HitRates {
    pub per_minute: f64,
    pub per_hour: f64,
    pub per_day: f64,
    pub per_week: f64,
}

impl HitRates {
    /// Derives rates from a hit count and the time it took.
    pub fn from_counts(hits: u64, elapsed: Duration) -> Self {
        let secs = elapsed.as_secs_f64();
        if secs <= 0.0 {
            return Self::default();
        }
        let per_sec = hits as f64 / secs;
        Self {
            per_minute: per_sec * MINUTE,
            per_hour: per_sec * HOUR,
            per_day: per_sec * DAY,
            per_week: per_sec * WEEK,
        }
    }
}

/// Formats the machine-readable record for a hit:
/// `<ENCODED_ADDRESS>|<BASE64_PRIVATE_KEY>`.
pub fn hit_record(hit: &Hit) -> String {
    format!("{}|{}", hit.address, hit.keypair.secret_key_base64())
}

/// Writes hit records to `out` and logs progress and success lines.
pub struct Reporter<W> {
    out: W,
    show_rates: bool,
    report_interval: Duration,
    total_tries: u64,
    hits_reported: u64,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, show_rates: bool) -> Self {
        Self {
            out,
            show_rates,
            report_interval: Duration::from_secs(1),
            total_tries: 0,
            hits_reported: 0,
        }
    }

    /// Sets how much wall-clock time each progress tick covers.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Emits one hit: the record line on `out`, the success line on the log.
    ///
    /// `elapsed` is the time since the search started, used for rates.
    pub fn report_hit(&mut self, hit: &Hit, elapsed: Duration) -> io::Result<()> {
        writeln!(self.out, "{}", hit_record(hit))?;
        self.out.flush()?;
        self.hits_reported += 1;

        let key = hit.keypair.secret_key_base64();
        let onion = onion_hostname(hit.keypair.public_key());

        if self.show_rates {
            let rates = HitRates::from_counts(hit.ordinal, elapsed);
            info!(
                address = %hit.address,
                onion = %onion,
                "FOUND! key: {} | found {} keys so far | {:.2}/min {:.2}/hour {:.2}/day {:.2}/week",
                key,
                hit.ordinal,
                rates.per_minute,
                rates.per_hour,
                rates.per_day,
                rates.per_week,
            );
        } else {
            info!(
                address = %hit.address,
                onion = %onion,
                "FOUND! key: {} | found {} keys so far",
                key,
                hit.ordinal,
            );
        }
        Ok(())
    }

    /// Logs one throughput tick.
    pub fn report_progress(&mut self, tick: &ThroughputTick) {
        self.total_tries = tick.total;
        info!(
            "Generating {} keys per second. Generated {} keys in total.",
            format_number(self.keys_per_second(tick)),
            format_number(tick.total)
        );
    }

    /// Converts the tries of one tick into a per-second rate.
    pub fn keys_per_second(&self, tick: &ThroughputTick) -> u64 {
        let secs = self.report_interval.as_secs_f64();
        if secs <= 0.0 {
            return tick.tries;
        }
        (tick.tries as f64 / secs).round() as u64
    }

    /// Returns the cumulative tries as of the last tick.
    pub fn total_tries(&self) -> u64 {
        self.total_tries
    }

    /// Returns how many hit records have been written.
    pub fn hits_reported(&self) -> u64 {
        self.hits_reported
    }

    /// Consumes the reporter, returning the record sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Formats a count with a K/M/B suffix.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}
