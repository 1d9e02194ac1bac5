//! End-to-end search scenarios with deterministic seed streams.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver};

use ed25519_vanity::crypto::{
    encode_prefix, KeyGenerator, KeyPair, OsSeedSource, SeedSequence, ENCODED_LEN,
};
use ed25519_vanity::worker::ThroughputMeter;
use ed25519_vanity::{CpuWorker, Hit, MatchRule, Reporter, SearchEvent, SearchStats, SeedSource};

fn counter_seed(i: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    seed[..8].copy_from_slice(&i.to_le_bytes());
    seed
}

/// Finds the first counter seed whose address starts with `prefix`.
fn find_seed(prefix: &str) -> [u8; 32] {
    (0u64..)
        .map(counter_seed)
        .find(|seed| KeyPair::from_seed(seed).address().as_str().starts_with(prefix))
        .unwrap()
}

/// Seeds whose addresses avoid every prefix in `avoid`.
fn filler_seeds(count: usize, avoid: &[&str]) -> Vec<[u8; 32]> {
    ((1u64 << 40)..)
        .map(counter_seed)
        .filter(|seed| {
            let address = KeyPair::from_seed(seed).address();
            !avoid.iter().any(|p| address.as_str().starts_with(p))
        })
        .take(count)
        .collect()
}

fn single_worker<S: SeedSource>(
    rule: MatchRule,
    source: S,
) -> (CpuWorker<S>, Receiver<SearchEvent>, Arc<SearchStats>) {
    let (tx, rx) = unbounded();
    let stats = Arc::new(SearchStats::new());
    let worker = CpuWorker::new(
        0,
        Arc::new(rule),
        KeyGenerator::new(source),
        tx,
        Arc::new(AtomicBool::new(false)),
        stats.clone(),
    );
    (worker, rx, stats)
}

fn drain_hits(rx: &Receiver<SearchEvent>) -> Vec<Hit> {
    rx.try_iter()
        .filter_map(|event| match event {
            SearchEvent::Hit(hit) => Some(hit),
            _ => None,
        })
        .collect()
}

#[test]
fn literal_prefix_reports_exactly_one_hit() {
    let tor_seed = find_seed("TOR");
    let expected = KeyPair::from_seed(&tor_seed).address();

    let mut seeds = filler_seeds(10, &["TOR"]);
    seeds.insert(5, tor_seed);
    let attempts = seeds.len() as u64;

    let rule = MatchRule::prefix("tor").unwrap();
    let (mut worker, rx, stats) = single_worker(rule, SeedSequence::new(seeds));
    worker.run_attempts(attempts).unwrap();

    let hits = drain_hits(&rx);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].address, expected);
    assert_eq!(hits[0].address.as_str().len(), ENCODED_LEN);
    assert_eq!(hits[0].ordinal, 1);
    assert_eq!(stats.drain_tries(), attempts);

    let mut reporter = Reporter::new(Vec::new(), false);
    reporter.report_hit(&hits[0], Duration::from_secs(1)).unwrap();
    let out = String::from_utf8(reporter.into_inner()).unwrap();
    assert_eq!(
        out,
        format!("{}|{}\n", expected, hits[0].keypair.secret_key_base64())
    );
}

#[test]
fn pattern_is_case_insensitive() {
    let rule = MatchRule::pattern("^AB").unwrap();
    assert!(rule.matches("abcdefgh"));
    assert!(!rule.matches("xyzabcde"));

    let ab_seed = find_seed("AB");
    let xy_seed = find_seed("XY");
    let expected = KeyPair::from_seed(&ab_seed).address();

    let (mut worker, rx, stats) = single_worker(rule, SeedSequence::new([xy_seed, ab_seed]));
    worker.run_attempts(2).unwrap();

    let hits = drain_hits(&rx);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].address, expected);
    assert_eq!(stats.drain_tries(), 2);
}

#[test]
fn no_match_counts_every_try() {
    const ATTEMPTS: u64 = 500;

    // 0, 1, 8 and 9 never appear in a base32 address
    let rule = MatchRule::pattern("[0189]").unwrap();
    let (mut worker, rx, stats) = single_worker(rule, OsSeedSource);
    worker.run_attempts(ATTEMPTS).unwrap();

    assert!(drain_hits(&rx).is_empty());
    assert_eq!(stats.drain_tries(), ATTEMPTS);
    assert_eq!(stats.total_hits(), 0);
}

#[test]
fn concurrent_tries_sum_exactly() {
    const WORKERS: u64 = 4;
    const PER_WORKER: u64 = 750;

    let (tx, rx) = unbounded();
    let stats = Arc::new(SearchStats::new());
    let stop_flag = Arc::new(AtomicBool::new(false));
    let rule = Arc::new(MatchRule::prefix("A").unwrap());

    let handles: Vec<_> = (0..WORKERS as usize)
        .map(|id| {
            let mut worker = CpuWorker::new(
                id,
                rule.clone(),
                KeyGenerator::os(),
                tx.clone(),
                stop_flag.clone(),
                stats.clone(),
            );
            thread::spawn(move || worker.run_attempts(PER_WORKER))
        })
        .collect();
    drop(tx);

    let mut meter = ThroughputMeter::new();
    let mut ticks = Vec::new();
    while handles.iter().any(|h| !h.is_finished()) {
        ticks.push(meter.tick(&stats));
        thread::sleep(Duration::from_millis(1));
    }
    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    ticks.push(meter.tick(&stats));

    let summed: u64 = ticks.iter().map(|t| t.tries).sum();
    assert_eq!(summed, WORKERS * PER_WORKER);
    assert_eq!(meter.total(), WORKERS * PER_WORKER);

    // Every hit got a distinct ordinal
    let mut ordinals: Vec<u64> = drain_hits(&rx).iter().map(|h| h.ordinal).collect();
    ordinals.sort_unstable();
    assert_eq!(ordinals, (1..=stats.total_hits()).collect::<Vec<_>>());
}

#[test]
fn reencoding_is_idempotent() {
    let keypair = KeyPair::from_seed(&find_seed("TO"));
    let first = keypair.address();
    let second = keypair.address();
    assert_eq!(first, second);
    assert_eq!(encode_prefix(keypair.public_key(), 2), "TO");
    assert_eq!(&first.as_str()[..2], "TO");
}
