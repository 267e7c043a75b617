//! Seed Recovery
//!
//! Brute force over the 32-bit seed space. Every trial owns its own
//! generator, so the range splits into disjoint shards with nothing shared
//! between workers except a stop signal and a counter.
//!
//! ```text
//! [0 ─────────────────────────────────────────────── 2^32)
//!  │ worker 0 │ worker 1 │ worker 2 │ ... │ worker N-1 │
//!        │          │ match
//!        │          └──► ceiling = min(ceiling, seed)
//!        └──► keeps going until it passes the ceiling
//! ```
//!
//! `par_search` returns the lowest match in the range regardless of worker
//! scheduling. `par_search_all` enumerates every match.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::fingerprint::Fingerprint;
use crate::generator::Seed;
use crate::{Error, Result};

/// Workers look at the stop signals once per this many seeds
const CHECK_INTERVAL: u64 = 1 << 12;

const NO_CEILING: u64 = u64::MAX;

/// Half-open seed interval `[start, end)` inside `[0, 2^32]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRange {
    start: u64,
    end: u64,
}

impl SeedRange {
    pub const SPACE_END: u64 = 1 << 32;

    pub fn new(start: u64, end: u64) -> Result<Self> {
        if start > end || end > Self::SPACE_END {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The whole seed space
    pub fn full() -> Self {
        Self {
            start: 0,
            end: Self::SPACE_END,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Remainder of the range strictly after `seed`, for resuming a search
    pub fn after(&self, seed: Seed) -> Self {
        let start = (seed.value() as u64 + 1).clamp(self.start, self.end);
        Self {
            start,
            end: self.end,
        }
    }

    /// Split into at most `n` contiguous, disjoint, ascending shards that
    /// cover the range exactly
    pub fn shard(&self, n: usize) -> Vec<SeedRange> {
        let n = (n.max(1) as u64).min(self.len().max(1));
        let base = self.len() / n;
        let extra = self.len() % n;

        let mut shards = Vec::with_capacity(n as usize);
        let mut start = self.start;
        for i in 0..n {
            let size = base + u64::from(i < extra);
            shards.push(SeedRange {
                start,
                end: start + size,
            });
            start += size;
        }
        shards
    }
}

/// Shared stop flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Result of an exhaustive search
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Matching seeds, ascending
    pub matches: Vec<Seed>,
    pub candidates_tried: u64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl SearchReport {
    /// Seeds per second
    pub fn speed(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.candidates_tried as f64 / secs
        } else {
            0.0
        }
    }
}

/// Per-search state shared by all workers
struct ScanControl<'a> {
    cancel: &'a CancelToken,
    ceiling: AtomicU64,
    tried: AtomicU64,
}

impl<'a> ScanControl<'a> {
    fn new(cancel: &'a CancelToken) -> Self {
        Self {
            cancel,
            ceiling: AtomicU64::new(NO_CEILING),
            tried: AtomicU64::new(0),
        }
    }

    fn should_stop(&self, seed: u64) -> bool {
        self.cancel.is_cancelled() || self.ceiling.load(Ordering::Relaxed) <= seed
    }
}

pub struct SeedRecoverer {
    fingerprint: Fingerprint,
    cancel: CancelToken,
}

impl SeedRecoverer {
    pub fn new(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            cancel: CancelToken::new(),
        }
    }

    /// Share an external stop flag with this recoverer
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Walk `range` in order. `on_hit` returns false to stop this walk.
    fn scan<F>(&self, range: SeedRange, ctl: &ScanControl<'_>, mut on_hit: F)
    where
        F: FnMut(Seed) -> bool,
    {
        let mut tried = 0u64;
        let mut seed = range.start;

        while seed < range.end {
            if (seed - range.start) % CHECK_INTERVAL == 0 && ctl.should_stop(seed) {
                break;
            }
            tried += 1;
            if self.fingerprint.matches(seed as u32) && !on_hit(Seed(seed as u32)) {
                break;
            }
            seed += 1;
        }

        ctl.tried.fetch_add(tried, Ordering::Relaxed);
    }

    /// Lowest matching seed in `range`, on the calling thread
    pub fn search(&self, range: SeedRange) -> Option<Seed> {
        let ctl = ScanControl::new(&self.cancel);
        let mut found = None;
        self.scan(range, &ctl, |seed| {
            found = Some(seed);
            false
        });
        found
    }

    /// Every matching seed in `range`, on the calling thread
    pub fn search_all(&self, range: SeedRange) -> Vec<Seed> {
        let ctl = ScanControl::new(&self.cancel);
        let mut found = Vec::new();
        self.scan(range, &ctl, |seed| {
            found.push(seed);
            true
        });
        found
    }

    /// Lowest matching seed in `range`, searched by `workers` threads.
    ///
    /// A worker that finds a match lowers the shared ceiling; every worker
    /// stops once its next seed is above it. Shards below the ceiling run to
    /// completion, so the answer does not depend on scheduling.
    pub fn par_search(&self, range: SeedRange, workers: usize) -> Option<Seed> {
        let shards = range.shard(workers);
        let ctl = ScanControl::new(&self.cancel);
        let started = Instant::now();

        tracing::info!(
            workers = shards.len(),
            start = range.start,
            end = range.end,
            "seed search started (lowest match)"
        );

        thread::scope(|s| {
            for shard in &shards {
                let ctl = &ctl;
                s.spawn(move || {
                    self.scan(*shard, ctl, |seed| {
                        ctl.ceiling.fetch_min(seed.value() as u64, Ordering::Relaxed);
                        false
                    });
                });
            }
        });

        let best = ctl.ceiling.load(Ordering::Relaxed);
        let found = (best != NO_CEILING).then(|| Seed(best as u32));

        tracing::info!(
            found = ?found.map(|s| s.to_string()),
            tried = ctl.tried.load(Ordering::Relaxed),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "seed search finished"
        );

        found
    }

    /// Every matching seed in `range`, searched by `workers` threads.
    ///
    /// `on_match` runs on the calling thread as matches arrive, in no
    /// particular order. The report lists them sorted.
    pub fn par_search_all<F>(&self, range: SeedRange, workers: usize, mut on_match: F) -> SearchReport
    where
        F: FnMut(Seed),
    {
        let shards = range.shard(workers);
        let ctl = ScanControl::new(&self.cancel);
        let started = Instant::now();
        let mut matches = Vec::new();

        tracing::info!(
            workers = shards.len(),
            start = range.start,
            end = range.end,
            "seed search started (all matches)"
        );

        thread::scope(|s| {
            let (tx, rx) = mpsc::channel::<Seed>();

            for shard in &shards {
                let ctl = &ctl;
                let tx = tx.clone();
                s.spawn(move || {
                    self.scan(*shard, ctl, |seed| tx.send(seed).is_ok());
                });
            }
            drop(tx);

            for seed in rx {
                tracing::info!(seed = %seed, "fingerprint matched");
                on_match(seed);
                matches.push(seed);
            }
        });

        matches.sort_unstable();
        let report = SearchReport {
            matches,
            candidates_tried: ctl.tried.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
            cancelled: self.cancel.is_cancelled(),
        };

        tracing::info!(
            matches = report.matches.len(),
            tried = report.candidates_tried,
            elapsed_ms = report.elapsed.as_millis() as u64,
            speed = report.speed() as u64,
            cancelled = report.cancelled,
            "seed search finished"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::FingerprintCheck;

    const KEY_SEED: u32 = 0x8000_203d;

    fn near_key() -> SeedRange {
        SeedRange::new(0x8000_0000, 0x8001_0000).unwrap()
    }

    #[test]
    fn test_range_validation() {
        assert!(SeedRange::new(5, 4).is_err());
        assert!(SeedRange::new(0, SeedRange::SPACE_END + 1).is_err());
        assert_eq!(SeedRange::full().len(), 1 << 32);
        assert!(SeedRange::new(7, 7).unwrap().is_empty());
    }

    #[test]
    fn test_shards_cover_range() {
        let range = SeedRange::new(10, 1_000_003).unwrap();
        for n in [1, 2, 3, 7, 16, 64] {
            let shards = range.shard(n);
            assert_eq!(shards.len(), n);
            assert_eq!(shards[0].start(), 10);
            assert_eq!(shards.last().unwrap().end(), 1_000_003);
            for pair in shards.windows(2) {
                assert_eq!(pair[0].end(), pair[1].start());
            }
            let total: u64 = shards.iter().map(|s| s.len()).sum();
            assert_eq!(total, range.len());
        }
    }

    #[test]
    fn test_shard_more_workers_than_seeds() {
        let range = SeedRange::new(0, 3).unwrap();
        assert_eq!(range.shard(16).len(), 3);
        assert_eq!(range.shard(0).len(), 1);
        assert_eq!(SeedRange::full().shard(4)[3].end(), SeedRange::SPACE_END);
    }

    #[test]
    fn test_search_finds_key_seed() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        assert_eq!(rec.search(near_key()), Some(Seed(KEY_SEED)));
    }

    #[test]
    fn test_search_misses_outside() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        let range = SeedRange::new(0x8000_203e, 0x8001_0000).unwrap();
        assert_eq!(rec.search(range), None);
    }

    #[test]
    fn test_resume_after_match() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        let range = SeedRange::new(0x7f00_0000, 0x8100_4000).unwrap();

        let first = rec.search(range).unwrap();
        assert_eq!(first, Seed(0x7f00_203d));
        let second = rec.search(range.after(first)).unwrap();
        assert_eq!(second, Seed(KEY_SEED));
        let third = rec.search(range.after(second)).unwrap();
        assert_eq!(third, Seed(0x8100_203d));
        assert_eq!(rec.search(range.after(third)), None);
    }

    #[test]
    fn test_par_search_matches_sequential() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        for workers in [1, 2, 5, 8] {
            assert_eq!(rec.par_search(near_key(), workers), Some(Seed(KEY_SEED)));
        }
    }

    #[test]
    fn test_par_search_picks_lowest() {
        // Two-draw fingerprint: six hits below 0x40000, spread across shards
        let fp = Fingerprint::new(vec![
            FingerprintCheck { position: 1, expected: 0x0e },
            FingerprintCheck { position: 2, expected: 0xe8 },
        ])
        .unwrap();
        let rec = SeedRecoverer::new(fp);
        let range = SeedRange::new(0, 0x0004_0000).unwrap();

        let lowest = rec.search(range).unwrap();
        assert_eq!(lowest, Seed(0x1882));
        assert_eq!(rec.search_all(range).len(), 6);
        for workers in [2, 3, 8] {
            assert_eq!(rec.par_search(range, workers), Some(lowest));
        }
    }

    #[test]
    fn test_par_search_all_streams_every_match() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        let range = SeedRange::new(0x7f00_0000, 0x8100_4000).unwrap();

        let mut streamed = Vec::new();
        let report = rec.par_search_all(range, 4, |seed| streamed.push(seed));
        streamed.sort();

        let expected = vec![Seed(0x7f00_203d), Seed(KEY_SEED), Seed(0x8100_203d)];
        assert_eq!(report.matches, expected);
        assert_eq!(streamed, expected);
        assert_eq!(report.candidates_tried, range.len());
        assert!(!report.cancelled);
        assert_eq!(rec.search_all(range), expected);
    }

    #[test]
    fn test_cancelled_search_stops() {
        let cancel = CancelToken::new();
        let rec = SeedRecoverer::new(Fingerprint::reference()).with_cancel(cancel.clone());
        cancel.cancel();

        let report = rec.par_search_all(SeedRange::full(), 4, |_| {});
        assert!(report.cancelled);
        assert!(report.matches.is_empty());
        assert_eq!(report.candidates_tried, 0);
        assert_eq!(rec.par_search(SeedRange::full(), 4), None);
    }

    #[test]
    #[ignore = "sweeps all 2^32 seeds"]
    fn test_full_space_sweep() {
        let rec = SeedRecoverer::new(Fingerprint::reference());
        let report = rec.par_search_all(SeedRange::full(), num_cpus::get(), |_| {});

        let expected: Vec<Seed> = (0..=255u32).map(|top| Seed(top << 24 | 0x203d)).collect();
        assert_eq!(report.matches, expected);
    }
}
