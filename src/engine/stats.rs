// Live statistics aggregation — fetched bytes, load outcomes, in-flight loads.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

struct StatsSample {
    at: Instant,
    fetched_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub fetch_bps: u64,
    pub fetched_bytes: u64,
    pub active_loads: u32,
    pub loads_started: u64,
    pub loads_succeeded: u64,
    pub loads_failed: u64,
    pub stale_discarded: u64,
}

pub struct PreloadStats {
    fetched_bytes_total: AtomicU64,
    active_loads: AtomicU32,
    loads_started: AtomicU64,
    loads_succeeded: AtomicU64,
    loads_failed: AtomicU64,
    stale_discarded: AtomicU64,
    last_sample: Mutex<StatsSample>,
}

impl PreloadStats {
    pub fn new() -> Self {
        Self {
            fetched_bytes_total: AtomicU64::new(0),
            active_loads: AtomicU32::new(0),
            loads_started: AtomicU64::new(0),
            loads_succeeded: AtomicU64::new(0),
            loads_failed: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
            last_sample: Mutex::new(StatsSample {
                at: Instant::now(),
                fetched_bytes: 0,
            }),
        }
    }

    pub fn record_started(&self) {
        self.loads_started.fetch_add(1, Ordering::Relaxed);
        self.active_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loaded(&self, bytes: u64) {
        self.fetched_bytes_total.fetch_add(bytes, Ordering::Relaxed);
        self.loads_succeeded.fetch_add(1, Ordering::Relaxed);
        self.active_loads.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.loads_failed.fetch_add(1, Ordering::Relaxed);
        self.active_loads.fetch_sub(1, Ordering::Relaxed);
    }

    /// A completion arrived for a run that has since been replaced.
    pub fn record_stale(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let now = Instant::now();
        let current_fetched = self.fetched_bytes_total.load(Ordering::Relaxed);

        let fetch_bps = {
            let mut sample = self.last_sample.lock();
            let elapsed = now.duration_since(sample.at).as_secs_f64();

            let bps = if elapsed > 0.1 {
                (current_fetched.saturating_sub(sample.fetched_bytes) as f64 / elapsed) as u64
            } else {
                0
            };

            // Next snapshot diffs against this one.
            sample.at = now;
            sample.fetched_bytes = current_fetched;

            bps
        };

        StatsSnapshot {
            fetch_bps,
            fetched_bytes: current_fetched,
            active_loads: self.active_loads.load(Ordering::Relaxed),
            loads_started: self.loads_started.load(Ordering::Relaxed),
            loads_succeeded: self.loads_succeeded.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
            stale_discarded: self.stale_discarded.load(Ordering::Relaxed),
        }
    }
}

impl Default for PreloadStats {
    fn default() -> Self {
        Self::new()
    }
}
