//! Replay driver.
//!
//! Feeds a trace through one detector against a fresh [`ModelHost`]. For each
//! record the host clock is advanced (delivering completed fills to
//! `on_fill`), the demand access is registered with the host, and the
//! detector's `on_access` runs. Statistics hooks fire at the configured
//! warmup boundary, heartbeat interval, and end of trace.

use serde::Serialize;

use super::host::{HostModel, IssueRecord, ModelHost};
use super::trace::TraceRecord;
use crate::host::Host;
use crate::prefetch::Prefetcher;
use crate::stats::PrefetchStats;

/// Result of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Detector name.
    pub detector: &'static str,
    /// Every issue attempt, in call order.
    pub issues: Vec<IssueRecord>,
    /// Detector statistics at the end of the trace (after warmup reset).
    pub stats: PrefetchStats,
    /// Host cycle after the last record.
    pub final_cycle: u64,
}

/// Replay settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Replay {
    model: HostModel,
    warmup: usize,
    heartbeat: usize,
}

impl Replay {
    /// Creates a replay against the given host model, with no warmup and no heartbeat.
    pub fn new(model: HostModel) -> Self {
        Self {
            model,
            warmup: 0,
            heartbeat: 0,
        }
    }

    /// Calls `on_warmup_complete` after the first `records` accesses.
    #[must_use]
    pub const fn with_warmup(mut self, records: usize) -> Self {
        self.warmup = records;
        self
    }

    /// Calls `heartbeat` every `records` accesses; zero disables it.
    #[must_use]
    pub const fn with_heartbeat(mut self, records: usize) -> Self {
        self.heartbeat = records;
        self
    }

    /// Initializes `prefetcher` and replays `trace` through it.
    pub fn run(&self, prefetcher: &mut dyn Prefetcher, trace: &[TraceRecord]) -> ReplayReport {
        let mut host = ModelHost::new(self.model);
        prefetcher.initialize();

        for (idx, record) in trace.iter().enumerate() {
            for fill in host.advance_to(record.cycle) {
                prefetcher.on_fill(&fill);
            }
            host.demand_access(record.addr, record.hit);
            prefetcher.on_access(&mut host, record.addr, record.ip, record.hit);

            let done = idx + 1;
            if self.warmup > 0 && done == self.warmup {
                prefetcher.on_warmup_complete();
            }
            if self.heartbeat > 0 && done % self.heartbeat == 0 {
                prefetcher.heartbeat();
            }
        }
        prefetcher.on_finalize();

        ReplayReport {
            detector: prefetcher.name(),
            issues: host.take_log(),
            stats: *prefetcher.stats(),
            final_cycle: host.current_cycle(),
        }
    }
}
