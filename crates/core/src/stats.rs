//! Prefetcher statistics collection and reporting.
//!
//! This module tracks what a detector did during a run. It provides:
//! 1. **Access counts:** Demand accesses and demand misses observed.
//! 2. **Issue counts:** Candidates produced, accepted L2/LLC prefetches, and rejections.
//! 3. **Table churn:** State table evictions.
//! 4. **Fill feedback:** Prefetched lines reported filled by the host.
//!
//! Counters are observational only; no detector reads them to make decisions.

use serde::Serialize;

use crate::host::FillLevel;

/// Detector statistics structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    /// Demand accesses observed.
    pub accesses: u64,
    /// Demand accesses that missed in the L2.
    pub misses: u64,
    /// Prefetch targets handed to the issue policy.
    pub candidates: u64,
    /// Prefetches accepted into the L2.
    pub issued_l2: u64,
    /// Prefetches accepted into the LLC.
    pub issued_llc: u64,
    /// Prefetches rejected by the host.
    pub rejected: u64,
    /// Prefetched lines reported filled by the host.
    pub prefetch_fills: u64,
    /// State table entries evicted to make room for a new key.
    pub evictions: u64,
}

impl PrefetchStats {
    /// Records one demand access.
    #[inline]
    pub const fn record_access(&mut self, hit: bool) {
        self.accesses += 1;
        if !hit {
            self.misses += 1;
        }
    }

    /// Records the outcome of one issue attempt.
    #[inline]
    pub const fn record_issue(&mut self, fill: FillLevel, accepted: bool) {
        self.candidates += 1;
        match (accepted, fill) {
            (false, _) => self.rejected += 1,
            (true, FillLevel::L2) => self.issued_l2 += 1,
            (true, FillLevel::Llc) => self.issued_llc += 1,
        }
    }

    /// Total accepted prefetches across both fill levels.
    pub const fn issued(&self) -> u64 {
        self.issued_l2 + self.issued_llc
    }

    /// Fraction of candidates the host accepted, in `[0, 1]`.
    pub fn acceptance_rate(&self) -> f64 {
        if self.candidates == 0 {
            0.0
        } else {
            self.issued() as f64 / self.candidates as f64
        }
    }

    /// Emits the counters as a structured `info` event.
    ///
    /// # Arguments
    ///
    /// * `detector` - Name of the detector the counters belong to.
    /// * `phase` - Lifecycle point (`"heartbeat"`, `"warmup"`, `"final"`).
    pub fn log(&self, detector: &str, phase: &str) {
        tracing::info!(
            detector,
            phase,
            accesses = self.accesses,
            misses = self.misses,
            candidates = self.candidates,
            issued_l2 = self.issued_l2,
            issued_llc = self.issued_llc,
            rejected = self.rejected,
            prefetch_fills = self.prefetch_fills,
            evictions = self.evictions,
            "prefetcher stats"
        );
    }

    /// Prints the counters to stdout.
    pub fn print(&self, detector: &str) {
        println!("\n==========================================================");
        println!("PREFETCHER STATISTICS ({detector})");
        println!("==========================================================");
        println!("accesses                 {}", self.accesses);
        println!("misses                   {}", self.misses);
        println!("pf.candidates            {}", self.candidates);
        println!("pf.issued_l2             {}", self.issued_l2);
        println!("pf.issued_llc            {}", self.issued_llc);
        println!("pf.rejected              {}", self.rejected);
        println!(
            "pf.acceptance            {:.2}%",
            self.acceptance_rate() * 100.0
        );
        println!("pf.fills                 {}", self.prefetch_fills);
        println!("table.evictions          {}", self.evictions);
        println!("==========================================================");
    }
}
