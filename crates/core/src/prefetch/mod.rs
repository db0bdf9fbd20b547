//! L2 Prefetcher implementations.
//!
//! This module contains the interface shared by all detectors, the state
//! tables and issue policy they are built from, and the detectors themselves.
//! Exactly one detector is active per run; [`build`] selects it from the
//! configuration.

/// AMPM-lite access map pattern matching prefetcher.
pub mod ampm;

/// IP-indexed stride prefetcher.
pub mod ip_stride;

/// MSHR-occupancy driven fill-level policy.
pub mod issue;

/// Confidence-gated stream prefetcher.
pub mod stream;

/// Bounded associative tables with pluggable victim selection.
pub mod table;

pub use self::ampm::{AmpmPrefetcher, PageAccessTable, PageEntry};
pub use self::ip_stride::{IpEntry, IpStridePrefetcher, IpStrideTable};
pub use self::issue::{IssueOutcome, IssuePolicy};
pub use self::stream::{StreamDetectorTable, StreamEntry, StreamPrefetcher};

use crate::common::error::ConfigError;
use crate::config::{Config, PrefetcherKind};
use crate::host::{FillEvent, Host};
use crate::stats::PrefetchStats;

/// Trait for L2 prefetcher implementations.
///
/// The host calls [`on_access`](Prefetcher::on_access) once per L2 demand
/// access, in access order. Prefetches are issued synchronously through the
/// [`Host`] during that call.
pub trait Prefetcher: Send + Sync {
    /// Returns a human-readable detector name.
    fn name(&self) -> &'static str;

    /// Resets all state tables and statistics to their startup state.
    fn initialize(&mut self);

    /// Observes a demand access and issues prefetches.
    ///
    /// # Arguments
    ///
    /// * `host` - Host simulator (cycle counter, occupancy, issue primitive).
    /// * `addr` - Byte address of the access.
    /// * `ip` - Instruction pointer of the instruction that caused the access.
    /// * `hit` - Whether the access hit in the L2.
    fn on_access(&mut self, host: &mut dyn Host, addr: u64, ip: u64, hit: bool);

    /// Observes a line fill. Only updates statistics.
    fn on_fill(&mut self, fill: &FillEvent) {
        if fill.prefetch {
            self.stats_mut().prefetch_fills += 1;
        }
    }

    /// Returns the detector's statistics.
    fn stats(&self) -> &PrefetchStats;

    /// Returns the detector's statistics for updating.
    fn stats_mut(&mut self) -> &mut PrefetchStats;

    /// Periodic statistics hook.
    fn heartbeat(&mut self) {
        self.stats().log(self.name(), "heartbeat");
    }

    /// Called once warmup ends; logs and then clears the statistics.
    fn on_warmup_complete(&mut self) {
        self.stats().log(self.name(), "warmup");
        *self.stats_mut() = PrefetchStats::default();
    }

    /// Called at the end of simulation.
    fn on_finalize(&mut self) {
        self.stats().log(self.name(), "final");
    }
}

/// Builds the configured detector, already initialized.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the configuration fails validation.
pub fn build(config: &Config) -> Result<Box<dyn Prefetcher>, ConfigError> {
    config.validate()?;
    let mut prefetcher: Box<dyn Prefetcher> = match config.prefetcher {
        PrefetcherKind::Ampm => Box::new(AmpmPrefetcher::new(&config.ampm)),
        PrefetcherKind::IpStride => Box::new(IpStridePrefetcher::new(&config.stride)),
        PrefetcherKind::Stream => Box::new(StreamPrefetcher::new(&config.stream)),
    };
    prefetcher.initialize();
    Ok(prefetcher)
}
