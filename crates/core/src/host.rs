//! Host simulator boundary.
//!
//! This module defines the interface the surrounding cache simulator provides
//! to the detectors. It provides:
//! 1. **Time:** The current cycle, used for LRU timestamps.
//! 2. **Occupancy:** L2 MSHR and read queue occupancy readings.
//! 3. **Issue:** The prefetch issue primitive, which may reject a request.
//! 4. **Fill Events:** The description of a line fill delivered to `on_fill`.
//!
//! The host owns set/way lookup, MSHR and read-queue mechanics, and data
//! movement. Detectors never see those directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cache level a prefetched line is filled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FillLevel {
    /// Fill into the L2 (near). Consumes an L2 MSHR.
    L2,
    /// Fill into the last-level cache (far). Does not consume an L2 MSHR.
    Llc,
}

impl fmt::Display for FillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::L2 => f.pad("L2"),
            Self::Llc => f.pad("LLC"),
        }
    }
}

/// Primitives the host simulator exposes to a prefetcher.
///
/// Calls happen synchronously from inside [`Prefetcher::on_access`](crate::prefetch::Prefetcher::on_access).
pub trait Host {
    /// Returns the core's cycle count since simulation began.
    fn current_cycle(&self) -> u64;

    /// Returns the number of occupied L2 MSHRs.
    fn mshr_occupancy(&self) -> u32;

    /// Returns the current length of the L2 read queue.
    fn read_queue_occupancy(&self) -> u32;

    /// Requests a prefetch of `target_addr` into `fill`.
    ///
    /// `base_addr` must be the demand address that triggered the prefetch.
    ///
    /// # Returns
    ///
    /// `true` if the request was accepted. Requests are rejected when the
    /// target is not in the same 4 KiB page as `base_addr`, or when the MSHRs
    /// or the read queue are full.
    fn try_issue(&mut self, base_addr: u64, target_addr: u64, fill: FillLevel) -> bool;
}

/// A line fill reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillEvent {
    /// Byte address of the filled line.
    pub addr: u64,
    /// L2 set the line was placed in.
    pub set: u32,
    /// Way within the set.
    pub way: u32,
    /// Whether the fill was caused by a prefetch.
    pub prefetch: bool,
    /// Byte address of the evicted line, if any was evicted.
    pub evicted_addr: Option<u64>,
}
