//! IP-based Stride Prefetcher.
//!
//! Detects constant strides in the addresses touched by each instruction
//! pointer. A fixed-capacity LRU table maps an IP to the last address it
//! accessed and the stride between its last two accesses.
//!
//! Prefetching is triggered when the current stride equals the previous one,
//! so a run of equal strides starts predicting at its third access. Targets
//! are `addr + stride * k` for `k = 1..=degree`, cut off at the first target
//! outside the demand access's 4 KiB page.
//!
//! # Performance
//!
//! - **Time Complexity:** O(T + D) per access for T trackers and degree D.
//! - **Space Complexity:** O(T).
//! - **Best Case:** Loops striding through arrays with a fixed load IP.
//! - **Worst Case:** Pointer chasing, or more hot IPs than trackers.

use super::issue::IssuePolicy;
use super::table::{BoundedTable, Lookup, LruVictim};
use super::Prefetcher;
use crate::common::addr::same_page;
use crate::config::StrideConfig;
use crate::host::Host;
use crate::stats::PrefetchStats;

/// Per-IP stride history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpEntry {
    /// Byte address of the IP's last access.
    pub last_addr: u64,
    /// Byte stride between the IP's last two accesses.
    pub last_stride: i64,
}

/// Outcome of one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideObservation {
    /// Predicted byte addresses, nearest first. Empty when nothing is predicted.
    pub targets: Vec<u64>,
    /// How the tracker was obtained.
    pub lookup: Lookup<u64>,
}

/// Fixed-capacity LRU table of IP trackers.
#[derive(Debug, Clone)]
pub struct IpStrideTable {
    trackers: BoundedTable<u64, IpEntry, LruVictim>,
    degree: usize,
}

impl IpStrideTable {
    /// Creates an empty table of `capacity` trackers predicting `degree` strides ahead.
    pub fn new(capacity: usize, degree: usize) -> Self {
        Self {
            trackers: BoundedTable::new(capacity, LruVictim),
            degree: degree.max(1),
        }
    }

    /// Trains on an access by `ip` to `addr` and predicts future addresses.
    ///
    /// On the first sighting of `ip` the address is recorded with stride 0 and
    /// nothing is predicted. A zero stride carries no information and leaves
    /// the tracker untouched apart from its LRU stamp.
    pub fn observe(&mut self, ip: u64, addr: u64, now: u64) -> StrideObservation {
        let (entry, lookup) = self.trackers.access(ip, now, || IpEntry {
            last_addr: addr,
            last_stride: 0,
        });

        let mut targets = Vec::new();
        if !lookup.is_hit() {
            return StrideObservation { targets, lookup };
        }

        let stride = addr.wrapping_sub(entry.last_addr) as i64;
        if stride == 0 {
            return StrideObservation { targets, lookup };
        }

        if stride == entry.last_stride {
            for k in 1..=self.degree as i64 {
                let Some(target) = stride
                    .checked_mul(k)
                    .and_then(|delta| addr.checked_add_signed(delta))
                else {
                    break;
                };
                if !same_page(target, addr) {
                    break;
                }
                targets.push(target);
            }
        }

        entry.last_addr = addr;
        entry.last_stride = stride;
        StrideObservation { targets, lookup }
    }

    /// Returns the tracker for `ip`.
    pub fn get(&self, ip: u64) -> Option<&IpEntry> {
        self.trackers.get(&ip).map(|slot| &slot.value)
    }

    /// Returns the cycle `ip` was last seen, if tracked.
    pub fn last_touch(&self, ip: u64) -> Option<u64> {
        self.trackers.get(&ip).map(|slot| slot.last_touch)
    }

    /// Returns the number of tracked IPs.
    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    /// Returns true if no IP is tracked.
    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    /// Returns the table capacity.
    pub fn capacity(&self) -> usize {
        self.trackers.capacity()
    }

    /// Forgets every tracker.
    pub fn clear(&mut self) {
        self.trackers.clear();
    }
}

/// IP-stride prefetcher state.
#[derive(Debug, Clone)]
pub struct IpStridePrefetcher {
    table: IpStrideTable,
    policy: IssuePolicy,
    stats: PrefetchStats,
}

impl IpStridePrefetcher {
    /// Creates an IP-stride prefetcher.
    pub fn new(config: &StrideConfig) -> Self {
        Self {
            table: IpStrideTable::new(config.tracker_count, config.degree),
            policy: IssuePolicy::new(config.issue),
            stats: PrefetchStats::default(),
        }
    }

    /// Returns the tracker table.
    pub const fn table(&self) -> &IpStrideTable {
        &self.table
    }
}

impl Prefetcher for IpStridePrefetcher {
    fn name(&self) -> &'static str {
        "IP-based Stride Prefetcher"
    }

    fn initialize(&mut self) {
        self.table.clear();
        self.stats = PrefetchStats::default();
        tracing::debug!(
            detector = self.name(),
            trackers = self.table.capacity(),
            "prefetcher initialized"
        );
    }

    fn on_access(&mut self, host: &mut dyn Host, addr: u64, ip: u64, hit: bool) {
        self.stats.record_access(hit);
        let observation = self.table.observe(ip, addr, host.current_cycle());

        if let Lookup::Replaced(old) = observation.lookup {
            self.stats.evictions += 1;
            tracing::trace!(evicted = old, ip, "ip tracker replaced");
        }

        for target in observation.targets {
            let outcome = self.policy.issue(host, addr, target);
            self.stats.record_issue(outcome.fill, outcome.accepted);
        }
    }

    fn stats(&self) -> &PrefetchStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut PrefetchStats {
        &mut self.stats
    }
}
