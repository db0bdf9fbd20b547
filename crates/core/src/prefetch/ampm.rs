//! AMPM-lite Prefetcher.
//!
//! A simplified Access Map Pattern Matching prefetcher working on 4 KiB
//! physical pages. For each tracked page it keeps two 64-bit maps: lines that
//! were demand accessed and lines that were already prefetched.
//!
//! On an access to line `o`, for each stride `i = 1..=max_stride` the line
//! `o + i` is prefetched when `o - i` and `o - 2i` were both accessed (the
//! stride repeated twice) and `o + i` is neither accessed nor prefetched. The
//! backward scan mirrors this with `o - i` as target and `o + i`, `o + 2i` as
//! anchors. Each direction issues at most `degree` prefetches per access.
//!
//! # Performance
//!
//! - **Time Complexity:** O(P + S) per access for P tracked pages and stride bound S.
//! - **Space Complexity:** O(P), two 64-bit maps per page.
//! - **Best Case:** Strided scans within a page, in either direction.
//! - **Worst Case:** Random accesses (maps never form a repeated stride).

use super::issue::IssuePolicy;
use super::table::{BoundedTable, Lookup, LruVictim};
use super::Prefetcher;
use crate::common::addr::LineAddr;
use crate::common::constants::MAX_LINE_OFFSET;
use crate::config::AmpmConfig;
use crate::host::Host;
use crate::stats::PrefetchStats;

/// Scan direction of the pattern matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// Targets above the access, anchors below it.
    Forward,
    /// Targets below the access, anchors above it.
    Backward,
}

/// Access and prefetch maps for one page.
///
/// Bit `i` of each map corresponds to line `i` of the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageEntry {
    accessed: u64,
    prefetched: u64,
}

impl PageEntry {
    /// Returns true if line `offset` was demand accessed.
    #[inline(always)]
    pub const fn is_accessed(&self, offset: u8) -> bool {
        self.accessed & (1 << offset) != 0
    }

    /// Returns true if line `offset` was already issued as a prefetch.
    #[inline(always)]
    pub const fn is_prefetched(&self, offset: u8) -> bool {
        self.prefetched & (1 << offset) != 0
    }

    /// Marks line `offset` as demand accessed.
    #[inline(always)]
    pub const fn mark_accessed(&mut self, offset: u8) {
        self.accessed |= 1 << offset;
    }

    /// Marks line `offset` as prefetched.
    #[inline(always)]
    pub const fn mark_prefetched(&mut self, offset: u8) {
        self.prefetched |= 1 << offset;
    }

    /// Raw access map.
    pub const fn access_map(&self) -> u64 {
        self.accessed
    }

    /// Raw prefetch map.
    pub const fn prefetch_map(&self) -> u64 {
        self.prefetched
    }

    /// Matches repeated strides around `offset` and returns lines to prefetch.
    ///
    /// Strides are scanned in ascending order. Each returned line is marked
    /// prefetched before the scan continues, so a larger stride within the
    /// same call cannot select it again.
    ///
    /// # Arguments
    ///
    /// * `offset` - Line just accessed (`0..64`).
    /// * `scan` - Direction to match in.
    /// * `max_stride` - Largest stride tried.
    /// * `degree` - Maximum number of lines returned.
    ///
    /// # Returns
    ///
    /// In-page line offsets, in stride order.
    pub fn candidate_prefetches(
        &mut self,
        offset: u8,
        scan: Scan,
        max_stride: u8,
        degree: usize,
    ) -> Vec<u8> {
        let in_page = |o: i32| (0..=MAX_LINE_OFFSET).contains(&o);
        let o = i32::from(offset);
        let mut targets = Vec::with_capacity(degree);

        for i in 1..=i32::from(max_stride) {
            let (near, far, target) = match scan {
                Scan::Forward => (o - i, o - 2 * i, o + i),
                Scan::Backward => (o + i, o + 2 * i, o - i),
            };

            if !in_page(far) || !in_page(target) || targets.len() >= degree {
                break;
            }

            let target = target as u8;
            if self.is_accessed(target) || self.is_prefetched(target) {
                continue;
            }

            if self.is_accessed(near as u8) && self.is_accessed(far as u8) {
                self.mark_prefetched(target);
                targets.push(target);
            }
        }
        targets
    }
}

/// Fixed-capacity LRU table of page access maps.
#[derive(Debug, Clone)]
pub struct PageAccessTable {
    pages: BoundedTable<u64, PageEntry, LruVictim>,
}

impl PageAccessTable {
    /// Creates an empty table tracking up to `capacity` pages.
    pub fn new(capacity: usize) -> Self {
        Self {
            pages: BoundedTable::new(capacity, LruVictim),
        }
    }

    /// Records a demand access to line `offset` of `page`.
    ///
    /// Allocates an entry with cleared maps when the page is not tracked,
    /// evicting the least recently touched page.
    ///
    /// # Returns
    ///
    /// The page's entry (with the access already marked) and the lookup outcome.
    pub fn observe(&mut self, page: u64, offset: u8, now: u64) -> (&mut PageEntry, Lookup<u64>) {
        let (entry, lookup) = self.pages.access(page, now, PageEntry::default);
        entry.mark_accessed(offset);
        (entry, lookup)
    }

    /// Returns the entry tracked for `page`.
    pub fn get(&self, page: u64) -> Option<&PageEntry> {
        self.pages.get(&page).map(|slot| &slot.value)
    }

    /// Returns the cycle `page` was last accessed, if tracked.
    pub fn last_touch(&self, page: u64) -> Option<u64> {
        self.pages.get(&page).map(|slot| slot.last_touch)
    }

    /// Returns the tracked page ids in slot order.
    pub fn pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.pages.iter().map(|slot| slot.key)
    }

    /// Returns the number of tracked pages.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Returns true if no page is tracked.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns the table capacity.
    pub fn capacity(&self) -> usize {
        self.pages.capacity()
    }

    /// Forgets every page.
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}

/// AMPM-lite prefetcher state.
#[derive(Debug, Clone)]
pub struct AmpmPrefetcher {
    table: PageAccessTable,
    degree: usize,
    max_stride: u8,
    forward: IssuePolicy,
    backward: IssuePolicy,
    stats: PrefetchStats,
}

impl AmpmPrefetcher {
    /// Creates an AMPM-lite prefetcher.
    pub fn new(config: &AmpmConfig) -> Self {
        Self {
            table: PageAccessTable::new(config.page_count),
            degree: config.degree.max(1),
            max_stride: config.max_stride,
            forward: IssuePolicy::new(config.forward),
            backward: IssuePolicy::new(config.backward),
            stats: PrefetchStats::default(),
        }
    }

    /// Returns the page table.
    pub const fn table(&self) -> &PageAccessTable {
        &self.table
    }
}

impl Prefetcher for AmpmPrefetcher {
    fn name(&self) -> &'static str {
        "AMPM Lite Prefetcher"
    }

    fn initialize(&mut self) {
        self.table.clear();
        self.stats = PrefetchStats::default();
        tracing::debug!(
            detector = self.name(),
            pages = self.table.capacity(),
            degree = self.degree,
            max_stride = self.max_stride,
            "prefetcher initialized"
        );
    }

    fn on_access(&mut self, host: &mut dyn Host, addr: u64, _ip: u64, hit: bool) {
        self.stats.record_access(hit);
        let line = LineAddr::decompose(addr);
        let now = host.current_cycle();

        let (entry, lookup) = self.table.observe(line.page, line.offset, now);
        let forward =
            entry.candidate_prefetches(line.offset, Scan::Forward, self.max_stride, self.degree);
        let backward =
            entry.candidate_prefetches(line.offset, Scan::Backward, self.max_stride, self.degree);

        if let Lookup::Replaced(old) = lookup {
            self.stats.evictions += 1;
            tracing::trace!(evicted = old, page = line.page, "ampm page replaced");
        }

        for (targets, policy) in [(forward, self.forward), (backward, self.backward)] {
            for offset in targets {
                let target = LineAddr::compose(line.page, offset);
                let outcome = policy.issue(host, addr, target);
                self.stats.record_issue(outcome.fill, outcome.accepted);
            }
        }
    }

    fn stats(&self) -> &PrefetchStats {
        &self.stats
    }

    fn stats_mut(&mut self) -> &mut PrefetchStats {
        &mut self.stats
    }
}
