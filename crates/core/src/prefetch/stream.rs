//! Stream Prefetcher.
//!
//! A prefetcher designed to detect and lock onto sequential access streams
//! within a 4 KiB page. Each tracked page has a cursor (the line the next
//! prefetch extends from), a direction, and a confidence counter.
//!
//! Accesses within `window` lines above the cursor vote for an ascending
//! stream, accesses within `window` lines below vote for a descending one. A
//! vote against the current direction resets confidence to zero. Once
//! confidence reaches the activation threshold, every access walks the cursor
//! `degree` lines in the stream direction and prefetches each line it lands
//! on, stopping at the page edge.
//!
//! Detectors are replaced round-robin, without regard to recency.

use super::issue::IssuePolicy;
use super::table::{BoundedTable, Lookup, RoundRobinVictim};
use super::Prefetcher;
use crate::common::addr::LineAddr;
use crate::common::constants::MAX_LINE_OFFSET;
use crate::config::StreamConfig;
use crate::host::Host;
use crate::stats::PrefetchStats;

/// Direction of the memory stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// No direction learned yet.
    #[default]
    None,
    /// Ascending line offsets.
    Ascending,
    /// Descending line offsets.
    Descending,
}

impl Direction {
    /// Cursor step for this direction.
    pub const fn step(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Effect of one training access on a detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Training {
    /// The access agreed with (or established) the direction; confidence grew.
    Reinforced,
    /// The access contradicted the learned direction; confidence reset to zero.
    Reversed,
    /// The access was on the cursor or outside the window.
    Ignored,
}

/// Per-page stream detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEntry {
    /// Learned direction.
    pub direction: Direction,
    /// Corroborating accesses since the last reversal.
    pub confidence: u32,
    /// Line the stream extends from. Leaves `0..64` once the walk runs off the page.
    pub cursor: i32,
}

impl StreamEntry {
    /// Creates a detector whose cursor sits on the triggering line.
    pub const fn new(offset: u8) -> Self {
        Self {
            direction: Direction::None,
            confidence: 0,
            cursor: offset as i32,
        }
    }

    /// Trains the detector on a demand access to line `offset`.
    ///
    /// The cursor itself is never moved by demand accesses.
    pub fn train(&mut self, offset: u8, window: u8) -> Training {
        let o = i32::from(offset);
        let window = i32::from(window);

        let (direction, opposite) = if o > self.cursor && o - self.cursor < window {
            (Direction::Ascending, Direction::Descending)
        } else if o < self.cursor && self.cursor - o < window {
            (Direction::Descending, Direction::Ascending)
        } else {
            return Training::Ignored;
        };

        let training = if self.direction == opposite {
            self.confidence = 0;
            Training::Reversed
        } else {
            self.confidence = self.confidence.saturating_add(1);
            Training::Reinforced
        };
        self.direction = direction;
        training
    }

    /// Advances the cursor one line in the stream direction.
    ///
    /// # Returns
    ///
    /// The new cursor line, or `None` if it stepped off the page (the cursor
    /// stays off-page) or no direction is known.
    pub fn advance(&mut self) -> Option<u8> {
        if self.direction == Direction::None {
            return None;
        }
        self.cursor += self.direction.step();
        if self.cursor < 0 || self.cursor > MAX_LINE_OFFSET {
            None
        } else {
            Some(self.cursor as u8)
        }
    }
}

/// Fixed-capacity round-robin table of stream detectors.
#[derive(Debug, Clone)]
pub struct StreamDetectorTable {
    detectors: BoundedTable<u64, StreamEntry, RoundRobinVictim>,
    window: u8,
    degree: usize,
    activation: u32,
}

/// Outcome of one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamObservation {
    /// Lines to prefetch, in cursor-walk order.
    pub targets: Vec<u8>,
    /// Effect of the access on the detector.
    pub training: Training,
    /// How the detector was obtained.
    pub lookup: Lookup<u64>,
}

impl StreamDetectorTable {
    /// Creates an empty table.
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            detectors: BoundedTable::new(config.detector_count, RoundRobinVictim::default()),
            window: config.window,
            degree: config.degree.max(1),
            activation: config.activation,
        }
    }

    /// Trains the page's detector on an access to line `offset` and walks the
    /// cursor if the stream is active.
    pub fn observe(&mut self, page: u64, offset: u8) -> StreamObservation {
        // Round-robin replacement never reads the timestamp.
        let (entry, lookup) = self.detectors.access(page, 0, || StreamEntry::new(offset));
        let training = entry.train(offset, self.window);

        let mut targets = Vec::new();
        if entry.confidence >= self.activation {
            for _ in 0..self.degree {
                match entry.advance() {
                    Some(line) => targets.push(line),
                    None => break,
                }
            }
        }
        StreamObservation {
            targets,
            training,
            lookup,
        }
    }

    /// Returns the detector for `page`.
    pub fn get(&self, page: u64) -> Option<&StreamEntry> {
        self.detectors.get(&page).map(|slot| &slot.value)
    }

    /// Returns the confidence a detector needs before it prefetches.
    pub const fn activation(&self) -> u32 {
        self.activation
    }

    /// Returns the slot the next new page will be allocated into.
    pub const fn next_victim(&self) -> usize {
        self.detectors.selector().next()
    }

    /// Returns the tracked page ids in slot order.
    pub fn pages(&self) -> impl Iterator<Item = u64> + '_ {
        self.detectors.iter().map(|slot| slot.key)
    }

    /// Returns the number of live detectors.
    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    /// Returns true if no detector is live.
    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Returns the table capacity.
    pub fn capacity(&self) -> usize {
        self.detectors.capacity()
    }

    /// Forgets every detector and rewinds the replacement pointer.
    pub fn clear(&mut self) {
        self.detectors.clear();
    }
}

/// Stream prefetcher state.
#[derive(Debug, Clone)]
pub struct StreamPrefetcher {
    table: StreamDetectorTable,
    policy: IssuePolicy,
    stats: PrefetchStats,
}

impl StreamPrefetcher {
    /// Creates a stream prefetcher.
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            table: StreamDetectorTable::new(config),
            policy: IssuePolicy::new(config.issue),
            stats: PrefetchStats::default(),
        }
    }

    /// Returns the detector table.
    pub const fn table(&self) -> &StreamDetectorTable {
        &self.table
    }
}

impl Prefetcher for StreamPrefetcher {
    fn name(&self) -> &'static str {
        "Streaming Prefetcher"
    }

    fn initialize(&mut self) {
        self.table.clear();
        self.stats = PrefetchStats::default();
        tracing::debug!(
            detector = self.name(),
            detectors = self.table.capacity(),
            "prefetcher initialized"
        );
    }

    fn on_access(&mut self, host: &mut dyn Host, addr: u64, _ip: u64, hit: bool) {
        self.stats.record_access(hit);
        let line = LineAddr::decompose(addr);
        let observation = self.table.observe(line.page, line.offset);

        if let Lookup::Replaced(old) = observation.lookup {
            self.stats.evictions += 1;
            tracing::trace!(evicted = old, page = line.page, "stream detector replaced");
        }
        match observation.training {
            Training::Reversed => {
                tracing::debug!(page = line.page, offset = line.offset, "stream reversed");
            }
            Training::Reinforced => {
                if let Some(entry) = self.table.get(line.page) {
                    if entry.confidence == self.table.activation() {
                        tracing::debug!(
                            page = line.page,
                            direction = ?entry.direction,
                            "stream activated"
                        );
                    }
                }
            }
            Training::Ignored => {}
        }

        for offset in observation.targets {
            let target = LineAddr::compose(line.page, offset);
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
