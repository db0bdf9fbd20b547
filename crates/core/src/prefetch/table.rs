//! Bounded Associative State Tables.
//!
//! Every detector keeps its per-key state (per page or per instruction
//! pointer) in a small fixed-capacity table searched linearly. When a new key
//! arrives and no entry matches, a victim slot is chosen by a pluggable
//! selector:
//!
//! - `LruVictim`: empty slots first, then the slot with the smallest
//!   `last_touch` (ties broken by lowest index).
//! - `RoundRobinVictim`: a pointer that advances and wraps on every
//!   allocation, ignoring recency.
//!
//! # Performance
//!
//! - **Time Complexity:** `access()` is O(N) in the table capacity (linear scan).
//! - **Space Complexity:** O(N).
//! - **Hardware Cost:** Fully associative CAM of 64-1024 entries.

/// One occupied table slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot<K, V> {
    /// Lookup key (page id, instruction pointer).
    pub key: K,
    /// Detector-specific state.
    pub value: V,
    /// Cycle of the most recent access through [`BoundedTable::access`].
    pub last_touch: u64,
}

/// Trait for victim selection over a table's slots.
pub trait VictimSelector: Send + Sync {
    /// Selects the slot to (re)allocate for a key that missed.
    ///
    /// # Arguments
    ///
    /// * `slots` - All slots of the table; `None` marks an empty slot.
    ///
    /// # Returns
    ///
    /// The index of the slot to overwrite. Always `< slots.len()`.
    fn victim<K, V>(&mut self, slots: &[Option<Slot<K, V>>]) -> usize;

    /// Returns the selector to its initial state.
    fn reset(&mut self);
}

/// Least-recently-used victim selection by `last_touch` timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct LruVictim;

impl VictimSelector for LruVictim {
    fn victim<K, V>(&mut self, slots: &[Option<Slot<K, V>>]) -> usize {
        // `None < Some(_)`, so empty slots win; `min_by_key` keeps the first minimum.
        slots
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.as_ref().map(|s| s.last_touch))
            .map_or(0, |(idx, _)| idx)
    }

    fn reset(&mut self) {}
}

/// Round-robin victim selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinVictim {
    /// Next slot to allocate.
    next: usize,
}

impl RoundRobinVictim {
    /// Returns the slot the next allocation will use.
    pub const fn next(&self) -> usize {
        self.next
    }
}

impl VictimSelector for RoundRobinVictim {
    fn victim<K, V>(&mut self, slots: &[Option<Slot<K, V>>]) -> usize {
        let idx = self.next % slots.len().max(1);
        self.next = (idx + 1) % slots.len().max(1);
        idx
    }

    fn reset(&mut self) {
        self.next = 0;
    }
}

/// How the slot returned by [`BoundedTable::access`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<K> {
    /// The key was already tracked.
    Hit,
    /// The key was placed into an empty slot.
    Filled,
    /// The key replaced a live entry; carries the evicted key.
    Replaced(K),
}

impl<K> Lookup<K> {
    /// Returns true if the key was already tracked.
    pub const fn is_hit(&self) -> bool {
        matches!(self, Self::Hit)
    }
}

/// Fixed-capacity associative table with linear lookup.
///
/// Invariant: at most one live slot per key.
#[derive(Debug, Clone)]
pub struct BoundedTable<K, V, S> {
    /// Slots; `None` is an empty slot.
    slots: Vec<Option<Slot<K, V>>>,
    /// Victim selection strategy.
    selector: S,
}

impl<K, V, S> BoundedTable<K, V, S>
where
    K: Copy + Eq,
    S: VictimSelector,
{
    /// Creates an empty table.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of slots. A capacity of zero is raised to one.
    /// * `selector` - Victim selection strategy.
    pub fn new(capacity: usize, selector: S) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(1));
        slots.resize_with(capacity.max(1), || None);
        Self { slots, selector }
    }

    /// Returns the number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if no slot is live.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Returns the slot index holding `key`, if tracked.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.key == *key))
    }

    /// Returns the state tracked for `key`.
    pub fn get(&self, key: &K) -> Option<&Slot<K, V>> {
        self.position(key).and_then(|idx| self.slots[idx].as_ref())
    }

    /// Looks up `key`, allocating a slot for it on a miss, and stamps it with `now`.
    ///
    /// # Arguments
    ///
    /// * `key` - Key to look up.
    /// * `now` - Current cycle, stored as the slot's `last_touch`.
    /// * `init` - Builds the initial state for a newly allocated slot.
    ///
    /// # Returns
    ///
    /// The slot's state and how it was obtained.
    pub fn access(&mut self, key: K, now: u64, init: impl FnOnce() -> V) -> (&mut V, Lookup<K>) {
        let (idx, lookup) = match self.position(&key) {
            Some(idx) => (idx, Lookup::Hit),
            None => {
                let idx = self.selector.victim(&self.slots);
                let lookup = match self.slots[idx].take() {
                    Some(old) => Lookup::Replaced(old.key),
                    None => Lookup::Filled,
                };
                (idx, lookup)
            }
        };

        let slot = self.slots[idx].get_or_insert_with(|| Slot {
            key,
            value: init(),
            last_touch: now,
        });
        slot.last_touch = now;
        (&mut slot.value, lookup)
    }

    /// Iterates over the live slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Slot<K, V>> {
        self.slots.iter().flatten()
    }

    /// Returns the victim selector.
    pub const fn selector(&self) -> &S {
        &self.selector
    }

    /// Empties every slot and resets the victim selector.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.selector.reset();
    }
}
