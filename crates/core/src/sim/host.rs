//! Deterministic host model.
//!
//! A small stand-in for the L2 of a cache simulator, sufficient to exercise
//! the issue policy:
//! - Demand misses and L2-level prefetches hold an MSHR for `fill_latency` cycles.
//! - Every accepted prefetch holds a read-queue slot for `queue_latency` cycles.
//! - `try_issue` rejects cross-page targets and requests arriving while the
//!   MSHRs or the read queue are full.
//!
//! Every issue attempt is appended to an in-memory log. Lines filled into
//! the L2 are reported back when their MSHR retires, placed in set
//! `line % L2_SET_COUNT`. Ways are not modelled.

use std::collections::VecDeque;

use serde::Serialize;

use crate::common::addr::{LineAddr, same_page};
use crate::common::constants::{L2_MSHR_COUNT, L2_READ_QUEUE_SIZE, L2_SET_COUNT};
use crate::host::{FillEvent, FillLevel, Host};

/// Host model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostModel {
    /// Number of L2 MSHRs.
    pub mshr_capacity: u32,
    /// L2 read queue depth.
    pub read_queue_capacity: u32,
    /// Cycles an MSHR stays occupied.
    pub fill_latency: u64,
    /// Cycles a read queue slot stays occupied.
    pub queue_latency: u64,
}

impl Default for HostModel {
    fn default() -> Self {
        Self {
            mshr_capacity: L2_MSHR_COUNT,
            read_queue_capacity: L2_READ_QUEUE_SIZE,
            fill_latency: 200,
            queue_latency: 20,
        }
    }
}

/// One call to [`Host::try_issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Cycle of the call.
    pub cycle: u64,
    /// Triggering demand address.
    pub base_addr: u64,
    /// Requested prefetch address.
    pub target_addr: u64,
    /// Requested fill level.
    pub fill: FillLevel,
    /// Whether the request was accepted.
    pub accepted: bool,
}

/// An occupied MSHR.
#[derive(Debug, Clone, Copy)]
struct Mshr {
    done: u64,
    addr: u64,
    prefetch: bool,
}

/// Host model state.
///
/// Completion cycles saturate at `u64::MAX`; such a request never retires.
#[derive(Debug, Clone, Default)]
pub struct ModelHost {
    model: HostModel,
    cycle: u64,
    mshrs: VecDeque<Mshr>,
    /// Completion cycles of occupied read queue slots.
    read_queue: VecDeque<u64>,
    log: Vec<IssueRecord>,
}

impl ModelHost {
    /// Creates an idle host at cycle 0.
    pub fn new(model: HostModel) -> Self {
        Self {
            model,
            ..Self::default()
        }
    }

    /// Advances the clock to `cycle` and retires completed requests.
    ///
    /// The clock never moves backwards.
    ///
    /// # Returns
    ///
    /// The L2 fills completed by the advance, in completion order.
    pub fn advance_to(&mut self, cycle: u64) -> Vec<FillEvent> {
        self.cycle = self.cycle.max(cycle);
        let now = self.cycle;
        self.read_queue.retain(|&done| done > now);

        let (mut retired, pending): (Vec<Mshr>, Vec<Mshr>) =
            self.mshrs.drain(..).partition(|m| m.done <= now);
        self.mshrs = pending.into();
        retired.sort_by_key(|m| m.done);

        retired
            .into_iter()
            .map(|m| FillEvent {
                addr: m.addr,
                set: (LineAddr::decompose(m.addr).line % L2_SET_COUNT) as u32,
                way: 0,
                prefetch: m.prefetch,
                evicted_addr: None,
            })
            .collect()
    }

    /// Records a demand access to `addr`. A miss takes an MSHR when one is free.
    pub fn demand_access(&mut self, addr: u64, hit: bool) {
        if !hit && self.mshrs.len() < self.model.mshr_capacity as usize {
            self.mshrs.push_back(Mshr {
                done: self.cycle.saturating_add(self.model.fill_latency),
                addr,
                prefetch: false,
            });
        }
    }

    /// Returns every issue attempt so far.
    pub fn issue_log(&self) -> &[IssueRecord] {
        &self.log
    }

    /// Removes and returns the issue log.
    pub fn take_log(&mut self) -> Vec<IssueRecord> {
        std::mem::take(&mut self.log)
    }

    /// Returns the model parameters.
    pub const fn model(&self) -> HostModel {
        self.model
    }
}

impl Host for ModelHost {
    fn current_cycle(&self) -> u64 {
        self.cycle
    }

    fn mshr_occupancy(&self) -> u32 {
        self.mshrs.len() as u32
    }

    fn read_queue_occupancy(&self) -> u32 {
        self.read_queue.len() as u32
    }

    fn try_issue(&mut self, base_addr: u64, target_addr: u64, fill: FillLevel) -> bool {
        let accepted = same_page(base_addr, target_addr)
            && self.mshr_occupancy() < self.model.mshr_capacity
            && self.read_queue_occupancy() < self.model.read_queue_capacity;

        if accepted {
            self.read_queue
                .push_back(self.cycle.saturating_add(self.model.queue_latency));
            if fill == FillLevel::L2 {
                self.mshrs.push_back(Mshr {
                    done: self.cycle.saturating_add(self.model.fill_latency),
                    addr: target_addr,
                    prefetch: true,
                });
            }
        }

        self.log.push(IssueRecord {
            cycle: self.cycle,
            base_addr,
            target_addr,
            fill,
            accepted,
        });
        accepted
    }
}
