use mockall::mock;
use pfsim_core::common::addr::same_page;
use pfsim_core::host::{FillLevel, Host};

mock! {
    pub Host {}
    impl Host for Host {
        fn current_cycle(&self) -> u64;
        fn mshr_occupancy(&self) -> u32;
        fn read_queue_occupancy(&self) -> u32;
        fn try_issue(&mut self, base_addr: u64, target_addr: u64, fill: FillLevel) -> bool;
    }
}

/// One recorded `try_issue` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Issued {
    pub base: u64,
    pub target: u64,
    pub fill: FillLevel,
}

/// Host with fixed occupancy readings that records every issue attempt.
///
/// Accepts every same-page request unless `accept` is cleared.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    pub cycle: u64,
    pub mshr: u32,
    pub read_queue: u32,
    pub accept: bool,
    pub issued: Vec<Issued>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            cycle: 0,
            mshr: 0,
            read_queue: 0,
            accept: true,
            issued: Vec::new(),
        }
    }
}

impl RecordingHost {
    /// Target addresses of every attempt, in call order.
    pub fn targets(&self) -> Vec<u64> {
        self.issued.iter().map(|i| i.target).collect()
    }

    /// Removes and returns the target addresses recorded so far.
    pub fn drain_targets(&mut self) -> Vec<u64> {
        self.issued.drain(..).map(|i| i.target).collect()
    }
}

impl Host for RecordingHost {
    fn current_cycle(&self) -> u64 {
        self.cycle
    }

    fn mshr_occupancy(&self) -> u32 {
        self.mshr
    }

    fn read_queue_occupancy(&self) -> u32 {
        self.read_queue
    }

    fn try_issue(&mut self, base_addr: u64, target_addr: u64, fill: FillLevel) -> bool {
        self.issued.push(Issued {
            base: base_addr,
            target: target_addr,
            fill,
        });
        self.accept && same_page(base_addr, target_addr)
    }
}
