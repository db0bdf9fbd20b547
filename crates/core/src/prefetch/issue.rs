//! Resource-aware issue policy.
//!
//! Maps the host's L2 MSHR occupancy to a fill level and forwards the
//! request to the host's issue primitive. Each detector (and each AMPM scan
//! direction) owns its own policy so thresholds and comparison direction can
//! be tuned independently:
//!
//! | Detector      | Threshold | Rule        |
//! |---------------|-----------|-------------|
//! | AMPM forward  | 8         | `NearBelow` |
//! | AMPM backward | 12        | `NearBelow` |
//! | IP-stride     | 8         | `NearBelow` |
//! | Stream        | 8         | `FarAbove`  |
//!
//! A rejected request is reported to the caller and never retried here.

use crate::config::{FillRule, IssueConfig};
use crate::host::{FillLevel, Host};

/// Result of one issue attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueOutcome {
    /// Fill level the request was sent with.
    pub fill: FillLevel,
    /// Whether the host accepted the request.
    pub accepted: bool,
}

/// Occupancy-threshold fill-level policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuePolicy {
    threshold: u32,
    rule: FillRule,
}

impl IssuePolicy {
    /// Creates a policy from its configuration.
    pub const fn new(config: IssueConfig) -> Self {
        Self {
            threshold: config.threshold,
            rule: config.rule,
        }
    }

    /// Chooses the fill level for a given MSHR occupancy.
    #[inline]
    pub const fn fill_level(&self, occupancy: u32) -> FillLevel {
        let far = match self.rule {
            FillRule::NearBelow => occupancy >= self.threshold,
            FillRule::FarAbove => occupancy > self.threshold,
        };
        if far { FillLevel::Llc } else { FillLevel::L2 }
    }

    /// Issues a prefetch of `target_addr` on behalf of demand access `base_addr`.
    ///
    /// # Arguments
    ///
    /// * `host` - Host simulator providing occupancy and the issue primitive.
    /// * `base_addr` - The demand address that triggered the prefetch.
    /// * `target_addr` - The line to prefetch.
    ///
    /// # Returns
    ///
    /// The fill level used and whether the host accepted the request.
    pub fn issue(&self, host: &mut dyn Host, base_addr: u64, target_addr: u64) -> IssueOutcome {
        let fill = self.fill_level(host.mshr_occupancy());
        let accepted = host.try_issue(base_addr, target_addr, fill);
        tracing::trace!(
            base = base_addr,
            target = target_addr,
            %fill,
            accepted,
            "prefetch issued"
        );
        IssueOutcome { fill, accepted }
    }
}
