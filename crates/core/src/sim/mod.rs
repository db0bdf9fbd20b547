//! Trace replay harness.
//!
//! Runs a detector over a recorded access stream without a full cache
//! simulator. It provides:
//! 1. **Traces:** A line-oriented `<cycle> <addr> <ip> <hit>` text format.
//! 2. **Host Model:** A deterministic MSHR/read-queue model implementing `Host`.
//! 3. **Replay:** A driver that feeds the trace through a detector and collects the issue log.

/// Deterministic host model.
pub mod host;

/// Replay driver.
pub mod replay;

/// Trace records and parsing.
pub mod trace;

pub use host::{HostModel, IssueRecord, ModelHost};
pub use replay::{Replay, ReplayReport};
pub use trace::TraceRecord;
