//! L2 prefetch decision engines for trace-driven cache simulation.
//!
//! This crate implements the prefetchers of a DPC-style L2 prefetching kit:
//! 1. **Detectors:** AMPM-lite access-map matching, IP-indexed stride
//!    tracking, and a confidence-gated stream detector.
//! 2. **Tables:** Bounded associative state tables with LRU or round-robin
//!    victim selection.
//! 3. **Issue policy:** MSHR-occupancy driven choice between L2 and LLC fill.
//! 4. **Host boundary:** The `Host` trait the surrounding simulator implements.
//! 5. **Replay:** A text trace parser, a deterministic host model, and a
//!    replay driver for running detectors outside a full simulator.

/// Common types and constants (line/page geometry, address decomposition, errors).
pub mod common;
/// Prefetcher configuration (defaults, detector selection, per-detector knobs).
pub mod config;
/// Host simulator boundary (cycle counter, occupancy readings, issue primitive).
pub mod host;
/// Prefetcher trait, state tables, issue policy, and detector implementations.
pub mod prefetch;
/// Trace replay harness (trace parsing, host model, replay driver).
pub mod sim;
/// Per-detector statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Host boundary trait and fill-level identifiers.
pub use crate::host::{FillLevel, Host};
/// Common prefetcher interface; construct a configured detector with `prefetch::build`.
pub use crate::prefetch::Prefetcher;
