//! # Unit Components
//!
//! Tests for each module of the prefetch core.



/// Detector, table, and issue policy tests.
pub mod prefetch;

/// Trace parsing, host model, and replay tests.
pub mod sim;
