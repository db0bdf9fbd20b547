//! Unit tests for the replay harness.



/// Trace parsing.
pub mod trace;
