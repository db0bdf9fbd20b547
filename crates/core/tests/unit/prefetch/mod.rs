//! Unit tests for the prefetch module.


/// Detector construction from configuration.
pub mod build;

/// IP-stride tracker and detector.
pub mod ip_stride;
