//! Configuration and Trace Error definitions.
//!
//! The prefetch decision logic itself has no failure modes; every anomaly on
//! the access path is absorbed locally. Errors only arise at the edges:
//! 1. **Configuration:** Malformed JSON, unreadable files, or out-of-range knobs.
//! 2. **Traces:** Unreadable trace files or malformed trace records.

use std::io;

use thiserror::Error;

/// Errors raised while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The configuration text is not valid JSON for the config schema.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A state table was configured with zero entries.
    #[error("{table} must have at least one entry")]
    ZeroCapacity {
        /// Name of the offending table.
        table: &'static str,
    },

    /// A detector was configured to issue zero prefetches per access.
    #[error("{detector} prefetch degree must be at least 1")]
    ZeroDegree {
        /// Name of the offending detector.
        detector: &'static str,
    },

    /// The AMPM stride search range would reach past a page.
    #[error("AMPM max_stride {max} exceeds limit {limit}")]
    StrideRangeTooLarge {
        /// Configured maximum stride.
        max: u8,
        /// Largest accepted maximum stride.
        limit: u8,
    },

    /// The stream training window is wider than a page.
    #[error("stream window {window} exceeds limit {limit}")]
    WindowTooLarge {
        /// Configured window.
        window: u8,
        /// Largest accepted window.
        limit: u8,
    },
}

/// Errors raised while reading an access trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace source could not be read.
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),

    /// A trace line does not have the `<cycle> <addr> <ip> <hit>` shape.
    #[error("trace line {line}: {reason}")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
}
