//! Common utilities and types shared by every detector.
//!
//! This module provides:
//! 1. **Constants:** Cache line and page geometry, host resource capacities.
//! 2. **Address Decomposition:** Byte address to page, in-page line offset, and line address.
//! 3. **Error Handling:** Configuration and trace parsing error types.

/// Address decomposition into page, line offset, and line address.
pub mod addr;

/// Line, page, and host resource constants.
pub mod constants;

/// Error types for configuration and trace handling.
pub mod error;

pub use addr::LineAddr;
pub use constants::{CACHE_LINE_SIZE, LINES_PER_PAGE, PAGE_SIZE};
pub use error::{ConfigError, TraceError};
