//! Test doubles for the host boundary.

/// `Host` mocks.
pub mod host;
