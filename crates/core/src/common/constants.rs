//! Global Geometry Constants.
//!
//! This module defines the constants shared between the host simulator and
//! the detectors. It includes:
//! 1. **Line/Page Geometry:** 64-byte cache lines and 4 KiB pages.
//! 2. **Host Resources:** L2 MSHR count and read queue depth.

/// Cache line size in bytes.
pub const CACHE_LINE_SIZE: u64 = 64;

/// Number of bits to shift to convert between bytes and cache lines.
pub const LINE_SHIFT: u32 = 6;

/// Page size in bytes (4KB).
pub const PAGE_SIZE: u64 = 4096;

/// Number of bits to shift to convert between bytes and pages.
pub const PAGE_SHIFT: u32 = 12;

/// Number of cache lines in one page.
pub const LINES_PER_PAGE: usize = (PAGE_SIZE / CACHE_LINE_SIZE) as usize;

/// Highest valid in-page line offset.
pub const MAX_LINE_OFFSET: i32 = LINES_PER_PAGE as i32 - 1;

/// Mask for extracting the in-page line offset from a line address.
pub const LINE_OFFSET_MASK: u64 = LINES_PER_PAGE as u64 - 1;

/// Number of L2 miss-status-holding registers.
pub const L2_MSHR_COUNT: u32 = 16;

/// Depth of the L2 read queue.
pub const L2_READ_QUEUE_SIZE: u32 = 32;

/// Number of L2 sets.
pub const L2_SET_COUNT: u64 = 256;
