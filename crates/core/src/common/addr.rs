//! Address Decomposition.
//!
//! This module splits byte addresses into the coordinates every page-based
//! detector works in. It provides the following:
//! 1. **Decomposition:** Byte address to page id, in-page line offset, and cache-line address.
//! 2. **Composition:** Page id and line offset back to a line-aligned byte address.
//! 3. **Page Checks:** Same-page tests used to reject cross-page prefetches.

use super::constants::{LINE_OFFSET_MASK, LINE_SHIFT, PAGE_SHIFT};

/// A byte address decomposed into page and line coordinates.
///
/// With 64-byte lines and 4 KiB pages, `line = addr >> 6`,
/// `page = line >> 6`, and `offset = line & 63`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineAddr {
    /// Page id (address bits above the 4 KiB page boundary).
    pub page: u64,
    /// Line index within the page, in `0..64`.
    pub offset: u8,
    /// Cache-line address (address bits above the 64-byte line boundary).
    pub line: u64,
}

impl LineAddr {
    /// Decomposes a byte address.
    ///
    /// # Arguments
    ///
    /// * `addr` - The raw byte address.
    ///
    /// # Returns
    ///
    /// The page id, in-page line offset, and cache-line address of `addr`.
    #[inline(always)]
    pub const fn decompose(addr: u64) -> Self {
        let line = addr >> LINE_SHIFT;
        Self {
            page: line >> (PAGE_SHIFT - LINE_SHIFT),
            offset: (line & LINE_OFFSET_MASK) as u8,
            line,
        }
    }

    /// Returns the line-aligned byte address of line `offset` in `page`.
    ///
    /// # Arguments
    ///
    /// * `page` - The page id.
    /// * `offset` - The line index within the page (`0..64`).
    #[inline(always)]
    pub const fn compose(page: u64, offset: u8) -> u64 {
        (page << PAGE_SHIFT) + ((offset as u64) << LINE_SHIFT)
    }

    /// Returns the byte address of the start of this line.
    #[inline(always)]
    pub const fn base(&self) -> u64 {
        self.line << LINE_SHIFT
    }
}

/// Returns true when both byte addresses fall in the same 4 KiB page.
#[inline(always)]
pub const fn same_page(a: u64, b: u64) -> bool {
    (a >> PAGE_SHIFT) == (b >> PAGE_SHIFT)
}
