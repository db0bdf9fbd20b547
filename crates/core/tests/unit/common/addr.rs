//! Address Decomposition Tests.
//!
//! Verifies the page / line-offset / line-address split for 64-byte lines
//! and 4 KiB pages, and the inverse composition used to build targets.

use pfsim_core::common::addr::{LineAddr, same_page};
use pfsim_core::common::constants::{CACHE_LINE_SIZE, LINES_PER_PAGE, PAGE_SIZE};

/// 64-byte lines, 4 KiB pages, 64 lines per page.
#[test]
fn geometry_constants() {
    assert_eq!(CACHE_LINE_SIZE, 64);
    assert_eq!(PAGE_SIZE, 4096);
    assert_eq!(LINES_PER_PAGE, 64);
}

/// Page, offset and line come from the expected address bits.
#[test]
fn decompose_splits_page_offset_and_line() {
    let a = LineAddr::decompose(0x1234_5678);
    assert_eq!(a.line, 0x1234_5678 >> 6);
    assert_eq!(a.page, 0x1234_5678 >> 12);
    assert_eq!(a.offset, ((0x1234_5678u64 >> 6) & 63) as u8);
}

/// Every byte of a line decomposes identically.
#[test]
fn bytes_within_a_line_share_coordinates() {
    let first = LineAddr::decompose(0x8000_0040);
    let last = LineAddr::decompose(0x8000_007F);
    assert_eq!(first, last);
    assert_eq!(first.offset, 1);
}

/// Offsets 0 and 63 sit on the page edges.
#[test]
fn page_edges() {
    assert_eq!(LineAddr::decompose(0x2000).offset, 0);
    assert_eq!(LineAddr::decompose(0x2FFF).offset, 63);
    assert_eq!(LineAddr::decompose(0x3000).page, 3);
}

/// Composing the coordinates yields the line base.
#[test]
fn compose_inverts_decompose_for_line_aligned_addresses() {
    let a = LineAddr::decompose(0xdead_b000 + 37 * 64 + 5);
    assert_eq!(LineAddr::compose(a.page, a.offset), 0xdead_b000 + 37 * 64);
    assert_eq!(a.base(), 0xdead_b000 + 37 * 64);
}

/// Same-page checks split exactly at 4 KiB.
#[test]
fn same_page_boundaries() {
    assert!(same_page(0x4000, 0x4FFF));
    assert!(!same_page(0x4FFF, 0x5000));
    assert!(!same_page(0x4000, 0x3FFF));
}
