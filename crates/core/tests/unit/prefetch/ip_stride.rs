//! IP-stride Tests.
//!
//! Verifies tracker allocation, stride confirmation, page-bounded
//! prediction, negative strides, zero strides, and LRU replacement.

use pfsim_core::config::StrideConfig;
use pfsim_core::prefetch::ip_stride::{IpEntry, IpStridePrefetcher, IpStrideTable};
use pfsim_core::prefetch::table::Lookup;
use pfsim_core::prefetch::Prefetcher;
use proptest::prelude::*;

use crate::common::access;
use crate::common::mocks::host::RecordingHost;

const IP: u64 = 0x40_1000;
const A: u64 = 0x10_0000;

// ══════════════════════════════════════════════════════════
// 1. Tracker table
// ══════════════════════════════════════════════════════════

/// First sighting of an IP only records its address.
#[test]
fn first_sighting_records_without_predicting() {
    let mut t = IpStrideTable::new(4, 3);
    let obs = t.observe(IP, A, 1);
    assert_eq!(obs.lookup, Lookup::Filled);
    assert!(obs.targets.is_empty());
    assert_eq!(
        t.get(IP),
        Some(&IpEntry {
            last_addr: A,
            last_stride: 0
        })
    );
}

/// A, A+8, A+16 predicts the next three strides.
#[test]
fn repeated_stride_predicts_degree_ahead() {
    let mut t = IpStrideTable::new(4, 3);
    assert!(t.observe(IP, A, 1).targets.is_empty());
    assert!(t.observe(IP, A + 8, 2).targets.is_empty());
    assert_eq!(t.observe(IP, A + 16, 3).targets, vec![A + 24, A + 32, A + 40]);
    assert_eq!(t.get(IP).unwrap().last_stride, 8);
}

/// A new stride must repeat before it predicts.
#[test]
fn changed_stride_retrains() {
    let mut t = IpStrideTable::new(4, 3);
    t.observe(IP, A, 1);
    t.observe(IP, A + 64, 2);
    assert!(t.observe(IP, A + 192, 3).targets.is_empty());
    assert_eq!(t.get(IP).unwrap().last_stride, 128);
    assert_eq!(t.observe(IP, A + 320, 4).targets, vec![A + 448, A + 576, A + 704]);
}

/// Negative strides predict lower addresses.
#[test]
fn negative_stride_predicts_downwards() {
    let start = A + 0x800;
    let mut t = IpStrideTable::new(4, 2);
    t.observe(IP, start, 1);
    t.observe(IP, start - 64, 2);
    assert_eq!(
        t.observe(IP, start - 128, 3).targets,
        vec![start - 192, start - 256]
    );
}

/// A repeated address keeps the learned stride.
#[test]
fn zero_stride_keeps_history() {
    let mut t = IpStrideTable::new(4, 3);
    t.observe(IP, A, 1);
    t.observe(IP, A + 8, 2);
    assert!(t.observe(IP, A + 8, 3).targets.is_empty());
    assert_eq!(t.get(IP).unwrap().last_stride, 8);
    assert_eq!(t.last_touch(IP), Some(3));
    assert_eq!(t.observe(IP, A + 16, 4).targets, vec![A + 24, A + 32, A + 40]);
}

/// Predictions are cut at the first target outside the page.
#[test]
fn predictions_stop_at_page_boundary() {
    // Page ends at A + 0x1000; only A + 0xFC0 fits.
    let mut t = IpStrideTable::new(4, 3);
    t.observe(IP, A + 0xF00, 1);
    t.observe(IP, A + 0xF40, 2);
    assert_eq!(t.observe(IP, A + 0xF80, 3).targets, vec![A + 0xFC0]);
}

/// Strides wider than a page never predict.
#[test]
fn stride_larger_than_page_predicts_nothing() {
    let mut t = IpStrideTable::new(4, 3);
    t.observe(IP, A, 1);
    t.observe(IP, A + 0x2000, 2);
    assert!(t.observe(IP, A + 0x4000, 3).targets.is_empty());
}

/// Interleaved IPs keep separate histories.
#[test]
fn ips_train_independently() {
    let mut t = IpStrideTable::new(4, 1);
    t.observe(1, A, 1);
    t.observe(2, A + 0x100, 2);
    t.observe(1, A + 8, 3);
    t.observe(2, A + 0x140, 4);
    assert_eq!(t.observe(1, A + 16, 5).targets, vec![A + 24]);
    assert_eq!(t.observe(2, A + 0x180, 6).targets, vec![A + 0x1C0]);
}

/// The least recently seen IP is evicted.
#[test]
fn lru_tracker_is_replaced() {
    let mut t = IpStrideTable::new(2, 3);
    t.observe(1, A, 1);
    t.observe(2, A, 2);
    t.observe(1, A + 8, 3);
    let obs = t.observe(3, A, 4);
    assert_eq!(obs.lookup, Lookup::Replaced(2));
    assert!(t.get(2).is_none());
    assert_eq!(t.len(), 2);
}

/// IP 0 is tracked like any other.
#[test]
fn ip_zero_is_a_real_key() {
    let mut t = IpStrideTable::new(2, 1);
    assert_eq!(t.observe(0, 0, 1).lookup, Lookup::Filled);
    assert_eq!(t.observe(0, 64, 2).lookup, Lookup::Hit);
}

// ══════════════════════════════════════════════════════════
// 2. Detector
// ══════════════════════════════════════════════════════════

/// The detector issues every confirmed target against the demand base.
#[test]
fn detector_issues_confirmed_strides() {
    let mut pf = IpStridePrefetcher::new(&StrideConfig::default());
    pf.initialize();
    let mut host = RecordingHost::default();

    access(&mut pf, &mut host, A, IP);
    access(&mut pf, &mut host, A + 64, IP);
    assert!(host.issued.is_empty());

    access(&mut pf, &mut host, A + 128, IP);
    assert_eq!(host.targets(), vec![A + 192, A + 256, A + 320]);
    assert!(host.issued.iter().all(|i| i.base == A + 128));
    assert_eq!(pf.stats().issued_l2, 3);
}

/// Tracker replacement feeds the `evictions` counter.
#[test]
fn detector_counts_tracker_evictions() {
    let config = StrideConfig {
        tracker_count: 1,
        ..StrideConfig::default()
    };
    let mut pf = IpStridePrefetcher::new(&config);
    let mut host = RecordingHost::default();
    access(&mut pf, &mut host, A, 1);
    access(&mut pf, &mut host, A, 2);
    access(&mut pf, &mut host, A, 1);
    assert_eq!(pf.stats().evictions, 2);
}

/// `initialize` forgets every IP.
#[test]
fn initialize_clears_trackers() {
    let mut pf = IpStridePrefetcher::new(&StrideConfig::default());
    let mut host = RecordingHost::default();
    access(&mut pf, &mut host, A, IP);
    pf.initialize();
    assert!(pf.table().is_empty());
    assert_eq!(pf.stats().accesses, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Invariants
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn targets_share_the_demand_page(
        walk in proptest::collection::vec((0u64..4, -300i64..300), 1..200),
    ) {
        let mut t = IpStrideTable::new(8, 3);
        let mut addr = 0x8000_0000u64;
        for (now, (ip, delta)) in walk.into_iter().enumerate() {
            addr = addr.wrapping_add_signed(delta);
            let obs = t.observe(ip, addr, now as u64);
            prop_assert!(obs.targets.len() <= 3);
            for target in obs.targets {
                prop_assert_eq!(target >> 12, addr >> 12);
                prop_assert_ne!(target, addr);
            }
        }
    }
}
