//! Detector Construction Tests.

use pfsim_core::common::error::ConfigError;
use pfsim_core::config::{Config, PrefetcherKind};
use pfsim_core::prefetch::build;
use rstest::rstest;

/// Each `PrefetcherKind` builds the matching detector, already initialized.
#[rstest]
#[case(PrefetcherKind::Ampm, "AMPM Lite Prefetcher")]
#[case(PrefetcherKind::IpStride, "IP-based Stride Prefetcher")]
#[case(PrefetcherKind::Stream, "Streaming Prefetcher")]
fn builds_selected_detector(#[case] kind: PrefetcherKind, #[case] name: &str) {
    let config = Config {
        prefetcher: kind,
        ..Config::default()
    };
    let pf = build(&config).unwrap();
    assert_eq!(pf.name(), name);
    assert_eq!(pf.stats().accesses, 0);
}

/// Validation runs before any detector is built.
#[test]
fn invalid_config_is_rejected() {
    let mut config = Config::default();
    config.stride.tracker_count = 0;
    assert!(matches!(
        build(&config),
        Err(ConfigError::ZeroCapacity { .. })
    ));
}
