//! Unit tests for display range handling.
//!
//! Run with: cargo test --test range_unit_test

use hydro_portal::config::{Config, Deployment};
use hydro_portal::range::DisplayRange;

fn test_config() -> Config {
    Config {
        upstream_base_url: "http://localhost:8000/portale/api".to_string(),
        upstream_api_key: None,
        upstream_skip_tls_verify: false,
        refresh_interval_seconds: 300,
        refresh_retry_max: 3,
        refresh_retry_delay_seconds: 60,
        gap_threshold_fine_seconds: 900,
        gap_threshold_coarse_seconds: 21_600,
        reference_exceedance_percent: 95.0,
        api_host: "127.0.0.1".to_string(),
        api_port: 3000,
        disable_rate_limiting: true,
        rate_limit_metadata_per_second: 1,
        rate_limit_metadata_burst: 60,
        rate_limit_data_per_second: 10,
        rate_limit_data_burst: 60,
        bulk_concurrent_limit: 5,
        cache_ttl_seconds: 300,
        cache_max_bytes: 1024 * 1024,
        deployment: Deployment::Local,
    }
}

#[test]
fn range_keys_round_trip() {
    for range in DisplayRange::ALL {
        assert_eq!(DisplayRange::from_key(range.key()), Some(range));
    }
    assert_eq!(DisplayRange::from_key("2w"), None);
    assert_eq!(DisplayRange::from_key(""), None);
    assert_eq!(DisplayRange::from_key("24H"), None);
}

#[test]
fn point_budgets_match_range_granularity() {
    assert_eq!(DisplayRange::Day.max_points(), None);
    assert_eq!(DisplayRange::Week.max_points(), Some(10_000));
    assert_eq!(DisplayRange::Month.max_points(), Some(10_000));
    assert_eq!(DisplayRange::SixMonths.max_points(), Some(10_000));
    assert_eq!(DisplayRange::Year.max_points(), Some(10_000));
    assert_eq!(DisplayRange::All.max_points(), Some(20_000));
}

#[test]
fn fine_ranges_use_short_gap_threshold() {
    let config = test_config();

    assert!(DisplayRange::Day.is_fine());
    assert!(DisplayRange::Week.is_fine());
    assert!(!DisplayRange::Year.is_fine());

    assert_eq!(DisplayRange::Day.gap_threshold_ms(&config), 900 * 1000);
    assert_eq!(
        DisplayRange::All.gap_threshold_ms(&config),
        21_600 * 1000
    );
}
