//! Unit tests for payload caching and fetch generation tracking.
//!
//! Run with: cargo test --test cache_unit_test

use hydro_portal::common::AppState;
use hydro_portal::config::{Config, Deployment};
use hydro_portal::routes::cache;
use hydro_portal::upstream::PortalClient;

fn test_state() -> AppState {
    let config = Config {
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
    };
    let upstream = PortalClient::new(&config);
    AppState::new(config, upstream)
}

#[test]
fn cache_key_builds_correctly() {
    // Basic key building
    assert_eq!(cache::cache_key("flow", &[]), "flow");
    assert_eq!(
        cache::cache_key("flow", &["MIS01", "24h", "json"]),
        "flow:MIS01:24h:json"
    );

    // Empty components preserved (ensures query uniqueness)
    assert_ne!(
        cache::cache_key("flow", &["MIS01", "", "json"]),
        cache::cache_key("flow", &["MIS01", "json"])
    );
}

#[tokio::test]
async fn stored_payloads_are_served_back() {
    let state = test_state();
    let key = cache::cache_key("flow", &["MIS01", "24h", "json"]);

    assert!(cache::get_cached(&state, &key).await.is_none());

    let generation = state.current_generation(&key);
    let stored = cache::store_if_current(&state, key.clone(), b"{}".to_vec(), generation).await;
    assert!(stored);

    let cached = cache::get_cached(&state, &key).await.unwrap();
    assert_eq!(&**cached, b"{}");
}

#[tokio::test]
async fn stale_fetch_results_are_discarded() {
    let state = test_state();
    let key = "flow:MIS01:24h:json".to_string();

    // A fetch starts, capturing the current generation...
    let generation = state.current_generation(&key);

    // ...then the slot is invalidated while the fetch is in flight
    cache::invalidate(&state, &key).await;

    let stored = cache::store_if_current(&state, key.clone(), b"old".to_vec(), generation).await;
    assert!(!stored);
    assert!(cache::get_cached(&state, &key).await.is_none());

    // A fetch started after the invalidation stores fine
    let generation = state.current_generation(&key);
    assert!(cache::store_if_current(&state, key.clone(), b"new".to_vec(), generation).await);
    let cached = cache::get_cached(&state, &key).await.unwrap();
    assert_eq!(&**cached, b"new");
}

#[tokio::test]
async fn invalidation_advances_the_generation() {
    let state = test_state();
    let key = "stations";

    assert_eq!(state.current_generation(key), 0);
    cache::invalidate(&state, key).await;
    assert_eq!(state.current_generation(key), 1);
    cache::invalidate(&state, key).await;
    assert_eq!(state.current_generation(key), 2);
}

#[tokio::test]
async fn entries_from_before_an_invalidation_read_as_stale() {
    let state = test_state();
    let key = "histogram:MIS01".to_string();

    let generation = state.current_generation(&key);
    cache::store_if_current(&state, key.clone(), b"payload".to_vec(), generation).await;

    // Bumping the generation directly leaves the entry in the cache but it
    // must no longer be served
    state.bump_generation(&key);
    assert!(cache::get_cached(&state, &key).await.is_none());
}
