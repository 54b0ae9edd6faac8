//! Response caching for shaped chart payloads.
//!
//! Payloads are cached after shaping, keyed by request parameters, and
//! expire via TTL. On top of the TTL, every key carries a fetch generation
//! (see `AppState::current_generation`): a handler or refresher records the
//! generation before its upstream fetch and stores the result only if the
//! slot has not been invalidated in the meantime. A slow fetch for a range
//! the operator already refreshed can therefore never overwrite newer data.
//!
//! # Usage
//!
//! ```text
//! let cache_key = cache::cache_key("flow", &[&station_id, range.key()]);
//!
//! if let Some(cached) = cache::get_cached(&state, &cache_key).await {
//!     return cache::json_response((*cached).to_vec(), true);
//! }
//!
//! let generation = state.current_generation(&cache_key);
//! // ... fetch upstream, shape payload ...
//! cache::cache_and_respond(&state, cache_key, &payload, generation).await
//! ```

use axum::{
    http::{HeaderValue, header},
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

use crate::common::{AppState, CachedPayload};
use crate::error::{AppError, AppResult};

/// Build a cache key from a prefix and components.
///
/// Components are joined with `:` separator. Empty components are included
/// to ensure different queries produce different keys.
#[must_use]
pub fn cache_key(prefix: &str, components: &[&str]) -> String {
    let mut key = prefix.to_string();
    for c in components {
        key.push(':');
        key.push_str(c);
    }
    key
}

/// Try to get a cached payload. Entries stored by a fetch that was
/// invalidated mid-flight are skipped as stale.
pub async fn get_cached(state: &AppState, cache_key: &str) -> Option<Arc<Vec<u8>>> {
    let cached = state.payload_cache.get(cache_key).await?;

    if cached.generation < state.current_generation(cache_key) {
        tracing::debug!(cache_key = %cache_key, "cache_stale");
        state.payload_cache.invalidate(cache_key).await;
        return None;
    }

    tracing::debug!(cache_key = %cache_key, "cache_hit");
    Some(cached.data.clone())
}

/// Store a payload, unless the slot was invalidated after `generation` was
/// captured. Returns whether the entry was stored.
pub async fn store_if_current(
    state: &AppState,
    cache_key: String,
    data: Vec<u8>,
    generation: u64,
) -> bool {
    let current = state.current_generation(&cache_key);
    if generation < current {
        tracing::debug!(
            cache_key = %cache_key,
            generation,
            current,
            "cache_store_discarded"
        );
        return false;
    }

    let size = data.len();
    state
        .payload_cache
        .insert(
            cache_key.clone(),
            CachedPayload {
                data: Arc::new(data),
                generation,
            },
        )
        .await;

    tracing::debug!(cache_key = %cache_key, size_bytes = size, generation, "cache_stored");
    true
}

/// Build a JSON response with an X-Cache header indicating hit/miss status.
pub fn json_response(data: Vec<u8>, cache_hit: bool) -> AppResult<Response> {
    let cache_header = if cache_hit { "HIT" } else { "MISS" };
    Response::builder()
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .header("X-Cache", HeaderValue::from_static(cache_header))
        .body(axum::body::Body::from(data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Serialize a payload, store it (stale fetches are discarded), and return
/// it with `X-Cache: MISS`.
pub async fn cache_and_respond<T: Serialize>(
    state: &AppState,
    cache_key: String,
    payload: &T,
    generation: u64,
) -> AppResult<Response> {
    let json_bytes = serde_json::to_vec(payload).map_err(|e| AppError::Internal(e.to_string()))?;

    store_if_current(state, cache_key, json_bytes.clone(), generation).await;

    json_response(json_bytes, false)
}

/// Manually invalidate a cache entry and advance its generation so in-flight
/// fetches for the old data are discarded too.
pub async fn invalidate(state: &AppState, cache_key: &str) {
    state.bump_generation(cache_key);
    state.payload_cache.invalidate(cache_key).await;
    tracing::debug!(cache_key = %cache_key, "cache_invalidated");
}
