use crate::charts;
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::range::DisplayRange;
use crate::routes::cache;
use crate::routes::stations::{self, STATIONS_CACHE_KEY};
use crate::upstream::models::Station;

/// Range the refresher keeps warm. The dashboard opens on it, and wider
/// ranges change slowly enough that on-demand fetching is fine.
const WARM_RANGE: DisplayRange = DisplayRange::Day;

/// Fetch and re-shape the flow payload for one meter, storing it under the
/// same key the flow endpoint serves from. A result from before the slot's
/// latest invalidation is discarded instead of stored.
///
/// # Errors
///
/// Returns an error if the portal API request fails.
pub async fn refresh_station_flow(state: &AppState, station: &Station) -> AppResult<()> {
    let cache_key = cache::cache_key(
        "flow",
        &[&station.id_misuratore, WARM_RANGE.key(), "json"],
    );
    let generation = state.current_generation(&cache_key);

    let measurements = state
        .upstream
        .get_measurements(&station.id_misuratore, WARM_RANGE)
        .await?;

    let payload = charts::build_flow_chart(
        &measurements,
        WARM_RANGE,
        station.average_for(WARM_RANGE),
        WARM_RANGE.gap_threshold_ms(&state.config),
    );

    let bytes = serde_json::to_vec(&payload).map_err(|e| AppError::Internal(e.to_string()))?;
    cache::store_if_current(state, cache_key, bytes, generation).await;

    Ok(())
}

/// Refresh the station list and the warm-range flow payload for every active
/// meter. Per-station failures are logged and counted; only a failure to
/// fetch the station list itself propagates, so the scheduler can retry it.
///
/// # Errors
///
/// Returns an error if the station list cannot be fetched.
pub async fn refresh_all_charts(state: &AppState) -> AppResult<()> {
    // Invalidate first so the reload fetches fresh statistics and any fetch
    // still in flight for the old list is discarded.
    cache::invalidate(state, STATIONS_CACHE_KEY).await;
    let station_list = stations::load_stations(state).await?;

    let active: Vec<&Station> = station_list.iter().filter(|s| s.is_active).collect();

    let results = futures::future::join_all(
        active
            .iter()
            .map(|station| refresh_station_flow(state, station)),
    )
    .await;

    let mut refreshed = 0;
    let mut failed = 0;
    for (station, result) in active.iter().zip(results) {
        match result {
            Ok(()) => refreshed += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(
                    station = %station.id_misuratore,
                    error = %e,
                    "Chart refresh failed for station"
                );
            }
        }
    }

    tracing::info!(refreshed, failed, "Chart refresh pass completed");
    Ok(())
}
