use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::range::DisplayRange;
use crate::routes::cache;
use crate::upstream::models::Station;

pub const STATIONS_CACHE_KEY: &str = "stations";

/// A flow meter with its parsed per-range averages.
#[derive(Debug, Serialize, ToSchema)]
pub struct StationResponse {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    /// Precomputed average flow per range key, absent where the portal has
    /// no statistics for the range
    pub averages: AveragesResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AveragesResponse {
    #[serde(rename = "24h")]
    pub h24: Option<f64>,
    #[serde(rename = "7d")]
    pub d7: Option<f64>,
    #[serde(rename = "1m")]
    pub m1: Option<f64>,
    #[serde(rename = "6m")]
    pub m6: Option<f64>,
    #[serde(rename = "1y")]
    pub y1: Option<f64>,
    pub all: Option<f64>,
}

/// Load the station list, serving from cache when fresh.
///
/// The list is stored through the same generation-tracked cache as chart
/// payloads so an in-flight fetch cannot clobber a newer invalidation.
pub async fn load_stations(state: &AppState) -> AppResult<Vec<Station>> {
    if let Some(cached) = cache::get_cached(state, STATIONS_CACHE_KEY).await
        && let Ok(stations) = serde_json::from_slice::<Vec<Station>>(&cached)
    {
        return Ok(stations);
    }

    let generation = state.current_generation(STATIONS_CACHE_KEY);
    let stations = state.upstream.get_stations().await?;

    let bytes = serde_json::to_vec(&stations).map_err(|e| AppError::Internal(e.to_string()))?;
    cache::store_if_current(state, STATIONS_CACHE_KEY.to_string(), bytes, generation).await;

    Ok(stations)
}

/// Resolve a station by meter id, or by name (case-insensitive).
pub async fn resolve_station(state: &AppState, id_or_name: &str) -> AppResult<Station> {
    let stations = load_stations(state).await?;

    stations
        .iter()
        .find(|s| s.id_misuratore == id_or_name)
        .or_else(|| {
            stations
                .iter()
                .find(|s| s.name.eq_ignore_ascii_case(id_or_name))
        })
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Station '{id_or_name}' not found")))
}

/// List all flow meters
///
/// Returns every meter known to the portal backend with its precomputed
/// per-range average flow, parsed and ready for the reference line.
#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = 200, description = "Stations retrieved successfully", body = Vec<StationResponse>),
        (status = 502, description = "Portal backend unavailable"),
    ),
    tag = "stations"
)]
pub async fn list_stations(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<StationResponse>>> {
    let stations = load_stations(&state).await?;

    let response: Vec<StationResponse> = stations
        .iter()
        .map(|s| StationResponse {
            id: s.id_misuratore.clone(),
            name: s.name.clone(),
            location: s.location.clone(),
            latitude: s.latitude,
            longitude: s.longitude,
            is_active: s.is_active,
            averages: AveragesResponse {
                h24: s.average_for(DisplayRange::Day),
                d7: s.average_for(DisplayRange::Week),
                m1: s.average_for(DisplayRange::Month),
                m6: s.average_for(DisplayRange::SixMonths),
                y1: s.average_for(DisplayRange::Year),
                all: s.average_for(DisplayRange::All),
            },
        })
        .collect();

    Ok(Json(response))
}
