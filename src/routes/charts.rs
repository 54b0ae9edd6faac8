use axum::{
    extract::{Path, Query, State},
    http::{
        StatusCode,
        header::{self, HeaderMap, HeaderValue},
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_stream::wrappers::ReceiverStream;
use utoipa::IntoParams;

use crate::charts::{self, DurationCurvePayload, FlowChartPayload, HistogramPayload};
use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::range::DisplayRange;
use crate::routes::cache;
use crate::routes::stations::resolve_station;

/// Global semaphore limiting concurrent bulk (CSV) requests.
/// Configurable via BULK_CONCURRENT_LIMIT env var (default: 5).
static BULK_SEMAPHORE: std::sync::LazyLock<Arc<Semaphore>> = std::sync::LazyLock::new(|| {
    let limit = std::env::var("BULK_CONCURRENT_LIMIT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5);
    Arc::new(Semaphore::new(limit))
});

fn default_range() -> String {
    "24h".to_string()
}

fn default_format() -> String {
    "json".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct FlowQuery {
    /// Display range key: 24h (default), 7d, 1m, 6m, 1y, all
    #[serde(default = "default_range")]
    pub range: String,
    /// Response format: json (default) or csv
    #[serde(default = "default_format")]
    pub format: String,
}

fn parse_range(key: &str) -> AppResult<DisplayRange> {
    DisplayRange::from_key(key).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid range: {key}. Must be one of: 24h, 7d, 1m, 6m, 1y, all"
        ))
    })
}

fn determine_format(query_format: &str, headers: &HeaderMap) -> String {
    // Query parameter takes precedence
    if query_format != "json" {
        return query_format.to_lowercase();
    }

    if let Some(accept) = headers.get(header::ACCEPT)
        && let Ok(accept_str) = accept.to_str()
        && accept_str.contains("text/csv")
    {
        return "csv".to_string();
    }

    "json".to_string()
}

fn build_csv_response(payload: &FlowChartPayload) -> AppResult<Response> {
    // Merge the two point sequences back into rows keyed by timestamp,
    // dropping sentinel break points.
    let mut rows: BTreeMap<i64, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for point in payload.raw.iter().filter(|p| !p.is_break()) {
        rows.entry(point.x as i64).or_default().0 = Some(point.y);
    }
    for point in payload.smoothed.iter().filter(|p| !p.is_break()) {
        rows.entry(point.x as i64).or_default().1 = Some(point.y);
    }

    let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, std::io::Error>>(100);

    tokio::spawn(async move {
        let _ = tx.send(Ok("time,flow_raw,flow_smoothed\n".to_string())).await;

        for (ts, (raw, smoothed)) in rows {
            let time = DateTime::<Utc>::from_timestamp_millis(ts)
                .map(|t| t.to_rfc3339())
                .unwrap_or_default();
            let mut row = time;
            row.push(',');
            if let Some(v) = raw {
                row.push_str(&v.to_string());
            }
            row.push(',');
            if let Some(v) = smoothed {
                row.push_str(&v.to_string());
            }
            row.push('\n');
            if tx.send(Ok(row)).await.is_err() {
                break;
            }
        }
    });

    let stream = ReceiverStream::new(rx);
    let body = axum::body::Body::from_stream(stream);

    Response::builder()
        .header(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"))
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Get the flow chart for a station
///
/// Returns plot-ready raw and smoothed flow series for the selected display
/// range: gap-aware point sequences, outage intervals for shading, outlier
/// marks, the precomputed average, and a suggested y-axis maximum.
/// Supports JSON and CSV formats.
#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/flow",
    params(
        ("station_id" = String, Path, description = "Meter id or station name"),
        FlowQuery
    ),
    responses(
        (status = 200, description = "Flow chart data", body = FlowChartPayload),
        (status = 400, description = "Invalid range"),
        (status = 404, description = "Station not found"),
        (status = 502, description = "Portal backend unavailable"),
    ),
    tag = "charts"
)]
pub async fn get_station_flow(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
    Query(query): Query<FlowQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let range = parse_range(&query.range)?;
    let station = resolve_station(&state, &station_id).await?;
    let format = determine_format(&query.format, &headers);

    let cache_key = cache::cache_key("flow", &[&station.id_misuratore, range.key(), &format]);

    if format == "json"
        && let Some(cached) = cache::get_cached(&state, &cache_key).await
    {
        return cache::json_response((*cached).to_vec(), true);
    }

    // CSV walks the full shaped series; cap how many run at once
    let _permit = if format == "csv" {
        match BULK_SEMAPHORE.clone().try_acquire_owned() {
            Ok(permit) => Some(permit),
            Err(_) => {
                tracing::warn!(
                    format = %format,
                    status = StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                    "bulk_request_rejected"
                );
                return Err(AppError::ServiceUnavailable(
                    "Too many concurrent bulk requests. Please try again later.".to_string(),
                ));
            }
        }
    } else {
        None
    };

    let generation = state.current_generation(&cache_key);
    let measurements = state
        .upstream
        .get_measurements(&station.id_misuratore, range)
        .await?;

    let payload = charts::build_flow_chart(
        &measurements,
        range,
        station.average_for(range),
        range.gap_threshold_ms(&state.config),
    );

    match format.as_str() {
        "csv" => build_csv_response(&payload),
        _ => cache::cache_and_respond(&state, cache_key, &payload, generation).await,
    }
}

/// Get the flow-duration curve for a station
///
/// Returns the daily-mean flow sorted by exceedance percentage, plus the
/// flow interpolated at the configured reference percentage.
#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/duration-curve",
    params(
        ("station_id" = String, Path, description = "Meter id or station name"),
    ),
    responses(
        (status = 200, description = "Duration curve data", body = DurationCurvePayload),
        (status = 404, description = "Station not found"),
        (status = 502, description = "Portal backend unavailable"),
    ),
    tag = "charts"
)]
pub async fn get_station_duration_curve(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> AppResult<Response> {
    let station = resolve_station(&state, &station_id).await?;

    let cache_key = cache::cache_key("duration-curve", &[&station.id_misuratore]);

    if let Some(cached) = cache::get_cached(&state, &cache_key).await {
        return cache::json_response((*cached).to_vec(), true);
    }

    let generation = state.current_generation(&cache_key);
    let curve = state
        .upstream
        .get_duration_curve(&station.id_misuratore)
        .await?;

    let payload =
        charts::build_duration_curve(&curve, state.config.reference_exceedance_percent);

    cache::cache_and_respond(&state, cache_key, &payload, generation).await
}

/// Get the flow distribution histogram for a station
///
/// Returns bar points positioned at each bin's midpoint, as counts and as
/// percent of readings.
#[utoipa::path(
    get,
    path = "/api/stations/{station_id}/histogram",
    params(
        ("station_id" = String, Path, description = "Meter id or station name"),
    ),
    responses(
        (status = 200, description = "Histogram data", body = HistogramPayload),
        (status = 404, description = "Station not found"),
        (status = 502, description = "Portal backend unavailable"),
    ),
    tag = "charts"
)]
pub async fn get_station_histogram(
    State(state): State<AppState>,
    Path(station_id): Path<String>,
) -> AppResult<Response> {
    let station = resolve_station(&state, &station_id).await?;

    let cache_key = cache::cache_key("histogram", &[&station.id_misuratore]);

    if let Some(cached) = cache::get_cached(&state, &cache_key).await {
        return cache::json_response((*cached).to_vec(), true);
    }

    let generation = state.current_generation(&cache_key);
    let histogram = state
        .upstream
        .get_flow_histogram(&station.id_misuratore)
        .await?;

    let payload = charts::build_histogram(&histogram);

    cache::cache_and_respond(&state, cache_key, &payload, generation).await
}
