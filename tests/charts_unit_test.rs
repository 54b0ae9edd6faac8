//! Unit tests for chart payload assembly.
//!
//! Run with: cargo test --test charts_unit_test

use hydro_portal::charts::{build_duration_curve, build_flow_chart, build_histogram};
use hydro_portal::range::DisplayRange;
use hydro_portal::upstream::models::{
    DurationCurveResponse, FlowHistogramResponse, MeasurementsResponse, parse_timestamp_ms,
};
use serde_json::json;

const MINUTE_MS: i64 = 60_000;

fn measurements() -> MeasurementsResponse {
    // Readings every 10 minutes, one hour-long outage before the last two
    MeasurementsResponse {
        timestamps: vec![
            "2026-03-01T00:00:00+00:00".to_string(),
            "2026-03-01T00:10:00+00:00".to_string(),
            "2026-03-01T00:20:00+00:00".to_string(),
            "2026-03-01T01:20:00+00:00".to_string(),
            "2026-03-01T01:30:00+00:00".to_string(),
        ],
        flow_ls_raw: vec![json!(10.0), json!(12.0), json!(null), json!(14.0), json!(16.0)],
        flow_ls_smoothed: vec![json!(10.5), json!(11.5), json!(12.5), json!(13.5), json!(14.5)],
        is_outlier: vec![false, false, false, true, false],
    }
}

#[test]
fn timestamp_parsing_handles_offsets_and_naive_forms() {
    assert_eq!(
        parse_timestamp_ms("1970-01-01T00:00:01+00:00"),
        Some(1_000)
    );
    assert_eq!(parse_timestamp_ms("1970-01-01T00:00:01"), Some(1_000));
    assert_eq!(
        parse_timestamp_ms("1970-01-01T01:00:00+01:00"),
        Some(0)
    );
    assert_eq!(parse_timestamp_ms("not a date"), None);
}

#[test]
fn flow_chart_breaks_smoothed_line_at_the_outage() {
    let payload = build_flow_chart(&measurements(), DisplayRange::Day, None, 15 * MINUTE_MS);

    // 5 real points plus one sentinel between 00:20 and 01:20
    assert_eq!(payload.smoothed.len(), 6);
    let breaks: Vec<_> = payload.smoothed.iter().filter(|p| p.is_break()).collect();
    assert_eq!(breaks.len(), 1);

    let t0 = parse_timestamp_ms("2026-03-01T00:20:00+00:00").unwrap();
    let t1 = parse_timestamp_ms("2026-03-01T01:20:00+00:00").unwrap();
    assert_eq!(breaks[0].x, (t0 + t1) as f64 / 2.0);

    assert_eq!(payload.gaps.len(), 1);
    assert_eq!(payload.gaps[0].start, t0);
    assert_eq!(payload.gaps[0].end, t1);
}

#[test]
fn flow_chart_raw_series_drops_missing_readings_without_sentinels() {
    let payload = build_flow_chart(&measurements(), DisplayRange::Day, None, 15 * MINUTE_MS);

    // 4 finite raw readings; the null is dropped, not zeroed or broken
    assert_eq!(payload.raw.len(), 4);
    assert!(payload.raw.iter().all(|p| !p.is_break()));
    assert!(payload.raw.iter().all(|p| p.y != 0.0));
}

#[test]
fn flow_chart_reports_window_outliers_and_axis_hint() {
    let payload =
        build_flow_chart(&measurements(), DisplayRange::Day, Some(20.0), 15 * MINUTE_MS);

    assert_eq!(
        payload.start_ms,
        parse_timestamp_ms("2026-03-01T00:00:00+00:00")
    );
    assert_eq!(
        payload.end_ms,
        parse_timestamp_ms("2026-03-01T01:30:00+00:00")
    );

    assert_eq!(payload.outliers.len(), 1);
    assert_eq!(
        payload.outliers[0],
        parse_timestamp_ms("2026-03-01T01:20:00+00:00").unwrap()
    );

    // Average (20) exceeds the series max (16), so it bounds the axis
    let suggested = payload.suggested_max.unwrap();
    assert!((suggested - 24.0).abs() < 1e-9);

    assert_eq!(payload.average, Some(20.0));
    assert_eq!(payload.point_count, 5);
    assert!(!payload.thinned);
}

#[test]
fn flow_chart_axis_hint_follows_series_when_no_average() {
    let payload = build_flow_chart(&measurements(), DisplayRange::Day, None, 15 * MINUTE_MS);
    let suggested = payload.suggested_max.unwrap();
    assert!((suggested - 16.0 * 1.2).abs() < 1e-9);
}

#[test]
fn flow_chart_empty_response_produces_empty_payload() {
    let payload = build_flow_chart(
        &MeasurementsResponse::default(),
        DisplayRange::Day,
        None,
        15 * MINUTE_MS,
    );

    assert!(payload.raw.is_empty());
    assert!(payload.smoothed.is_empty());
    assert!(payload.gaps.is_empty());
    assert_eq!(payload.start_ms, None);
    assert_eq!(payload.suggested_max, None);
}

#[test]
fn flow_chart_thins_series_over_the_range_budget() {
    let n = 25_000;
    let base = "2026-01-01T00:00:00+00:00";
    let start = parse_timestamp_ms(base).unwrap();

    let response = MeasurementsResponse {
        timestamps: (0..n)
            .map(|i| {
                chrono::DateTime::<chrono::Utc>::from_timestamp_millis(start + i * MINUTE_MS)
                    .unwrap()
                    .to_rfc3339()
            })
            .collect(),
        flow_ls_raw: (0..n).map(|i| json!(i as f64)).collect(),
        flow_ls_smoothed: (0..n).map(|i| json!(i as f64)).collect(),
        is_outlier: vec![false; n as usize],
    };

    let payload = build_flow_chart(&response, DisplayRange::Week, None, 15 * MINUTE_MS);

    assert!(payload.thinned);
    assert_eq!(payload.point_count, 12_500); // stride 2
    // The window label still spans the full fetched series
    assert_eq!(payload.start_ms, Some(start));
    assert_eq!(payload.end_ms, Some(start + (n - 1) * MINUTE_MS));
}

#[test]
fn duration_curve_interpolates_reference_flow() {
    let response = DurationCurveResponse {
        exceedance_percent: vec![json!(0.0), json!(50.0), json!(100.0)],
        flow_ls_smoothed: vec![json!(80.0), json!(40.0), json!(10.0)],
    };

    let payload = build_duration_curve(&response, 75.0);
    assert_eq!(payload.points.len(), 3);
    assert_eq!(payload.reference_percent, 75.0);
    let flow = payload.reference_flow.unwrap();
    assert!((flow - 25.0).abs() < 1e-9);

    // Exact hit returns the stored value
    let payload = build_duration_curve(&response, 50.0);
    assert_eq!(payload.reference_flow, Some(40.0));
}

#[test]
fn duration_curve_reference_outside_domain_is_absent() {
    let response = DurationCurveResponse {
        exceedance_percent: vec![json!(10.0), json!(90.0)],
        flow_ls_smoothed: vec![json!(50.0), json!(5.0)],
    };

    let payload = build_duration_curve(&response, 95.0);
    assert_eq!(payload.reference_flow, None);

    let empty = build_duration_curve(&DurationCurveResponse::default(), 95.0);
    assert!(empty.points.is_empty());
    assert_eq!(empty.reference_flow, None);
}

#[test]
fn duration_curve_drops_malformed_pairs() {
    let response = DurationCurveResponse {
        exceedance_percent: vec![json!(0.0), json!("bad"), json!(100.0)],
        flow_ls_smoothed: vec![json!(80.0), json!(40.0), json!(null)],
    };

    let payload = build_duration_curve(&response, 50.0);
    assert_eq!(payload.points.len(), 1);
    assert_eq!((payload.points[0].x, payload.points[0].y), (0.0, 80.0));
}

#[test]
fn histogram_payload_maps_counts_and_percentages() {
    let response = FlowHistogramResponse {
        bin_start: vec![json!(0.0), json!(2.0)],
        bin_end: vec![json!(2.0), json!(4.0)],
        count: vec![json!(5), json!(3)],
        percent: vec![json!(62.5), json!(37.5)],
    };

    let payload = build_histogram(&response);
    assert_eq!(payload.count_points.len(), 2);
    assert_eq!(
        (payload.count_points[0].x, payload.count_points[0].y),
        (1.0, 5.0)
    );
    assert_eq!(
        (payload.count_points[1].x, payload.count_points[1].y),
        (3.0, 3.0)
    );
    assert_eq!(
        (payload.percent_points[0].x, payload.percent_points[0].y),
        (1.0, 62.5)
    );
}
