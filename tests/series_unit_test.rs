//! Unit tests for the series gap and sampling processor.
//!
//! Run with: cargo test --test series_unit_test

use hydro_portal::series::{
    Sample, detect_gaps, interpolate_at, midpoint_points, numeric, parse_average, plot_points,
    stride_step, thin,
};
use serde_json::json;

fn samples(pairs: &[(i64, f64)]) -> Vec<Sample> {
    pairs.iter().map(|&(x, y)| Sample::new(x, Some(y))).collect()
}

#[test]
fn gap_detection_finds_intervals_over_threshold() {
    let input = samples(&[(0, 10.0), (100, 20.0), (400, 30.0)]);
    let gaps = detect_gaps(&input, 150);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start, 100);
    assert_eq!(gaps[0].end, 400);
}

#[test]
fn gap_detection_returns_nothing_when_spacing_is_within_threshold() {
    let input = samples(&[(0, 1.0), (100, 2.0), (200, 3.0), (300, 4.0)]);
    assert!(detect_gaps(&input, 100).is_empty());
}

#[test]
fn gap_detection_needs_two_valid_samples() {
    assert!(detect_gaps(&[], 100).is_empty());
    assert!(detect_gaps(&samples(&[(0, 1.0)]), 100).is_empty());

    // A single valid sample surrounded by missing readings is not enough
    let sparse = vec![
        Sample::new(0, None),
        Sample::new(100, Some(5.0)),
        Sample::new(200, None),
    ];
    assert!(detect_gaps(&sparse, 10).is_empty());
}

#[test]
fn gap_detection_skips_invalid_samples_when_pairing() {
    // The missing reading at x=100 must not split the 0..400 gap in two
    let input = vec![
        Sample::new(0, Some(1.0)),
        Sample::new(100, None),
        Sample::new(200, Some(f64::NAN)),
        Sample::new(400, Some(2.0)),
    ];
    let gaps = detect_gaps(&input, 150);
    assert_eq!(gaps.len(), 1);
    assert_eq!(gaps[0].start, 0);
    assert_eq!(gaps[0].end, 400);
}

#[test]
fn point_builder_inserts_sentinel_break_at_gap_midpoint() {
    let input = samples(&[(0, 10.0), (100, 20.0), (400, 30.0)]);
    let points = plot_points(&input, 150, true);

    assert_eq!(points.len(), 4);
    assert_eq!(points[1].x, 100.0);
    assert!(points[2].is_break());
    assert_eq!(points[2].x, 250.0);
    assert_eq!(points[3].x, 400.0);
    assert_eq!(points[3].y, 30.0);
}

#[test]
fn point_builder_without_flag_emits_only_real_points() {
    let input = samples(&[(0, 10.0), (100, 20.0), (400, 30.0)]);
    let points = plot_points(&input, 150, false);

    assert_eq!(points.len(), 3);
    assert!(points.iter().all(|p| !p.is_break()));
}

#[test]
fn point_builder_drops_invalid_samples_instead_of_zeroing() {
    let input = vec![
        Sample::new(0, Some(1.0)),
        Sample::new(50, None),
        Sample::new(100, Some(f64::INFINITY)),
        Sample::new(150, Some(2.0)),
    ];
    let points = plot_points(&input, 1_000, true);

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].y, 1.0);
    assert_eq!(points[1].y, 2.0);
    assert!(points.iter().all(|p| p.y != 0.0));
}

#[test]
fn interpolation_returns_exact_value_on_tie() {
    let xs = [0.0, 100.0, 400.0];
    let ys = [10.0, 20.0, 30.0];
    assert_eq!(interpolate_at(&xs, &ys, 100.0), Some(20.0));
}

#[test]
fn interpolation_blends_linearly_between_neighbors() {
    let xs = [0.0, 100.0, 400.0];
    let ys = [10.0, 20.0, 30.0];

    let y = interpolate_at(&xs, &ys, 50.0).unwrap();
    assert!((y - 15.0).abs() < 1e-9);

    let y = interpolate_at(&xs, &ys, 250.0).unwrap();
    assert!((y - 25.0).abs() < 1e-9);
}

#[test]
fn interpolation_outside_domain_yields_none() {
    let xs = [0.0, 100.0, 400.0];
    let ys = [10.0, 20.0, 30.0];

    assert_eq!(interpolate_at(&xs, &ys, 500.0), None);
    assert_eq!(interpolate_at(&xs, &ys, -1.0), None);
    assert_eq!(interpolate_at(&[], &[], 10.0), None);
    assert_eq!(interpolate_at(&xs, &ys, f64::NAN), None);
}

#[test]
fn interpolation_skips_non_finite_pairs() {
    let xs = [0.0, 50.0, 100.0];
    let ys = [10.0, f64::NAN, 20.0];

    // The NaN pair must not act as a bracket; interpolate across it
    let y = interpolate_at(&xs, &ys, 50.0).unwrap();
    assert!((y - 15.0).abs() < 1e-9);
}

#[test]
fn histogram_points_sit_at_bin_midpoints() {
    let starts = [0.0, 2.0];
    let ends = [Some(2.0), Some(4.0)];
    let values = [5.0, 3.0];

    let points = midpoint_points(&starts, &ends, &values);
    assert_eq!(points.len(), 2);
    assert_eq!((points[0].x, points[0].y), (1.0, 5.0));
    assert_eq!((points[1].x, points[1].y), (3.0, 3.0));
}

#[test]
fn histogram_open_ended_bin_sits_at_its_start() {
    let points = midpoint_points(&[10.0], &[None], &[7.0]);
    assert_eq!(points.len(), 1);
    assert_eq!((points[0].x, points[0].y), (10.0, 7.0));
}

#[test]
fn histogram_drops_malformed_bins() {
    let starts = [f64::NAN, 2.0];
    let ends = [Some(2.0), Some(4.0)];
    let values = [5.0, f64::NAN];
    assert!(midpoint_points(&starts, &ends, &values).is_empty());
}

#[test]
fn thinning_keeps_every_nth_row() {
    let rows: Vec<i32> = (0..10).collect();

    let kept = thin(&rows, Some(5));
    assert_eq!(kept, vec![0, 2, 4, 6, 8]);

    // No budget or a budget that fits keeps everything
    assert_eq!(thin(&rows, None).len(), 10);
    assert_eq!(thin(&rows, Some(10)).len(), 10);
    assert_eq!(thin(&rows, Some(100)).len(), 10);
}

#[test]
fn thinning_stride_matches_integer_division() {
    assert_eq!(stride_step(25_000, Some(10_000)), 2);
    assert_eq!(stride_step(10_001, Some(10_000)), 1);
    assert_eq!(stride_step(0, Some(10)), 1);
    assert_eq!(stride_step(100, None), 1);
}

#[test]
fn numeric_coercion_treats_malformed_values_as_absent() {
    assert_eq!(numeric(&json!(3.5)), Some(3.5));
    assert_eq!(numeric(&json!("42.5")), Some(42.5));
    assert_eq!(numeric(&json!(" 7 ")), Some(7.0));
    assert_eq!(numeric(&json!(null)), None);
    assert_eq!(numeric(&json!(true)), None);
    assert_eq!(numeric(&json!("n/a")), None);
    assert_eq!(numeric(&json!("NaN")), None);
}

#[test]
fn average_parsing_accepts_comma_decimal_separator() {
    assert_eq!(parse_average(Some(&json!("12,5"))), Some(12.5));
    assert_eq!(parse_average(Some(&json!("12.5"))), Some(12.5));
    assert_eq!(parse_average(Some(&json!(12.5))), Some(12.5));
    assert_eq!(parse_average(Some(&json!(""))), None);
    assert_eq!(parse_average(Some(&json!(null))), None);
    assert_eq!(parse_average(None), None);
}
