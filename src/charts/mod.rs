//! Chart payload assembly.
//!
//! Turns upstream measurement responses into the JSON documents the
//! rendering layer consumes: gap-aware point sequences, gap intervals for
//! shading, outlier marks, average reference values, and axis hints. All
//! assembly is pure; handlers and the background refresher call into here
//! with data already fetched.

use serde::Serialize;
use utoipa::ToSchema;

use crate::range::DisplayRange;
use crate::series::{
    self, GapInterval, PlotPoint, Sample, detect_gaps, interpolate_at, midpoint_points,
    plot_points, thin,
};
use crate::upstream::models::{
    DurationCurveResponse, FlowHistogramResponse, MeasurementsResponse, parse_timestamp_ms,
};

/// Headroom applied above the tallest value so the line never touches the
/// top of the plot area.
const Y_AXIS_HEADROOM: f64 = 1.2;

/// Plot-ready flow chart data for one meter and display range.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FlowChartPayload {
    /// Range key this payload was shaped for
    pub range: String,
    /// First timestamp in the fetched window (ms since epoch)
    pub start_ms: Option<i64>,
    /// Last timestamp in the fetched window (ms since epoch)
    pub end_ms: Option<i64>,
    /// Raw flow points; rendered without connecting across missing readings
    pub raw: Vec<PlotPoint>,
    /// Smoothed flow points with sentinel breaks inserted at gaps
    pub smoothed: Vec<PlotPoint>,
    /// Outage intervals for shading
    pub gaps: Vec<GapInterval>,
    /// Timestamps flagged as outliers upstream (ms since epoch)
    pub outliers: Vec<i64>,
    /// Precomputed average for the range, when available
    pub average: Option<f64>,
    /// Suggested y-axis maximum covering both series and the average line
    pub suggested_max: Option<f64>,
    /// Number of rows after thinning
    pub point_count: usize,
    /// Whether the series was thinned to fit the range's point budget
    pub thinned: bool,
}

/// Plot-ready flow-duration curve.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DurationCurvePayload {
    /// Curve points: x = exceedance percent, y = flow
    pub points: Vec<PlotPoint>,
    /// Exceedance percentage the reference annotation is evaluated at
    pub reference_percent: f64,
    /// Flow at the reference percentage, interpolated on the curve; absent
    /// when the curve does not cover that percentage
    pub reference_flow: Option<f64>,
}

/// Plot-ready flow distribution histogram, positioned at bin midpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistogramPayload {
    /// Reading counts per bin
    pub count_points: Vec<PlotPoint>,
    /// Share of readings per bin, in percent
    pub percent_points: Vec<PlotPoint>,
}

/// One measurement row kept as a unit so thinning preserves column alignment.
#[derive(Debug, Clone, Copy)]
struct Row {
    x: i64,
    raw: Option<f64>,
    smoothed: Option<f64>,
    outlier: bool,
}

/// Shape a measurements response into the flow chart payload.
///
/// Rows with an unparseable timestamp are dropped. The smoothed series gets
/// sentinel breaks so its filled line is visibly interrupted at outages; the
/// raw series relies on the renderer leaving missing readings disconnected.
#[must_use]
pub fn build_flow_chart(
    measurements: &MeasurementsResponse,
    range: DisplayRange,
    average: Option<f64>,
    gap_threshold_ms: i64,
) -> FlowChartPayload {
    let rows = collect_rows(measurements);

    let start_ms = rows.first().map(|r| r.x);
    let end_ms = rows.last().map(|r| r.x);

    let budget = range.max_points();
    let kept = thin(&rows, budget);
    let thinned = kept.len() < rows.len();

    let raw_samples: Vec<Sample> = kept.iter().map(|r| Sample::new(r.x, r.raw)).collect();
    let smoothed_samples: Vec<Sample> = kept.iter().map(|r| Sample::new(r.x, r.smoothed)).collect();

    let raw = plot_points(&raw_samples, gap_threshold_ms, false);
    let smoothed = plot_points(&smoothed_samples, gap_threshold_ms, true);
    let gaps = detect_gaps(&smoothed_samples, gap_threshold_ms);

    let outliers: Vec<i64> = kept.iter().filter(|r| r.outlier).map(|r| r.x).collect();

    let series_max = raw
        .iter()
        .chain(smoothed.iter())
        .filter(|p| !p.is_break())
        .map(|p| p.y)
        .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |m| m.max(v))));
    let suggested_max = suggested_axis_max(series_max, average);

    FlowChartPayload {
        range: range.key().to_string(),
        start_ms,
        end_ms,
        raw,
        smoothed,
        gaps,
        outliers,
        average,
        point_count: kept.len(),
        thinned,
        suggested_max,
    }
}

/// Shape a duration-curve response, annotating the flow at the configured
/// exceedance percentage via linear interpolation on the curve itself.
#[must_use]
pub fn build_duration_curve(
    response: &DurationCurveResponse,
    reference_percent: f64,
) -> DurationCurvePayload {
    let mut xs = Vec::with_capacity(response.exceedance_percent.len());
    let mut ys = Vec::with_capacity(response.exceedance_percent.len());

    for (pct, flow) in response
        .exceedance_percent
        .iter()
        .zip(response.flow_ls_smoothed.iter())
    {
        if let (Some(pct), Some(flow)) = (series::numeric(pct), series::numeric(flow)) {
            xs.push(pct);
            ys.push(flow);
        }
    }

    let reference_flow = interpolate_at(&xs, &ys, reference_percent);
    let points = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| PlotPoint::new(x, y))
        .collect();

    DurationCurvePayload {
        points,
        reference_percent,
        reference_flow,
    }
}

/// Shape a flow-histogram response into midpoint-positioned bar points.
#[must_use]
pub fn build_histogram(response: &FlowHistogramResponse) -> HistogramPayload {
    let starts: Vec<f64> = response
        .bin_start
        .iter()
        .map(|v| series::numeric(v).unwrap_or(f64::NAN))
        .collect();
    let ends: Vec<Option<f64>> = response.bin_end.iter().map(series::numeric).collect();
    let counts: Vec<f64> = response
        .count
        .iter()
        .map(|v| series::numeric(v).unwrap_or(f64::NAN))
        .collect();
    let percents: Vec<f64> = response
        .percent
        .iter()
        .map(|v| series::numeric(v).unwrap_or(f64::NAN))
        .collect();

    HistogramPayload {
        count_points: midpoint_points(&starts, &ends, &counts),
        percent_points: midpoint_points(&starts, &ends, &percents),
    }
}

fn collect_rows(measurements: &MeasurementsResponse) -> Vec<Row> {
    measurements
        .timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let x = parse_timestamp_ms(ts)?;
            Some(Row {
                x,
                raw: measurements.flow_ls_raw.get(i).and_then(series::numeric),
                smoothed: measurements
                    .flow_ls_smoothed
                    .get(i)
                    .and_then(series::numeric),
                outlier: measurements.is_outlier.get(i).copied().unwrap_or(false),
            })
        })
        .collect()
}

fn suggested_axis_max(series_max: Option<f64>, average: Option<f64>) -> Option<f64> {
    let bounded = match (series_max, average) {
        (Some(m), Some(avg)) => Some(m.max(avg)),
        (Some(m), None) => Some(m),
        (None, Some(avg)) => Some(avg),
        (None, None) => None,
    };
    bounded.map(|m| m * Y_AXIS_HEADROOM)
}
