use crate::series::sample::{GapInterval, PlotPoint, Sample};

/// Find intervals where consecutive valid readings are farther apart than
/// `threshold_ms`. Samples without a finite value are skipped when pairing,
/// so a run of missing readings between two valid ones shows up as a single
/// interval. Fewer than two valid samples yields nothing.
#[must_use]
pub fn detect_gaps(samples: &[Sample], threshold_ms: i64) -> Vec<GapInterval> {
    let mut gaps = Vec::new();
    let mut prev_x: Option<i64> = None;

    for sample in samples {
        if sample.finite_value().is_none() {
            continue;
        }
        if let Some(prev) = prev_x
            && sample.x - prev > threshold_ms
        {
            gaps.push(GapInterval {
                start: prev,
                end: sample.x,
            });
        }
        prev_x = Some(sample.x);
    }

    gaps
}

/// Build the point sequence for a line dataset. Only valid samples become
/// real points; invalid ones are dropped, never substituted with zero.
///
/// With `insert_breaks` set, a midpoint with sentinel y is inserted wherever
/// two consecutive valid points are farther apart than `threshold_ms`,
/// forcing the renderer to break the line there. When unset, the caller's
/// line-draw setting decides whether gaps are spanned.
#[must_use]
pub fn plot_points(samples: &[Sample], threshold_ms: i64, insert_breaks: bool) -> Vec<PlotPoint> {
    let mut points: Vec<PlotPoint> = Vec::with_capacity(samples.len());
    let mut prev_x: Option<i64> = None;

    for sample in samples {
        let Some(value) = sample.finite_value() else {
            continue;
        };
        if insert_breaks
            && let Some(prev) = prev_x
            && sample.x - prev > threshold_ms
        {
            let midpoint = (prev + sample.x) as f64 / 2.0;
            points.push(PlotPoint::gap_break(midpoint));
        }
        points.push(PlotPoint::new(sample.x as f64, value));
        prev_x = Some(sample.x);
    }

    points
}
