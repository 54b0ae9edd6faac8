use serde::Serialize;
use utoipa::ToSchema;

/// A single reading: timestamp in milliseconds since epoch, value absent when
/// the sensor reported nothing usable. Input sequences are ordered by `x`
/// ascending; the invariant is assumed, not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: i64,
    pub y: Option<f64>,
}

impl Sample {
    #[must_use]
    pub fn new(x: i64, y: Option<f64>) -> Self {
        Self { x, y }
    }

    /// A sample counts only when its value is present and finite.
    #[must_use]
    pub fn finite_value(&self) -> Option<f64> {
        self.y.filter(|v| v.is_finite())
    }
}

/// Interval between two consecutive valid readings that are farther apart
/// than the threshold in effect. Rendered as shaded outage bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct GapInterval {
    /// Timestamp of the last reading before the outage (ms since epoch)
    pub start: i64,
    /// Timestamp of the first reading after the outage (ms since epoch)
    pub end: i64,
}

/// A point positioned for the rendering layer. `y` may be NaN as a sentinel
/// break; serde_json emits NaN as `null`, which line renderers treat as a
/// disconnected segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Sentinel point forcing a visual break in a connected line.
    #[must_use]
    pub fn gap_break(x: f64) -> Self {
        Self { x, y: f64::NAN }
    }

    #[must_use]
    pub fn is_break(&self) -> bool {
        self.y.is_nan()
    }
}
