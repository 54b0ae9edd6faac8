use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::range::DisplayRange;
use crate::series;

/// A flow meter as listed by the portal backend, including the precomputed
/// per-range averages used for the dashed reference line. Averages arrive as
/// numbers or localized strings depending on the portal's export path, so
/// they stay raw JSON until parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id_misuratore: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub avg_24h: Option<Value>,
    #[serde(default)]
    pub avg_7d: Option<Value>,
    #[serde(default)]
    pub avg_30d: Option<Value>,
    #[serde(default)]
    pub avg_180d: Option<Value>,
    #[serde(default)]
    pub avg_360d: Option<Value>,
    #[serde(default)]
    pub avg_all_time: Option<Value>,
}

fn default_active() -> bool {
    true
}

impl Station {
    /// Parsed average for the given display range, absent when the portal
    /// has not computed one or the stored value is malformed.
    #[must_use]
    pub fn average_for(&self, range: DisplayRange) -> Option<f64> {
        let raw = match range {
            DisplayRange::Day => &self.avg_24h,
            DisplayRange::Week => &self.avg_7d,
            DisplayRange::Month => &self.avg_30d,
            DisplayRange::SixMonths => &self.avg_180d,
            DisplayRange::Year => &self.avg_360d,
            DisplayRange::All => &self.avg_all_time,
        };
        series::parse_average(raw.as_ref())
    }
}

/// Response from `/measurements/`: parallel arrays ordered by timestamp
/// ascending. Value arrays stay raw JSON so non-numeric entries can be
/// treated as absent instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeasurementsResponse {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub flow_ls_raw: Vec<Value>,
    #[serde(default)]
    pub flow_ls_smoothed: Vec<Value>,
    #[serde(default)]
    pub is_outlier: Vec<bool>,
}

/// Response from `/duration-curve/`: daily mean flow sorted by exceedance
/// percentage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DurationCurveResponse {
    #[serde(default)]
    pub exceedance_percent: Vec<Value>,
    #[serde(default)]
    pub flow_ls_smoothed: Vec<Value>,
}

/// Response from `/flow-histogram/`: parallel bin boundary and value arrays.
/// The final bin may be open-ended (`bin_end` null).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowHistogramResponse {
    #[serde(default)]
    pub bin_start: Vec<Value>,
    #[serde(default)]
    pub bin_end: Vec<Value>,
    #[serde(default)]
    pub count: Vec<Value>,
    #[serde(default)]
    pub percent: Vec<Value>,
}

/// Parse an upstream ISO-8601 timestamp into milliseconds since epoch.
/// The portal emits both offset-carrying timestamps and naive ones (taken
/// as UTC); anything unparseable counts as absent.
#[must_use]
pub fn parse_timestamp_ms(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp_millis())
}
