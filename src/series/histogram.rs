use crate::series::sample::PlotPoint;

/// Map histogram bins to points at each bin's midpoint, paired with the
/// bin's value. A bin without an upper boundary is positioned at its start.
/// The binning itself happens upstream; this only places the bars on the
/// x axis. Bins with a non-finite start or value are dropped.
#[must_use]
pub fn midpoint_points(starts: &[f64], ends: &[Option<f64>], values: &[f64]) -> Vec<PlotPoint> {
    starts
        .iter()
        .zip(values.iter())
        .enumerate()
        .filter_map(|(i, (&start, &value))| {
            if !start.is_finite() || !value.is_finite() {
                return None;
            }
            let x = match ends.get(i).copied().flatten().filter(|e| e.is_finite()) {
                Some(end) => (start + end) / 2.0,
                None => start,
            };
            Some(PlotPoint::new(x, value))
        })
        .collect()
}
