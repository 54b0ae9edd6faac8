/// Linearly interpolate `ys` at `target`, scanning the parallel `xs`/`ys`
/// arrays once. An exact x match returns the stored y without interpolation.
/// Pairs with a non-finite x or y are skipped. Returns `None` when the target
/// lies outside the covered x-range or no valid bracketing pair exists;
/// values are never extrapolated.
#[must_use]
pub fn interpolate_at(xs: &[f64], ys: &[f64], target: f64) -> Option<f64> {
    if !target.is_finite() {
        return None;
    }

    let mut below: Option<(f64, f64)> = None;

    for (&x, &y) in xs.iter().zip(ys.iter()) {
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        if x == target {
            return Some(y);
        }
        if x < target {
            below = Some((x, y));
        } else {
            // First valid point above the target: interpolate against the
            // last one below it, if any.
            let (x0, y0) = below?;
            return Some(y0 + (y - y0) * (target - x0) / (x - x0));
        }
    }

    None
}
