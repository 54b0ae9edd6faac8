/// Stride for thinning `len` rows down to at most roughly `budget`.
/// Returns 1 (keep everything) when the budget is absent or not exceeded.
#[must_use]
pub fn stride_step(len: usize, budget: Option<usize>) -> usize {
    match budget {
        Some(max_points) if max_points > 0 && len > max_points => (len / max_points).max(1),
        _ => 1,
    }
}

/// Keep every n-th row so the series fits the range's point budget. Rows are
/// thinned as whole units so parallel columns stay aligned. The first row is
/// always kept.
#[must_use]
pub fn thin<T: Clone>(rows: &[T], budget: Option<usize>) -> Vec<T> {
    let step = stride_step(rows.len(), budget);
    if step <= 1 {
        return rows.to_vec();
    }
    rows.iter().step_by(step).cloned().collect()
}
