use serde_json::Value;

/// Coerce a JSON value to a finite number. Upstream arrays mix numbers,
/// numeric strings, and nulls; anything else counts as absent.
#[must_use]
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Parse a precomputed average. The portal stores these as localized strings
/// in places, so a comma decimal separator is accepted.
#[must_use]
pub fn parse_average(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    match value {
        Value::String(s) => {
            let normalized = s.trim().replace(',', ".");
            normalized.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => numeric(value),
    }
}
