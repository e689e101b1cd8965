//! Sentinel-aware numeric coercion of raw tabular values.
//!
//! The wage dataset withholds small-sample statistics with `*`, `**` or `#`
//! and leaves unknown cells empty. All of these become 0.

use occupation_indexer_shared::TabularValue;

/// Suppression markers used by the wage dataset.
pub const SUPPRESSION_MARKERS: [&str; 3] = ["*", "**", "#"];

fn parse_number(value: &TabularValue) -> Option<f64> {
    let number = match value {
        TabularValue::Empty => return None,
        TabularValue::Number(n) => *n,
        TabularValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() || SUPPRESSION_MARKERS.contains(&text) {
                return None;
            }
            text.replace(',', "").parse::<f64>().ok()?
        }
    };
    number.is_finite().then_some(number)
}

/// Convert to a float, 0.0 for missing, suppressed or unparseable values.
pub fn coerce_f64(value: &TabularValue) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Convert to an integer, truncating fractions; 0 for missing, suppressed or
/// unparseable values.
pub fn coerce_i64(value: &TabularValue) -> i64 {
    parse_number(value).map(|n| n.trunc() as i64).unwrap_or(0)
}
