// Interpolation
// Linear interpolation between bracketing exhibit thresholds

use crate::models::ThresholdRecord;
use crate::services::exhibits::ThresholdGrid;

/// True when `threshold` is one of the grid keys. Exact comparison, no tolerance.
pub fn is_standard(grid: &ThresholdGrid, threshold: f64) -> bool {
    grid.contains(threshold)
}

/// The two grid keys bracketing `threshold`; edge pairs beyond the grid.
pub fn neighbors(grid: &ThresholdGrid, threshold: f64) -> (f64, f64) {
    grid.neighbors(threshold)
}

/// Linear interpolation of `y` at `x` on the line through (x0, y0) and (x1, y1).
pub fn interpolate(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 == x0 {
        return y0;
    }
    let ratio = (x - x0) / (x1 - x0);
    y0 + ratio * (y1 - y0)
}

/// Round half away from zero (2.5 -> 3, -2.5 -> -3).
pub fn round_count(value: f64) -> i32 {
    value.round() as i32
}

/// Interpolate every field of two records against the same bracket.
/// Count fields are rounded; percentages and cost stay fractional.
pub fn interpolate_record(
    threshold: f64,
    (x0, x1): (f64, f64),
    lower: &ThresholdRecord,
    upper: &ThresholdRecord,
) -> ThresholdRecord {
    let lerp = |a: f64, b: f64| interpolate(threshold, x0, x1, a, b);
    let count = |a: i32, b: i32| round_count(lerp(a as f64, b as f64));

    ThresholdRecord {
        flagged: count(lower.flagged, upper.flagged),
        flagged_pct: lerp(lower.flagged_pct, upper.flagged_pct),
        cost: lerp(lower.cost, upper.cost),
        false_positives: count(lower.false_positives, upper.false_positives),
        false_negatives: count(lower.false_negatives, upper.false_negatives),
        accuracy: lerp(lower.accuracy, upper.accuracy),
    }
}
