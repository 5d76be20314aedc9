// Metrics Engine
// Maps any threshold to an exact or interpolated metrics record plus derived
// comparisons. Stateless: every query reads the shared dataset only.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{MetricsDelta, RegionalRate, RegionalRates, StakeholderPerspectives, ThresholdRecord};
use crate::services::exhibits::Dataset;

use super::interpolation::{interpolate, interpolate_record, is_standard, neighbors};
use super::stakeholders::build_perspectives;

pub const DEFAULT_REFERENCE_THRESHOLD: f64 = 0.60;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("threshold {threshold} is outside the supported range [{min:.2}, {max:.2}]")]
    ThresholdOutOfRange { threshold: f64, min: f64, max: f64 },
}

/// Thresholds the dashboard accepts. Values outside are extrapolated too far
/// from the sampled points to be shown.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportedRange {
    pub min: f64,
    pub max: f64,
}

impl Default for SupportedRange {
    fn default() -> Self {
        Self { min: 0.45, max: 0.75 }
    }
}

impl SupportedRange {
    pub fn contains(&self, threshold: f64) -> bool {
        threshold.is_finite() && self.min <= threshold && threshold <= self.max
    }

    pub fn clamp(&self, threshold: f64) -> f64 {
        threshold.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone)]
pub struct MetricsEngine {
    dataset: Arc<Dataset>,
    range: SupportedRange,
}

impl MetricsEngine {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self {
            dataset,
            range: SupportedRange::default(),
        }
    }

    pub fn with_supported_range(mut self, range: SupportedRange) -> Self {
        self.range = range;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn supported_range(&self) -> SupportedRange {
        self.range
    }

    pub fn is_standard(&self, threshold: f64) -> bool {
        is_standard(self.dataset.grid(), threshold)
    }

    pub fn neighbors(&self, threshold: f64) -> (f64, f64) {
        neighbors(self.dataset.grid(), threshold)
    }

    /// Exact record at a standard threshold, otherwise interpolated (or
    /// extrapolated from the edge pair) with counts rounded half away from zero.
    pub fn get_metrics(&self, threshold: f64) -> ThresholdRecord {
        let grid = self.dataset.grid();
        if let Some(index) = grid.position(threshold) {
            return self.dataset.record(index).clone();
        }

        let (lo, hi) = grid.bracket(threshold);
        let bounds = (grid.keys()[lo], grid.keys()[hi]);
        debug!(threshold, lower = bounds.0, upper = bounds.1, "metrics.interpolate");
        interpolate_record(threshold, bounds, self.dataset.record(lo), self.dataset.record(hi))
    }

    /// Per-region flagging rates on the coarser regional grid.
    pub fn get_regional_rates(&self, threshold: f64) -> RegionalRates {
        let grid = self.dataset.regional_grid();
        let exact = grid.position(threshold);
        let (lo, hi) = grid.bracket(threshold);
        let (x0, x1) = (grid.keys()[lo], grid.keys()[hi]);

        let rates = self
            .dataset
            .regions()
            .iter()
            .map(|region| {
                let rate = match exact {
                    Some(i) => region.rates[i],
                    None => interpolate(threshold, x0, x1, region.rates[lo], region.rates[hi]),
                };
                RegionalRate {
                    region: region.name.clone(),
                    rate,
                    sample_size: region.sample_size,
                }
            })
            .collect();
        RegionalRates(rates)
    }

    /// Spread of regional flagging rates, in percentage points.
    pub fn disparity(&self, threshold: f64) -> f64 {
        self.get_regional_rates(threshold).spread()
    }

    pub fn delta(&self, current: f64, reference: f64) -> MetricsDelta {
        MetricsDelta::between(&self.get_metrics(current), &self.get_metrics(reference))
    }

    pub fn delta_vs_default(&self, current: f64) -> MetricsDelta {
        self.delta(current, DEFAULT_REFERENCE_THRESHOLD)
    }

    pub fn stakeholder_perspectives(&self, threshold: f64) -> StakeholderPerspectives {
        let metrics = self.get_metrics(threshold);
        let rates = self.get_regional_rates(threshold);
        build_perspectives(self.dataset.stakeholders(), &metrics, rates)
    }

    /// Reject thresholds the dashboard does not support instead of
    /// extrapolating without bound.
    pub fn validate(&self, threshold: f64) -> Result<f64, EngineError> {
        if self.range.contains(threshold) {
            Ok(threshold)
        } else {
            warn!(threshold, min = self.range.min, max = self.range.max, "metrics.threshold_rejected");
            Err(EngineError::ThresholdOutOfRange {
                threshold,
                min: self.range.min,
                max: self.range.max,
            })
        }
    }

    pub fn checked_metrics(&self, threshold: f64) -> Result<ThresholdRecord, EngineError> {
        self.validate(threshold).map(|t| self.get_metrics(t))
    }

    pub fn checked_regional_rates(&self, threshold: f64) -> Result<RegionalRates, EngineError> {
        self.validate(threshold).map(|t| self.get_regional_rates(t))
    }

    pub fn checked_delta(&self, current: f64, reference: f64) -> Result<MetricsDelta, EngineError> {
        self.validate(current)?;
        self.validate(reference)?;
        Ok(self.delta(current, reference))
    }

    pub fn checked_perspectives(&self, threshold: f64) -> Result<StakeholderPerspectives, EngineError> {
        self.validate(threshold).map(|t| self.stakeholder_perspectives(t))
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new(Arc::new(Dataset::builtin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn engine() -> MetricsEngine {
        MetricsEngine::default()
    }

    #[test]
    fn test_standard_thresholds_return_stored_records() {
        let engine = engine();
        for (i, t) in [0.50, 0.55, 0.60, 0.65, 0.70].into_iter().enumerate() {
            assert!(engine.is_standard(t));
            assert_eq!(&engine.get_metrics(t), engine.dataset().record(i));
        }
    }

    #[test]
    fn test_threshold_050_scenario() {
        let engine = engine();
        let m = engine.get_metrics(0.50);
        assert_eq!(
            m,
            ThresholdRecord {
                flagged: 571,
                flagged_pct: 57.1,
                cost: 4.6,
                false_positives: 113,
                false_negatives: 159,
                accuracy: 72.6,
            }
        );
        assert!(engine.is_standard(0.50));
    }

    #[test]
    fn test_non_standard_is_not_standard() {
        let engine = engine();
        assert!(!engine.is_standard(0.62));
        assert!(!engine.is_standard(0.5000001));
    }

    #[test]
    fn test_midpoint_rounding() {
        let m = engine().get_metrics(0.625);
        assert_eq!(m.flagged, 914);
        // 46 + 0.5 * (13 - 46) = 29.5, rounded away from zero
        assert_eq!(m.false_positives, 30);
        assert_eq!(m.false_negatives, 189);
        assert!((m.cost - 7.3).abs() < EPS);
        assert!((m.flagged_pct - 91.4).abs() < EPS);
    }

    #[test]
    fn test_interpolated_fields_follow_linear_formula() {
        let engine = engine();
        let (t, x0, x1) = (0.57, 0.55, 0.60);
        let lower = engine.get_metrics(x0);
        let upper = engine.get_metrics(x1);
        let m = engine.get_metrics(t);
        let ratio = (t - x0) / (x1 - x0);

        let between = |v: f64, a: f64, b: f64| v >= a.min(b) - EPS && v <= a.max(b) + EPS;
        assert!(between(m.cost, lower.cost, upper.cost));
        assert!(between(m.accuracy, lower.accuracy, upper.accuracy));
        assert!(between(m.flagged as f64, lower.flagged as f64, upper.flagged as f64));
        assert!(between(m.false_negatives as f64, lower.false_negatives as f64, upper.false_negatives as f64));

        assert!((m.cost - (lower.cost + ratio * (upper.cost - lower.cost))).abs() < EPS);
        assert!((m.flagged_pct - (lower.flagged_pct + ratio * (upper.flagged_pct - lower.flagged_pct))).abs() < EPS);
        let expected_fp = lower.false_positives as f64
            + ratio * (upper.false_positives - lower.false_positives) as f64;
        assert_eq!(m.false_positives, expected_fp.round() as i32);
    }

    #[test]
    fn test_below_range_extrapolates_from_lowest_pair() {
        let engine = engine();
        assert_eq!(engine.neighbors(0.45), (0.50, 0.55));
        let m = engine.get_metrics(0.45);
        assert_eq!(m.flagged, 395);
        assert_eq!(m.false_positives, 161);
        assert!(m.cost < 4.6);
        assert!((m.cost - 3.2).abs() < 1e-6);
    }

    #[test]
    fn test_above_range_extrapolates_from_highest_pair() {
        let engine = engine();
        assert_eq!(engine.neighbors(0.75), (0.65, 0.70));
        let m = engine.get_metrics(0.75);
        assert_eq!(m.flagged, 1021);
        assert_eq!(m.false_negatives, 65);
    }

    #[test]
    fn test_regional_rates_exact_at_070() {
        let rates = engine().get_regional_rates(0.70);
        assert_eq!(rates.get("China"), Some(85.1));
        assert_eq!(rates.get("India"), Some(90.0));
        assert_eq!(rates.get("Other"), Some(92.9));
        assert_eq!(rates.len(), 3);
    }

    #[test]
    fn test_regional_rates_interpolate_on_coarse_grid() {
        let rates = engine().get_regional_rates(0.55);
        let china = rates.get("China").unwrap();
        assert!((china - (49.9 + 67.2) / 2.0).abs() < 1e-6);
        let other = engine().get_regional_rates(0.65).get("Other").unwrap();
        assert!((other - (84.6 + 92.9) / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_regional_rates_extrapolate_past_coarse_grid() {
        let engine = engine();
        let low = engine.get_regional_rates(0.45);
        assert!((low.get("China").unwrap() - 41.25).abs() < 1e-6);
        assert!((low.get("India").unwrap() - 43.4).abs() < 1e-6);
        assert!((low.get("Other").unwrap() - 22.05).abs() < 1e-6);

        let high = engine.get_regional_rates(0.75);
        assert!((high.get("China").unwrap() - 94.05).abs() < 1e-6);
        assert!((high.get("India").unwrap() - 100.85).abs() < 1e-6);
        assert!((high.get("Other").unwrap() - 97.05).abs() < 1e-6);

        let disparity = engine.disparity(0.45);
        assert!((disparity - 21.35).abs() < 1e-6);
        assert_eq!(
            crate::services::metrics::classify_disparity(disparity),
            crate::models::DisparitySeverity::High
        );
    }

    #[test]
    fn test_disparity_at_060() {
        assert!((engine().disparity(0.60) - 17.4).abs() < EPS);
    }

    #[test]
    fn test_delta_against_itself_is_zero() {
        let engine = engine();
        for t in [0.45, 0.5, 0.58, 0.6, 0.625, 0.7, 0.75] {
            assert!(engine.delta(t, t).is_zero(), "delta at {t} not zero");
        }
    }

    #[test]
    fn test_delta_vs_reference() {
        let d = engine().delta_vs_default(0.50);
        assert_eq!(d.flagged, 571 - 861);
        assert_eq!(d.false_positives, 113 - 46);
        assert_eq!(d.false_negatives, 159 - 205);
        assert!((d.cost - (4.6 - 6.9)).abs() < EPS);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let engine = engine();
        assert_eq!(engine.validate(0.45), Ok(0.45));
        assert_eq!(engine.validate(0.75), Ok(0.75));
        assert!(matches!(
            engine.checked_metrics(0.80),
            Err(EngineError::ThresholdOutOfRange { .. })
        ));
        assert!(engine.checked_metrics(f64::NAN).is_err());
        assert!(engine.checked_delta(0.6, 0.2).is_err());
    }
}
