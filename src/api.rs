// Dashboard API
// Command surface used by the front end. Every command takes the selected
// threshold by value; the state only holds immutable tables and the memo.

use std::sync::Arc;
use tracing::info;

use crate::models::{
    DashboardView, MetricsDelta, RegionalRates, StakeholderPerspectives, SweepRow, ThresholdRecord,
};
use crate::services::charts::{cost_risk_chart, geographic_chart};
use crate::services::config_store::{AppConfig, DashboardConfig};
use crate::services::exhibits::Dataset;
use crate::services::metrics::{summarize_fairness, CachedMetrics, MetricsEngine};
use crate::services::selector::{interpolation_notice, Preset, PresetInfo, ThresholdSelector};

pub struct DashboardState {
    config: DashboardConfig,
    metrics: CachedMetrics,
}

impl DashboardState {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Result<Self, String> {
        config.validate()?;
        let engine = MetricsEngine::new(Arc::new(dataset)).with_supported_range(config.supported_range);
        let metrics = CachedMetrics::new(engine, config.cache_capacity);
        Ok(Self { config, metrics })
    }

    /// Build from app config, loading the external dataset when one is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, String> {
        let dataset = match &config.dataset_path {
            Some(path) => {
                info!(path = %path.display(), "dataset.load");
                Dataset::load(path).map_err(|e| e.to_string())?
            }
            None => Dataset::builtin(),
        };
        Self::new(dataset, config.dashboard.clone())
    }

    pub fn engine(&self) -> &MetricsEngine {
        self.metrics.engine()
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &CachedMetrics {
        &self.metrics
    }

    pub fn selector(&self) -> ThresholdSelector {
        ThresholdSelector::from_config(&self.config, self.engine().dataset().stakeholders())
    }

    pub fn dashboard(&self, threshold: f64) -> Result<DashboardView, String> {
        self.dashboard_with_reference(threshold, self.config.reference_threshold)
    }

    pub fn dashboard_with_reference(&self, threshold: f64, reference: f64) -> Result<DashboardView, String> {
        let engine = self.engine();
        engine.validate(threshold).map_err(|e| e.to_string())?;
        engine.validate(reference).map_err(|e| e.to_string())?;

        let metrics = self.metrics.get_metrics(threshold);
        let delta = MetricsDelta::between(&metrics, &self.metrics.get_metrics(reference));
        let rates = engine.get_regional_rates(threshold);

        Ok(DashboardView {
            threshold,
            reference_threshold: reference,
            total_suppliers: engine.dataset().total_suppliers(),
            is_standard: engine.is_standard(threshold),
            notice: interpolation_notice(engine.dataset().grid(), threshold),
            stakeholders: engine.stakeholder_perspectives(threshold),
            fairness: summarize_fairness(rates),
            cost_risk_chart: cost_risk_chart(engine, threshold),
            geographic_chart: geographic_chart(engine, threshold),
            metrics,
            delta,
        })
    }

    /// Metrics at every slider position across the supported range.
    pub fn sweep(&self) -> Vec<SweepRow> {
        let engine = self.engine();
        self.selector()
            .positions()
            .into_iter()
            .map(|threshold| SweepRow {
                threshold,
                is_standard: engine.is_standard(threshold),
                metrics: self.metrics.get_metrics(threshold),
                disparity: engine.disparity(threshold),
            })
            .collect()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            config: DashboardConfig::default(),
            metrics: CachedMetrics::new(MetricsEngine::default(), DashboardConfig::default().cache_capacity),
        }
    }
}

pub fn get_dashboard(state: &DashboardState, threshold: f64) -> Result<DashboardView, String> {
    state.dashboard(threshold)
}

pub fn get_metrics(state: &DashboardState, threshold: f64) -> Result<ThresholdRecord, String> {
    state.engine().validate(threshold).map_err(|e| e.to_string())?;
    Ok(state.cache().get_metrics(threshold))
}

pub fn get_regional_rates(state: &DashboardState, threshold: f64) -> Result<RegionalRates, String> {
    state.engine().checked_regional_rates(threshold).map_err(|e| e.to_string())
}

pub fn get_disparity(state: &DashboardState, threshold: f64) -> Result<f64, String> {
    get_regional_rates(state, threshold).map(|rates| rates.spread())
}

pub fn get_delta(state: &DashboardState, current: f64, reference: Option<f64>) -> Result<MetricsDelta, String> {
    let reference = reference.unwrap_or(state.config().reference_threshold);
    state.engine().checked_delta(current, reference).map_err(|e| e.to_string())
}

pub fn get_stakeholder_perspectives(
    state: &DashboardState,
    threshold: f64,
) -> Result<StakeholderPerspectives, String> {
    state.engine().checked_perspectives(threshold).map_err(|e| e.to_string())
}

pub fn list_presets(state: &DashboardState) -> Vec<PresetInfo> {
    let profiles = state.engine().dataset().stakeholders();
    Preset::ALL
        .into_iter()
        .map(|preset| PresetInfo::new(preset, profiles))
        .collect()
}

pub fn sweep_thresholds(state: &DashboardState) -> Vec<SweepRow> {
    state.sweep()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_view_at_interpolated_threshold() {
        let state = DashboardState::default();
        let view = state.dashboard(0.625).unwrap();
        assert!(!view.is_standard);
        assert!(view.notice.is_some());
        assert_eq!(view.metrics.false_positives, 30);
        assert_eq!(view.delta.flagged, 914 - 861);
        assert!(view.cost_risk_chart.selection.is_some());
    }

    #[test]
    fn test_out_of_range_is_reported() {
        let state = DashboardState::default();
        let err = state.dashboard(0.9).unwrap_err();
        assert!(err.contains("outside the supported range"));
        assert!(get_metrics(&state, -0.1).is_err());
    }

    #[test]
    fn test_sweep_uses_cache() {
        let state = DashboardState::default();
        let rows = state.sweep();
        assert_eq!(rows.len(), 31);
        assert_eq!(rows.iter().filter(|r| r.is_standard).count(), 5);
        let _ = state.sweep();
        assert_eq!(state.cache().stats().hits, 31);
    }

    #[test]
    fn test_presets_match_stakeholder_cards() {
        let mut file = Dataset::builtin().to_file();
        file.stakeholders.cfo_preferred_threshold = 0.55;
        file.stakeholders.balanced_threshold = 0.65;
        let dataset = file.into_dataset().unwrap();
        let state = DashboardState::new(dataset, DashboardConfig::default()).unwrap();

        let presets = list_presets(&state);
        assert_eq!(presets[0].threshold, 0.55);
        assert_eq!(presets[1].threshold, 0.65);

        let cfo = state.selector().select_preset(Preset::Cfo);
        let view = state.dashboard(cfo).unwrap();
        assert_eq!(view.stakeholders.cfo.preferred_threshold, cfo);
        assert!(view.is_standard);
        assert_eq!(view.metrics.flagged, 747);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DashboardConfig::default();
        config.slider_step = 0.0;
        assert!(DashboardState::new(Dataset::builtin(), config).is_err());
    }
}
