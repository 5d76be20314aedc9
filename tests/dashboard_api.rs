use screenboard_lib::api::{self, DashboardState};
use screenboard_lib::models::DisparitySeverity;
use screenboard_lib::services::{AppConfig, ConfigStore, Dataset, DashboardConfig, Preset};

#[test]
fn presets_drive_the_dashboard() {
    let state = DashboardState::default();
    let mut selector = state.selector();

    let cfo = state.dashboard(selector.select_preset(Preset::Cfo)).unwrap();
    assert!(cfo.is_standard);
    assert_eq!(cfo.metrics.flagged, 571);
    assert_eq!(cfo.stakeholders.cfo.cost_gap, 0.0);
    assert_eq!(cfo.fairness.severity, DisparitySeverity::Low);

    let cso = state.dashboard(selector.select_preset(Preset::Cso)).unwrap();
    assert_eq!(cso.stakeholders.cso.fn_gap, 0);
    assert_eq!(cso.fairness.rates.get("India"), Some(90.0));
}

#[test]
fn slider_positions_hit_canonical_records_exactly() {
    let state = DashboardState::default();
    let mut selector = state.selector();
    let threshold = selector.slide_to(0.65);
    let view = state.dashboard(threshold).unwrap();
    assert!(view.is_standard);
    assert!(view.notice.is_none());
    assert_eq!(view.metrics.false_positives, 13);
}

#[test]
fn command_surface_validates_thresholds() {
    let state = DashboardState::default();
    assert!(api::get_metrics(&state, 0.76).is_err());
    assert!(api::get_stakeholder_perspectives(&state, f64::INFINITY).is_err());

    let delta = api::get_delta(&state, 0.6, None).unwrap();
    assert!(delta.is_zero());

    let disparity = api::get_disparity(&state, 0.60).unwrap();
    assert!((disparity - 17.4).abs() < 1e-9);

    let rates = api::get_regional_rates(&state, 0.50).unwrap();
    assert_eq!(rates.get("Other"), Some(42.9));
    assert_eq!(api::list_presets(&state).len(), 3);
}

#[test]
fn json_view_uses_camel_case() {
    let state = DashboardState::default();
    let view = api::get_dashboard(&state, 0.58).unwrap();
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["isStandard"], false);
    assert!(json["metrics"]["falsePositives"].is_number());
    assert!(json["stakeholders"]["cfo"]["costGapPct"].is_number());
    assert_eq!(json["stakeholders"]["counsel"]["rates"].as_array().unwrap().len(), 3);
}

#[test]
fn external_dataset_through_config() {
    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("exhibits.json");
    let mut file = Dataset::builtin().to_file();
    file.thresholds[0].record.cost = 5.0;
    std::fs::write(&dataset_path, serde_json::to_string_pretty(&file).unwrap()).unwrap();

    let store = ConfigStore::new(dir.path().join("config"));
    store.save(&AppConfig::default()).unwrap();
    store.set_dataset_path(Some(dataset_path)).unwrap();

    let config = store.load().unwrap();
    let state = DashboardState::from_app_config(&config).unwrap();
    assert_eq!(api::get_metrics(&state, 0.50).unwrap().cost, 5.0);
}

#[test]
fn narrower_supported_range_is_enforced() {
    let mut config = DashboardConfig::default();
    config.supported_range.min = 0.50;
    config.supported_range.max = 0.70;
    let state = DashboardState::new(Dataset::builtin(), config).unwrap();
    assert!(state.dashboard(0.47).is_err());
    assert_eq!(state.sweep().len(), 21);
}
