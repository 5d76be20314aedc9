// Threshold Selector
// Owns the currently selected threshold: quick-select presets and a stepped slider.

use serde::{Deserialize, Serialize};

use crate::services::config_store::DashboardConfig;
use crate::services::exhibits::{StakeholderProfiles, ThresholdGrid};
use crate::services::metrics::SupportedRange;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    Cfo,
    Balanced,
    Cso,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Cfo, Preset::Balanced, Preset::Cso];

    pub fn from_str(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "cfo" => Some(Self::Cfo),
            "balanced" => Some(Self::Balanced),
            "cso" => Some(Self::Cso),
            _ => None,
        }
    }

    /// Threshold behind the quick-select button, as carried by the dataset's
    /// stakeholder references.
    pub fn threshold(self, profiles: &StakeholderProfiles) -> f64 {
        match self {
            Preset::Cfo => profiles.cfo_preferred_threshold,
            Preset::Balanced => profiles.balanced_threshold,
            Preset::Cso => profiles.cso_preferred_threshold,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::Cfo => "CFO",
            Preset::Balanced => "Balanced",
            Preset::Cso => "CSO",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Preset::Cfo => "Cost-conscious: Lower threshold = lower cost",
            Preset::Balanced => "Middle ground between cost and risk",
            Preset::Cso => "Risk-averse: Higher threshold = fewer missed risks",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetInfo {
    pub preset: Preset,
    pub threshold: f64,
    pub label: String,
    pub help: String,
}

impl PresetInfo {
    pub fn new(preset: Preset, profiles: &StakeholderProfiles) -> Self {
        let threshold = preset.threshold(profiles);
        Self {
            preset,
            threshold,
            label: format!("{} ({:.2})", preset.name(), threshold),
            help: preset.help().to_string(),
        }
    }
}

/// Snap `value` to the nearest multiple of `step`.
///
/// Works in whole steps and divides back, so 0.01 steps yield the same f64 as
/// the decimal literal (50.0 / 100.0 == 0.50) and canonical positions stay
/// exactly comparable with the exhibit keys.
pub fn snap_to_step(value: f64, step: f64) -> f64 {
    let per_unit = (1.0 / step).round();
    if per_unit >= 1.0 && ((1.0 / per_unit) - step).abs() < 1e-12 {
        (value * per_unit).round() / per_unit
    } else {
        (value / step).round() * step
    }
}

/// True when `value` sits on the step grid, up to float noise.
pub fn is_on_step(value: f64, step: f64) -> bool {
    (snap_to_step(value, step) - value).abs() < 1e-9
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PresetThresholds {
    cfo: f64,
    balanced: f64,
    cso: f64,
}

impl From<&StakeholderProfiles> for PresetThresholds {
    fn from(profiles: &StakeholderProfiles) -> Self {
        Self {
            cfo: Preset::Cfo.threshold(profiles),
            balanced: Preset::Balanced.threshold(profiles),
            cso: Preset::Cso.threshold(profiles),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdSelector {
    range: SupportedRange,
    step: f64,
    presets: PresetThresholds,
    current: f64,
}

impl ThresholdSelector {
    pub fn new(
        range: SupportedRange,
        step: f64,
        initial: f64,
        profiles: &StakeholderProfiles,
    ) -> Self {
        let mut selector = Self {
            range,
            step,
            presets: PresetThresholds::from(profiles),
            current: range.min,
        };
        selector.slide_to(initial);
        selector
    }

    pub fn from_config(config: &DashboardConfig, profiles: &StakeholderProfiles) -> Self {
        Self::new(
            config.supported_range,
            config.slider_step,
            config.default_threshold,
            profiles,
        )
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Jump to a preset. Preset values are used as-is so they stay exactly
    /// equal to the dataset keys, clamped only when they fall outside the range.
    pub fn select_preset(&mut self, preset: Preset) -> f64 {
        let value = match preset {
            Preset::Cfo => self.presets.cfo,
            Preset::Balanced => self.presets.balanced,
            Preset::Cso => self.presets.cso,
        };
        self.current = self.range.clamp(value);
        self.current
    }

    /// Move the slider; the value is snapped to the step and clamped to the
    /// outermost step positions inside the range.
    /// Non-finite input leaves the selection unchanged.
    pub fn slide_to(&mut self, value: f64) -> f64 {
        if value.is_finite() {
            let (lo, hi) = self.step_bounds();
            self.current = snap_to_step(value, self.step).clamp(lo, hi);
        }
        self.current
    }

    /// First and last step positions that lie inside the range.
    fn step_bounds(&self) -> (f64, f64) {
        let mut lo = snap_to_step(self.range.min, self.step);
        if lo < self.range.min - 1e-9 {
            lo = snap_to_step(lo + self.step, self.step);
        }
        let mut hi = snap_to_step(self.range.max, self.step);
        if hi > self.range.max + 1e-9 {
            hi = snap_to_step(hi - self.step, self.step);
        }
        if lo > hi {
            (self.range.min, self.range.max)
        } else {
            (lo, hi)
        }
    }

    /// Slider positions from range min to max, inclusive.
    pub fn positions(&self) -> Vec<f64> {
        let start = snap_to_step(self.range.min, self.step);
        let steps = ((self.range.max - start) / self.step + 1e-9).floor() as i64;
        (0..=steps.max(0))
            .map(|i| snap_to_step(start + i as f64 * self.step, self.step))
            .filter(|t| self.range.contains(*t))
            .collect()
    }
}

/// Warning shown when displayed values come from interpolation.
pub fn interpolation_notice(grid: &ThresholdGrid, threshold: f64) -> Option<String> {
    if grid.contains(threshold) {
        return None;
    }
    let keys: Vec<String> = grid.keys().iter().map(|k| format!("{:.2}", k)).collect();
    Some(format!(
        "Interpolated values - threshold {:.2} is not in the standard set ({}). Displayed values are estimated through linear interpolation and do not represent actual model output.",
        threshold,
        keys.join(", ")
    ))
}
