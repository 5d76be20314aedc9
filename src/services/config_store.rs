// Configuration Storage Service
// Handles config file read/write and version backup

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::services::metrics::SupportedRange;
use crate::services::selector::is_on_step;

const CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// External exhibit file replacing the built-in tables.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            dashboard: DashboardConfig::default(),
            dataset_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    #[serde(default = "default_reference")]
    pub reference_threshold: f64,
    #[serde(default = "default_reference")]
    pub default_threshold: f64,
    #[serde(default)]
    pub supported_range: SupportedRange,
    #[serde(default = "default_slider_step")]
    pub slider_step: f64,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            reference_threshold: 0.60,
            default_threshold: 0.60,
            supported_range: SupportedRange::default(),
            slider_step: 0.01,
            cache_capacity: 64,
        }
    }
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), String> {
        let range = self.supported_range;
        if !(range.min.is_finite() && range.max.is_finite() && range.min < range.max) {
            return Err(format!(
                "Invalid supported range: [{}, {}]",
                range.min, range.max
            ));
        }
        if !(self.slider_step.is_finite() && self.slider_step > 0.0) {
            return Err(format!("Invalid slider step: {}", self.slider_step));
        }
        if !range.contains(self.reference_threshold) {
            return Err(format!(
                "Reference threshold {} outside supported range",
                self.reference_threshold
            ));
        }
        if !range.contains(self.default_threshold) {
            return Err(format!(
                "Default threshold {} outside supported range",
                self.default_threshold
            ));
        }
        if !is_on_step(self.default_threshold, self.slider_step) {
            return Err(format!(
                "Default threshold {} is not a multiple of the slider step {}",
                self.default_threshold, self.slider_step
            ));
        }
        Ok(())
    }
}

fn default_version() -> String { CONFIG_VERSION.to_string() }
fn default_reference() -> f64 { 0.60 }
fn default_slider_step() -> f64 { 0.01 }
fn default_cache_capacity() -> usize { 64 }

pub struct ConfigStore {
    config_dir: PathBuf,
    config_file: PathBuf,
}

impl ConfigStore {
    pub fn new(config_dir: PathBuf) -> Self {
        let config_file = config_dir.join("config.json");
        Self { config_dir, config_file }
    }

    /// Get default config directory
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("screenboard"))
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Ensure config directory exists
    pub fn ensure_dir(&self) -> Result<(), String> {
        fs::create_dir_all(&self.config_dir)
            .map_err(|e| format!("Failed to create config dir: {}", e))
    }

    /// Load configuration from file
    pub fn load(&self) -> Result<AppConfig, String> {
        if !self.config_file.exists() {
            info!(path = %self.config_file.display(), "config.defaults");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_file)
            .map_err(|e| format!("Failed to read config: {}", e))?;

        let config: AppConfig = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        config.dashboard.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, config: &AppConfig) -> Result<(), String> {
        config.dashboard.validate()?;
        self.ensure_dir()?;

        // Create backup if file exists
        if self.config_file.exists() {
            self.create_backup()?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(&self.config_file, content)
            .map_err(|e| format!("Failed to write config: {}", e))?;
        info!(path = %self.config_file.display(), "config.saved");
        Ok(())
    }

    /// Create a backup of current config
    fn create_backup(&self) -> Result<(), String> {
        let backup_dir = self.config_dir.join("backups");
        fs::create_dir_all(&backup_dir)
            .map_err(|e| format!("Failed to create backup dir: {}", e))?;

        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S%3f");
        let backup_file = backup_dir.join(format!("config_{}.json", timestamp));

        fs::copy(&self.config_file, &backup_file)
            .map_err(|e| format!("Failed to create backup: {}", e))?;

        // Keep only last 10 backups
        self.cleanup_old_backups(&backup_dir, 10)?;

        Ok(())
    }

    /// Remove old backups, keeping only the most recent N
    fn cleanup_old_backups(&self, backup_dir: &Path, keep: usize) -> Result<(), String> {
        let mut entries: Vec<_> = fs::read_dir(backup_dir)
            .map_err(|e| format!("Failed to read backup dir: {}", e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .collect();

        if entries.len() <= keep {
            return Ok(());
        }

        // Oldest first; the timestamped names sort chronologically
        entries.sort_by_key(|e| e.file_name());

        for entry in entries.iter().take(entries.len() - keep) {
            if let Err(e) = fs::remove_file(entry.path()) {
                warn!("Failed to remove old config backup {}: {}", entry.path().display(), e);
            }
        }

        Ok(())
    }

    /// Update the reference threshold used for metric deltas
    pub fn set_reference_threshold(&self, threshold: f64) -> Result<(), String> {
        let mut config = self.load()?;
        config.dashboard.reference_threshold = threshold;
        self.save(&config)
    }

    /// Point the dashboard at an external dataset file, or back to the built-in tables
    pub fn set_dataset_path(&self, path: Option<PathBuf>) -> Result<(), String> {
        let mut config = self.load()?;
        config.dataset_path = path;
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.dashboard.reference_threshold, 0.60);
        assert_eq!(config.dashboard.supported_range, SupportedRange { min: 0.45, max: 0.75 });
        assert!(config.dashboard.validate().is_ok());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig = serde_json::from_str(r#"{"dashboard":{"sliderStep":0.05}}"#).unwrap();
        assert_eq!(parsed.version, CONFIG_VERSION);
        assert_eq!(parsed.dashboard.slider_step, 0.05);
        assert_eq!(parsed.dashboard.cache_capacity, 64);
        assert!(parsed.dataset_path.is_none());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let mut config = DashboardConfig::default();
        config.supported_range = SupportedRange { min: 0.8, max: 0.4 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_default_off_step() {
        let mut config = DashboardConfig::default();
        config.default_threshold = 0.605;
        assert!(config.validate().is_err());
        config.default_threshold = 0.61;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("cfg"));
        let config = store.load().unwrap();
        assert_eq!(config.dashboard.default_threshold, 0.60);
    }

    #[test]
    fn test_save_load_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        store.save(&AppConfig::default()).unwrap();
        store.set_reference_threshold(0.55).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.dashboard.reference_threshold, 0.55);

        let backups = fs::read_dir(dir.path().join("backups")).unwrap().count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_save_rejects_reference_outside_range() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().to_path_buf());
        assert!(store.set_reference_threshold(0.95).is_err());
        assert!(!store.config_file().exists());
    }
}
