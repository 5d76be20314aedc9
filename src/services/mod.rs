// Screenboard Core Services
// Exhibit tables, metrics engine and the presentation helpers built on it

pub mod exhibits;
pub mod config_store;
pub mod metrics;
pub mod selector;
pub mod charts;
pub mod report;

pub use exhibits::{Dataset, DatasetError, ThresholdGrid};
pub use config_store::*;
pub use selector::{interpolation_notice, Preset, PresetInfo, ThresholdSelector};

// Re-export metrics module functions
pub use metrics::{
    classify_disparity,
    summarize_fairness,
    CachedMetrics,
    EngineError,
    MetricsEngine,
    SupportedRange,
    DEFAULT_REFERENCE_THRESHOLD,
};
