// Metrics Module
// Threshold lookup and derived comparisons organized into submodules:
// - interpolation: bracketing and linear interpolation primitives
// - engine: exact/interpolated records, regional rates, disparity, deltas
// - stakeholders: per-stakeholder gaps against their reference values
// - fairness: disparity severity bands and small-sample cautions
// - cache: optional bounded memo around get_metrics

pub mod interpolation;
pub mod engine;
pub mod stakeholders;
pub mod fairness;
pub mod cache;

pub use interpolation::{interpolate, interpolate_record, is_standard, neighbors, round_count};
pub use engine::{EngineError, MetricsEngine, SupportedRange, DEFAULT_REFERENCE_THRESHOLD};
pub use stakeholders::{build_perspectives, gap_percentage};
pub use fairness::{classify_disparity, severity_message, summarize_fairness};
pub use cache::{CacheStats, CachedMetrics};
