// Exhibit Dataset
// Threshold scenario table, regional flagging rates and stakeholder references

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{StakeholderIdentity, ThresholdRecord};

/// Sample sizes below this are too small to read regional rates with confidence.
pub const SMALL_SAMPLE_LIMIT: u32 = 30;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{table} needs at least 2 thresholds, found {found}")]
    TooFewThresholds { table: &'static str, found: usize },
    #[error("{table} thresholds must be finite and strictly increasing")]
    UnorderedThresholds { table: &'static str },
    #[error("expected {expected} threshold records, found {found}")]
    RecordCountMismatch { expected: usize, found: usize },
    #[error("region {region} has {found} rates for {expected} thresholds")]
    RateCountMismatch {
        region: String,
        expected: usize,
        found: usize,
    },
    #[error("disparity needs at least 2 regions, found {0}")]
    TooFewRegions(usize),
    #[error("{table} threshold {value} is outside [0, 1]")]
    ThresholdOutOfDomain { table: &'static str, value: f64 },
    #[error("{field} at threshold {threshold} must be finite")]
    NonFiniteValue { field: String, threshold: f64 },
    #[error("{flagged} flagged suppliers at threshold {threshold} exceeds the total of {total}")]
    FlaggedExceedsTotal { threshold: f64, flagged: i32, total: u32 },
    #[error("region {0} appears more than once")]
    DuplicateRegion(String),
}

/// Sorted set of thresholds that carry real model output.
///
/// Construction guarantees at least two finite, strictly increasing keys, so
/// bracketing is always well defined.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdGrid {
    keys: Vec<f64>,
}

impl ThresholdGrid {
    pub fn new(table: &'static str, keys: Vec<f64>) -> Result<Self, DatasetError> {
        if keys.len() < 2 {
            return Err(DatasetError::TooFewThresholds {
                table,
                found: keys.len(),
            });
        }
        let ordered = keys.iter().all(|k| k.is_finite()) && keys.windows(2).all(|w| w[0] < w[1]);
        if !ordered {
            return Err(DatasetError::UnorderedThresholds { table });
        }
        if let Some(value) = keys.iter().copied().find(|k| !(0.0..=1.0).contains(k)) {
            return Err(DatasetError::ThresholdOutOfDomain { table, value });
        }
        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    /// Index of a key equal to `threshold`. Exact comparison, no tolerance.
    pub fn position(&self, threshold: f64) -> Option<usize> {
        self.keys.iter().position(|k| *k == threshold)
    }

    pub fn contains(&self, threshold: f64) -> bool {
        self.position(threshold).is_some()
    }

    /// Indices of the two keys bracketing `threshold`.
    ///
    /// Values at or beyond either edge map to the outermost pair on that side,
    /// so callers extrapolate from the nearest segment.
    pub fn bracket(&self, threshold: f64) -> (usize, usize) {
        let last = self.keys.len() - 1;
        if threshold <= self.keys[0] {
            return (0, 1);
        }
        if threshold >= self.keys[last] {
            return (last - 1, last);
        }
        self.keys
            .windows(2)
            .position(|w| w[0] <= threshold && threshold <= w[1])
            .map(|i| (i, i + 1))
            .unwrap_or((0, last))
    }

    pub fn neighbors(&self, threshold: f64) -> (f64, f64) {
        let (lo, hi) = self.bracket(threshold);
        (self.keys[lo], self.keys[hi])
    }
}

#[derive(Debug, Clone)]
pub struct RegionSeriesData {
    pub name: String,
    pub sample_size: u32,
    /// One rate per regional grid key.
    pub rates: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct StakeholderProfiles {
    pub cfo: StakeholderIdentity,
    pub cfo_preferred_threshold: f64,
    pub cfo_preferred_cost: f64,
    pub cso: StakeholderIdentity,
    pub cso_preferred_threshold: f64,
    pub cso_preferred_fn: i32,
    pub balanced_threshold: f64,
    /// Quote template; `{flaggedPct}` is replaced with the current flagged share.
    pub relations: StakeholderIdentity,
    pub counsel: StakeholderIdentity,
}

/// Immutable exhibit data shared by every engine query.
#[derive(Debug, Clone)]
pub struct Dataset {
    grid: ThresholdGrid,
    records: Vec<ThresholdRecord>,
    regional_grid: ThresholdGrid,
    regions: Vec<RegionSeriesData>,
    stakeholders: StakeholderProfiles,
    total_suppliers: u32,
}

impl Dataset {
    pub fn new(
        grid: ThresholdGrid,
        records: Vec<ThresholdRecord>,
        regional_grid: ThresholdGrid,
        regions: Vec<RegionSeriesData>,
        stakeholders: StakeholderProfiles,
        total_suppliers: u32,
    ) -> Result<Self, DatasetError> {
        if records.len() != grid.keys().len() {
            return Err(DatasetError::RecordCountMismatch {
                expected: grid.keys().len(),
                found: records.len(),
            });
        }
        for (threshold, record) in grid.keys().iter().zip(&records) {
            check_record(*threshold, record, total_suppliers)?;
        }
        if regions.len() < 2 {
            return Err(DatasetError::TooFewRegions(regions.len()));
        }
        for (i, region) in regions.iter().enumerate() {
            if regions[..i].iter().any(|r| r.name == region.name) {
                return Err(DatasetError::DuplicateRegion(region.name.clone()));
            }
            if region.rates.len() != regional_grid.keys().len() {
                return Err(DatasetError::RateCountMismatch {
                    region: region.name.clone(),
                    expected: regional_grid.keys().len(),
                    found: region.rates.len(),
                });
            }
            for (threshold, rate) in regional_grid.keys().iter().zip(&region.rates) {
                if !rate.is_finite() {
                    return Err(DatasetError::NonFiniteValue {
                        field: format!("{} rate", region.name),
                        threshold: *threshold,
                    });
                }
            }
        }
        Ok(Self {
            grid,
            records,
            regional_grid,
            regions,
            stakeholders,
            total_suppliers,
        })
    }

    /// Exhibit 1 of the case: five scenario thresholds, three regions.
    pub fn builtin() -> Self {
        let records = BUILTIN_RECORDS
            .iter()
            .map(|(_, flagged, flagged_pct, cost, fp, fn_, accuracy)| ThresholdRecord {
                flagged: *flagged,
                flagged_pct: *flagged_pct,
                cost: *cost,
                false_positives: *fp,
                false_negatives: *fn_,
                accuracy: *accuracy,
            })
            .collect();
        let regions = BUILTIN_REGIONS
            .iter()
            .map(|(name, sample_size, rates)| RegionSeriesData {
                name: name.to_string(),
                sample_size: *sample_size,
                rates: rates.to_vec(),
            })
            .collect();

        Self {
            grid: ThresholdGrid {
                keys: BUILTIN_RECORDS.iter().map(|r| r.0).collect(),
            },
            records,
            regional_grid: ThresholdGrid {
                keys: BUILTIN_REGIONAL_GRID.to_vec(),
            },
            regions,
            stakeholders: builtin_stakeholders(),
            total_suppliers: 1000,
        }
    }

    /// Parse and validate a dataset exported as JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        let file: DatasetFile = serde_json::from_str(raw)?;
        file.into_dataset()
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let raw = fs::read_to_string(path).map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Serializable form, e.g. to seed an external dataset file.
    pub fn to_file(&self) -> DatasetFile {
        DatasetFile {
            total_suppliers: self.total_suppliers,
            thresholds: self
                .grid
                .keys()
                .iter()
                .zip(&self.records)
                .map(|(threshold, record)| ThresholdEntry {
                    threshold: *threshold,
                    record: record.clone(),
                })
                .collect(),
            regional_thresholds: self.regional_grid.keys().to_vec(),
            regions: self
                .regions
                .iter()
                .map(|r| RegionEntry {
                    name: r.name.clone(),
                    sample_size: r.sample_size,
                    rates: r.rates.clone(),
                })
                .collect(),
            stakeholders: StakeholderFile::from(&self.stakeholders),
        }
    }

    pub fn grid(&self) -> &ThresholdGrid {
        &self.grid
    }

    pub fn regional_grid(&self) -> &ThresholdGrid {
        &self.regional_grid
    }

    /// Stored record for the grid key at `index`.
    pub fn record(&self, index: usize) -> &ThresholdRecord {
        &self.records[index]
    }

    pub fn regions(&self) -> &[RegionSeriesData] {
        &self.regions
    }

    pub fn stakeholders(&self) -> &StakeholderProfiles {
        &self.stakeholders
    }

    pub fn total_suppliers(&self) -> u32 {
        self.total_suppliers
    }
}

fn check_record(threshold: f64, record: &ThresholdRecord, total: u32) -> Result<(), DatasetError> {
    let fields = [
        ("flaggedPct", record.flagged_pct),
        ("cost", record.cost),
        ("accuracy", record.accuracy),
    ];
    if let Some((field, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
        return Err(DatasetError::NonFiniteValue {
            field: field.to_string(),
            threshold,
        });
    }
    if record.flagged < 0 || record.flagged as u32 > total {
        return Err(DatasetError::FlaggedExceedsTotal {
            threshold,
            flagged: record.flagged,
            total,
        });
    }
    Ok(())
}

impl Default for Dataset {
    fn default() -> Self {
        Self::builtin()
    }
}

// threshold, flagged, flagged %, cost ($M), false positives, false negatives, accuracy %
type RecordRow = (f64, i32, f64, f64, i32, i32, f64);

const BUILTIN_RECORDS: [RecordRow; 5] = [
    (0.50, 571, 57.1, 4.6, 113, 159, 72.6),
    (0.55, 747, 74.7, 6.0, 65, 186, 74.8),
    (0.60, 861, 86.1, 6.9, 46, 205, 74.8),
    (0.65, 967, 96.7, 7.7, 13, 173, 81.3),
    (0.70, 994, 99.4, 8.0, 5, 119, 87.5),
];

const BUILTIN_REGIONAL_GRID: [f64; 3] = [0.50, 0.60, 0.70];

const BUILTIN_REGIONS: [(&str, u32, [f64; 3]); 3] = [
    ("China", 1172, [49.9, 67.2, 85.1]),
    ("India", 60, [51.7, 68.3, 90.0]),
    ("Other", 14, [42.9, 84.6, 92.9]),
];

fn identity(name: &str, role: &str, focus: &str, quote: &str) -> StakeholderIdentity {
    StakeholderIdentity {
        name: name.to_string(),
        role: role.to_string(),
        focus: focus.to_string(),
        quote: quote.to_string(),
    }
}

fn builtin_stakeholders() -> StakeholderProfiles {
    StakeholderProfiles {
        cfo: identity(
            "Hans Verhoeven",
            "CFO",
            "Cost Minimization",
            "I prefer closer to the $4-5M range we discussed. Have you considered threshold 0.50?",
        ),
        cfo_preferred_threshold: 0.50,
        cfo_preferred_cost: 4.6,
        cso: identity(
            "Dr. Amelia Okonkwo",
            "CSO",
            "Risk Mitigation",
            "When we miss problematic suppliers and that becomes a front-page story, what's the cost to our brand? I'd push for 0.70 to catch more.",
        ),
        cso_preferred_threshold: 0.70,
        cso_preferred_fn: 119,
        balanced_threshold: 0.60,
        relations: identity(
            "James Park",
            "Supplier Relations",
            "Partnership",
            "We've spent five years building collaborative relationships through the SSP program. Flagging {flaggedPct}% of suppliers sends a message about the partnership approach.",
        ),
        counsel: identity(
            "Lisa Martinez",
            "General Counsel",
            "Fairness",
            "If the model systematically flags certain regions at higher rates not because of actual sustainability differences but because of training data limitations, we have both a legal risk and an ethical problem.",
        ),
    }
}

// ============ External File Format ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetFile {
    #[serde(default = "default_total_suppliers")]
    pub total_suppliers: u32,
    pub thresholds: Vec<ThresholdEntry>,
    pub regional_thresholds: Vec<f64>,
    pub regions: Vec<RegionEntry>,
    #[serde(default)]
    pub stakeholders: StakeholderFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdEntry {
    pub threshold: f64,
    #[serde(flatten)]
    pub record: ThresholdRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionEntry {
    pub name: String,
    pub sample_size: u32,
    pub rates: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderFile {
    pub cfo: StakeholderIdentity,
    pub cfo_preferred_threshold: f64,
    pub cfo_preferred_cost: f64,
    pub cso: StakeholderIdentity,
    pub cso_preferred_threshold: f64,
    pub cso_preferred_fn: i32,
    pub balanced_threshold: f64,
    pub relations: StakeholderIdentity,
    pub counsel: StakeholderIdentity,
}

impl Default for StakeholderFile {
    fn default() -> Self {
        Self::from(&builtin_stakeholders())
    }
}

impl From<&StakeholderProfiles> for StakeholderFile {
    fn from(p: &StakeholderProfiles) -> Self {
        Self {
            cfo: p.cfo.clone(),
            cfo_preferred_threshold: p.cfo_preferred_threshold,
            cfo_preferred_cost: p.cfo_preferred_cost,
            cso: p.cso.clone(),
            cso_preferred_threshold: p.cso_preferred_threshold,
            cso_preferred_fn: p.cso_preferred_fn,
            balanced_threshold: p.balanced_threshold,
            relations: p.relations.clone(),
            counsel: p.counsel.clone(),
        }
    }
}

impl From<StakeholderFile> for StakeholderProfiles {
    fn from(f: StakeholderFile) -> Self {
        Self {
            cfo: f.cfo,
            cfo_preferred_threshold: f.cfo_preferred_threshold,
            cfo_preferred_cost: f.cfo_preferred_cost,
            cso: f.cso,
            cso_preferred_threshold: f.cso_preferred_threshold,
            cso_preferred_fn: f.cso_preferred_fn,
            balanced_threshold: f.balanced_threshold,
            relations: f.relations,
            counsel: f.counsel,
        }
    }
}

fn default_total_suppliers() -> u32 { 1000 }

impl DatasetFile {
    pub fn into_dataset(self) -> Result<Dataset, DatasetError> {
        let (keys, records): (Vec<f64>, Vec<ThresholdRecord>) = self
            .thresholds
            .into_iter()
            .map(|e| (e.threshold, e.record))
            .unzip();
        let grid = ThresholdGrid::new("threshold table", keys)?;
        let regional_grid = ThresholdGrid::new("regional table", self.regional_thresholds)?;
        let regions = self
            .regions
            .into_iter()
            .map(|r| RegionSeriesData {
                name: r.name,
                sample_size: r.sample_size,
                rates: r.rates,
            })
            .collect();

        Dataset::new(
            grid,
            records,
            regional_grid,
            regions,
            self.stakeholders.into(),
            self.total_suppliers,
        )
    }
}
