// Screenboard Data Models
// Records exchanged between the metrics engine and the dashboard front end

use serde::{Deserialize, Serialize};

// ============ Threshold Metrics ============

/// Outcome of screening the supplier base at one probability threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRecord {
    /// Suppliers flagged for review.
    pub flagged: i32,
    /// Share of the supplier base flagged, in percent.
    pub flagged_pct: f64,
    /// Annual review cost in millions.
    pub cost: f64,
    /// Good suppliers incorrectly flagged.
    pub false_positives: i32,
    /// Problematic suppliers missed.
    pub false_negatives: i32,
    /// Model accuracy, in percent.
    pub accuracy: f64,
}

/// Field-by-field difference between two threshold records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDelta {
    pub flagged: i32,
    pub flagged_pct: f64,
    pub cost: f64,
    pub false_positives: i32,
    pub false_negatives: i32,
    pub accuracy: f64,
}

impl MetricsDelta {
    pub fn between(current: &ThresholdRecord, reference: &ThresholdRecord) -> Self {
        Self {
            flagged: current.flagged - reference.flagged,
            flagged_pct: current.flagged_pct - reference.flagged_pct,
            cost: current.cost - reference.cost,
            false_positives: current.false_positives - reference.false_positives,
            false_negatives: current.false_negatives - reference.false_negatives,
            accuracy: current.accuracy - reference.accuracy,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.flagged == 0
            && self.flagged_pct == 0.0
            && self.cost == 0.0
            && self.false_positives == 0
            && self.false_negatives == 0
            && self.accuracy == 0.0
    }
}

// ============ Regional Rates ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRate {
    pub region: String,
    /// Flagging rate in percent.
    pub rate: f64,
    pub sample_size: u32,
}

/// Per-region flagging rates at one threshold, in dataset order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalRates(pub Vec<RegionalRate>);

impl RegionalRates {
    pub fn get(&self, region: &str) -> Option<f64> {
        self.0.iter().find(|r| r.region == region).map(|r| r.rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionalRate> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Spread between the highest and lowest regional rate.
    /// Zero for an empty set; callers rely on the dataset holding two or more regions.
    pub fn spread(&self) -> f64 {
        let mut rates = self.0.iter().map(|r| r.rate);
        let Some(first) = rates.next() else {
            return 0.0;
        };
        let (min, max) = rates.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r)));
        max - min
    }
}

// ============ Fairness ============

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisparitySeverity {
    Low,
    Moderate,
    High,
}

impl DisparitySeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            DisparitySeverity::Low => "low",
            DisparitySeverity::Moderate => "moderate",
            DisparitySeverity::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessSummary {
    pub rates: RegionalRates,
    /// Max minus min regional rate, in percentage points.
    pub disparity: f64,
    pub severity: DisparitySeverity,
    pub message: String,
    #[serde(default)]
    pub small_sample_regions: Vec<String>,
}

// ============ Stakeholders ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderIdentity {
    pub name: String,
    pub role: String,
    pub focus: String,
    pub quote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfoPerspective {
    #[serde(flatten)]
    pub identity: StakeholderIdentity,
    pub preferred_threshold: f64,
    pub preferred_cost: f64,
    pub current_cost: f64,
    pub cost_gap: f64,
    pub cost_gap_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsoPerspective {
    #[serde(flatten)]
    pub identity: StakeholderIdentity,
    pub preferred_threshold: f64,
    pub preferred_fn: i32,
    pub current_fn: i32,
    pub fn_gap: i32,
    pub fn_gap_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationsPerspective {
    #[serde(flatten)]
    pub identity: StakeholderIdentity,
    pub flagged_pct: f64,
    pub flagged_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselPerspective {
    #[serde(flatten)]
    pub identity: StakeholderIdentity,
    pub disparity: f64,
    pub rates: RegionalRates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeholderPerspectives {
    pub cfo: CfoPerspective,
    pub cso: CsoPerspective,
    pub relations: RelationsPerspective,
    pub counsel: CounselPerspective,
}

// ============ Chart Data ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRiskPoint {
    pub threshold: f64,
    pub cost: f64,
    pub false_negatives: i32,
    pub selected: bool,
    pub interpolated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostRiskChart {
    /// Canonical thresholds in ascending order.
    pub frontier: Vec<CostRiskPoint>,
    /// Present only when the selection falls between canonical thresholds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<CostRiskPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSeries {
    pub threshold: f64,
    pub highlighted: bool,
    pub bars: Vec<RegionalRate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleAnnotation {
    pub region: String,
    pub sample_size: u32,
    pub small_sample: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeographicChart {
    pub series: Vec<RegionSeries>,
    pub annotations: Vec<SampleAnnotation>,
}

// ============ Dashboard ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub threshold: f64,
    pub reference_threshold: f64,
    pub total_suppliers: u32,
    pub is_standard: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub metrics: ThresholdRecord,
    pub delta: MetricsDelta,
    pub fairness: FairnessSummary,
    pub stakeholders: StakeholderPerspectives,
    pub cost_risk_chart: CostRiskChart,
    pub geographic_chart: GeographicChart,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepRow {
    pub threshold: f64,
    pub is_standard: bool,
    pub metrics: ThresholdRecord,
    pub disparity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(region: &str, rate: f64) -> RegionalRate {
        RegionalRate {
            region: region.to_string(),
            rate,
            sample_size: 10,
        }
    }

    #[test]
    fn test_spread_uses_extremes() {
        let rates = RegionalRates(vec![rate("A", 50.0), rate("B", 42.5), rate("C", 61.0)]);
        assert_eq!(rates.spread(), 61.0 - 42.5);
        assert_eq!(rates.get("B"), Some(42.5));
        assert_eq!(rates.get("Z"), None);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = ThresholdRecord {
            flagged: 1,
            flagged_pct: 0.1,
            cost: 2.0,
            false_positives: 3,
            false_negatives: 4,
            accuracy: 50.0,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["flaggedPct"], 0.1);
        assert_eq!(json["falseNegatives"], 4);
    }
}
