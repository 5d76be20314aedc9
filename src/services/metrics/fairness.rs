// Fairness Summary
// Severity bands for regional disparity and small-sample cautions

use crate::models::{DisparitySeverity, FairnessSummary, RegionalRates};
use crate::services::exhibits::SMALL_SAMPLE_LIMIT;

const HIGH_DISPARITY_PP: f64 = 20.0;
const MODERATE_DISPARITY_PP: f64 = 10.0;

pub fn classify_disparity(disparity: f64) -> DisparitySeverity {
    if disparity > HIGH_DISPARITY_PP {
        DisparitySeverity::High
    } else if disparity > MODERATE_DISPARITY_PP {
        DisparitySeverity::Moderate
    } else {
        DisparitySeverity::Low
    }
}

pub fn severity_message(severity: DisparitySeverity, disparity: f64) -> String {
    match severity {
        DisparitySeverity::High => format!(
            "High Disparity Warning: The {:.1}pp difference in flagging rates between regions may indicate disparate impact. This could expose the company to regulatory scrutiny or reputational risk.",
            disparity
        ),
        DisparitySeverity::Moderate => format!(
            "Moderate Disparity: The {:.1}pp difference in flagging rates between regions warrants monitoring.",
            disparity
        ),
        DisparitySeverity::Low => format!(
            "Low Disparity: The {:.1}pp difference in flagging rates indicates relatively balanced treatment across regions.",
            disparity
        ),
    }
}

pub fn summarize_fairness(rates: RegionalRates) -> FairnessSummary {
    let disparity = rates.spread();
    let severity = classify_disparity(disparity);
    let small_sample_regions = rates
        .iter()
        .filter(|r| r.sample_size < SMALL_SAMPLE_LIMIT)
        .map(|r| r.region.clone())
        .collect();

    FairnessSummary {
        message: severity_message(severity, disparity),
        rates,
        disparity,
        severity,
        small_sample_regions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::metrics::MetricsEngine;

    #[test]
    fn test_band_edges() {
        assert_eq!(classify_disparity(20.0), DisparitySeverity::Moderate);
        assert_eq!(classify_disparity(20.01), DisparitySeverity::High);
        assert_eq!(classify_disparity(10.0), DisparitySeverity::Low);
        assert_eq!(classify_disparity(10.5), DisparitySeverity::Moderate);
    }

    #[test]
    fn test_summary_at_060() {
        let engine = MetricsEngine::default();
        let summary = summarize_fairness(engine.get_regional_rates(0.60));
        assert_eq!(summary.severity, DisparitySeverity::Moderate);
        assert!(summary.message.contains("17.4pp"));
        assert_eq!(summary.small_sample_regions, vec!["Other".to_string()]);
    }

    #[test]
    fn test_low_band_at_070() {
        // 92.9 - 85.1 = 7.8pp
        let summary = summarize_fairness(MetricsEngine::default().get_regional_rates(0.70));
        assert_eq!(summary.severity, DisparitySeverity::Low);
    }
}
