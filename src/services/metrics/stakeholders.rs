// Stakeholder Perspectives
// Neutral factual comparisons per stakeholder; no verdicts about which threshold is better.

use crate::models::{
    CfoPerspective, CounselPerspective, CsoPerspective, RegionalRates, RelationsPerspective,
    StakeholderIdentity, StakeholderPerspectives, ThresholdRecord,
};
use crate::services::exhibits::StakeholderProfiles;

const FLAGGED_PCT_PLACEHOLDER: &str = "{flaggedPct}";

/// Gap as a percentage of the reference value; 0 when the reference is 0.
pub fn gap_percentage(gap: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        0.0
    } else {
        gap / reference * 100.0
    }
}

fn relations_identity(template: &StakeholderIdentity, flagged_pct: f64) -> StakeholderIdentity {
    StakeholderIdentity {
        quote: template
            .quote
            .replace(FLAGGED_PCT_PLACEHOLDER, &format!("{:.0}", flagged_pct)),
        ..template.clone()
    }
}

pub fn build_perspectives(
    profiles: &StakeholderProfiles,
    metrics: &ThresholdRecord,
    rates: RegionalRates,
) -> StakeholderPerspectives {
    let cost_gap = metrics.cost - profiles.cfo_preferred_cost;
    let fn_gap = metrics.false_negatives - profiles.cso_preferred_fn;

    StakeholderPerspectives {
        cfo: CfoPerspective {
            identity: profiles.cfo.clone(),
            preferred_threshold: profiles.cfo_preferred_threshold,
            preferred_cost: profiles.cfo_preferred_cost,
            current_cost: metrics.cost,
            cost_gap,
            cost_gap_pct: gap_percentage(cost_gap, profiles.cfo_preferred_cost),
        },
        cso: CsoPerspective {
            identity: profiles.cso.clone(),
            preferred_threshold: profiles.cso_preferred_threshold,
            preferred_fn: profiles.cso_preferred_fn,
            current_fn: metrics.false_negatives,
            fn_gap,
            fn_gap_pct: gap_percentage(fn_gap as f64, profiles.cso_preferred_fn as f64),
        },
        relations: RelationsPerspective {
            identity: relations_identity(&profiles.relations, metrics.flagged_pct),
            flagged_pct: metrics.flagged_pct,
            flagged_count: metrics.flagged,
        },
        counsel: CounselPerspective {
            identity: profiles.counsel.clone(),
            disparity: rates.spread(),
            rates,
        },
    }
}
