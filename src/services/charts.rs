// Chart Data
// Series behind the cost/risk frontier and the geographic flagging-rate bars.
// Only data and selection state; styling belongs to whoever draws them.

use crate::models::{
    CostRiskChart, CostRiskPoint, GeographicChart, RegionSeries, RegionalRate, SampleAnnotation,
};
use crate::services::exhibits::SMALL_SAMPLE_LIMIT;
use crate::services::metrics::MetricsEngine;

/// A frontier point counts as selected within this distance of the selection.
const FRONTIER_SELECT_TOLERANCE: f64 = 0.01;
/// Regional series are coarser (0.10 apart), so they highlight more loosely.
const REGION_HIGHLIGHT_TOLERANCE: f64 = 0.06;

pub fn cost_risk_chart(engine: &MetricsEngine, selected: f64) -> CostRiskChart {
    let dataset = engine.dataset();
    let frontier = dataset
        .grid()
        .keys()
        .iter()
        .enumerate()
        .map(|(i, &threshold)| {
            let record = dataset.record(i);
            CostRiskPoint {
                threshold,
                cost: record.cost,
                false_negatives: record.false_negatives,
                selected: (threshold - selected).abs() < FRONTIER_SELECT_TOLERANCE,
                interpolated: false,
            }
        })
        .collect();

    let selection = (!engine.is_standard(selected)).then(|| {
        let metrics = engine.get_metrics(selected);
        CostRiskPoint {
            threshold: selected,
            cost: metrics.cost,
            false_negatives: metrics.false_negatives,
            selected: true,
            interpolated: true,
        }
    });

    CostRiskChart { frontier, selection }
}

pub fn geographic_chart(engine: &MetricsEngine, selected: f64) -> GeographicChart {
    let dataset = engine.dataset();
    let series = dataset
        .regional_grid()
        .keys()
        .iter()
        .enumerate()
        .map(|(i, &threshold)| RegionSeries {
            threshold,
            highlighted: (threshold - selected).abs() < REGION_HIGHLIGHT_TOLERANCE,
            bars: dataset
                .regions()
                .iter()
                .map(|region| RegionalRate {
                    region: region.name.clone(),
                    rate: region.rates[i],
                    sample_size: region.sample_size,
                })
                .collect(),
        })
        .collect();

    let annotations = dataset
        .regions()
        .iter()
        .map(|region| SampleAnnotation {
            region: region.name.clone(),
            sample_size: region.sample_size,
            small_sample: region.sample_size < SMALL_SAMPLE_LIMIT,
        })
        .collect();

    GeographicChart { series, annotations }
}
