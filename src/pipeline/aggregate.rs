use crate::error::{DashboardError, Result};
use crate::models::{Dataset, DerivedRatios, Metric, SectorAggregate};
use std::collections::BTreeMap;

#[derive(Default)]
struct Accumulator {
    records: usize,
    sums: [f64; 3],
    counts: [usize; 3],
}

/// Mean of each ratio per industry, skipping undefined values.
///
/// Output is ordered lexicographically by industry so chart categories are
/// stable across reloads.
pub fn sector_aggregates(dataset: &Dataset) -> Result<Vec<SectorAggregate>> {
    if !dataset.has_ratios() {
        return Err(DashboardError::RatiosMissing);
    }

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for rec in dataset.records() {
        let acc = groups.entry(rec.industry.as_str()).or_default();
        acc.records += 1;
        for metric in Metric::ALL {
            if let Some(v) = rec.ratio(metric) {
                acc.sums[metric.index()] += v;
                acc.counts[metric.index()] += 1;
            }
        }
    }

    Ok(groups
        .into_iter()
        .map(|(industry, acc)| {
            let mut means = DerivedRatios::default();
            for metric in Metric::ALL {
                let i = metric.index();
                let mean = (acc.counts[i] > 0).then(|| acc.sums[i] / acc.counts[i] as f64);
                means.set(metric, mean);
            }
            SectorAggregate {
                industry: industry.to_string(),
                record_count: acc.records,
                means,
                defined_counts: acc.counts,
            }
        })
        .collect())
}
