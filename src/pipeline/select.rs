use crate::error::{DashboardError, Result};
use crate::models::{ChartKind, CompanyRecord, Dataset, Metric};
use serde::Serialize;
use std::collections::HashSet;

/// What the user has chosen for the company comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionState {
    /// Selected ids, deduplicated, in the order they were chosen.
    companies: Vec<String>,
    pub metric: Metric,
    pub chart: ChartKind,
}

impl SelectionState {
    pub fn new(metric: Metric, chart: ChartKind) -> Self {
        Self {
            companies: Vec::new(),
            metric,
            chart,
        }
    }

    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    /// Replace the selection.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.companies.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn add(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.companies.contains(&id) {
            self.companies.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.companies.clear();
    }

    /// Drop ids the dataset no longer knows; returns what was dropped.
    pub fn retain_known(&mut self, dataset: &Dataset) -> Vec<String> {
        let known: HashSet<&str> = dataset.records().iter().map(|r| r.company_id.as_str()).collect();
        let (kept, dropped): (Vec<String>, Vec<String>) = self
            .companies
            .drain(..)
            .partition(|id| known.contains(id.as_str()));
        self.companies = kept;
        dropped
    }
}

/// Distinct company ids in order of first appearance.
pub fn company_ids(dataset: &Dataset) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .records()
        .iter()
        .filter(|r| seen.insert(r.company_id.as_str()))
        .map(|r| r.company_id.clone())
        .collect()
}

/// Fail with `InvalidSelection` if any id is unknown to the dataset.
pub fn validate_selection<S: AsRef<str>>(dataset: &Dataset, ids: &[S]) -> Result<()> {
    let known: HashSet<&str> = dataset.records().iter().map(|r| r.company_id.as_str()).collect();
    let unknown: Vec<String> = ids
        .iter()
        .map(|s| s.as_ref())
        .filter(|id: &&str| !known.contains(id))
        .map(|id| id.to_string())
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::InvalidSelection(unknown))
    }
}

/// Records whose id is selected, in dataset order. An empty selection yields
/// no records.
pub fn select_companies<'a, S: AsRef<str>>(
    dataset: &'a Dataset,
    ids: &[S],
) -> Result<Vec<&'a CompanyRecord>> {
    validate_selection(dataset, ids)?;
    let wanted: HashSet<&str> = ids.iter().map(|s| s.as_ref()).collect();
    Ok(dataset
        .records()
        .iter()
        .filter(|r| wanted.contains(r.company_id.as_str()))
        .collect())
}
