pub mod schema;

pub use schema::{ChartKind, Metric};

use serde::{Deserialize, Serialize};

// ── Raw balance-sheet / income-statement fields ───────────────────────────────

/// Numeric inputs of one record. `None` means the cell was blank or a null
/// token in the source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Financials {
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub short_term_debt: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub equity: Option<f64>,
    pub total_revenue: Option<f64>,
    pub financial_expenses: Option<f64>,
}

// ── Derived ratios ────────────────────────────────────────────────────────────

/// The three ratios of one record. `None` is the undefined marker.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DerivedRatios {
    #[serde(rename = "LiquidityRatio")]
    pub liquidity: Option<f64>,
    #[serde(rename = "DebtToEquityRatio")]
    pub debt_to_equity: Option<f64>,
    #[serde(rename = "FinancialExpenseCoverage")]
    pub expense_coverage: Option<f64>,
}

impl DerivedRatios {
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::LiquidityRatio => self.liquidity,
            Metric::DebtToEquityRatio => self.debt_to_equity,
            Metric::FinancialExpenseCoverage => self.expense_coverage,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        match metric {
            Metric::LiquidityRatio => self.liquidity = value,
            Metric::DebtToEquityRatio => self.debt_to_equity = value,
            Metric::FinancialExpenseCoverage => self.expense_coverage = value,
        }
    }
}

// ── Company-period record ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanyRecord {
    pub company_id: String,
    pub industry: String,
    pub financials: Financials,
    /// Filled by the ratio calculator; `None` until then.
    pub ratios: Option<DerivedRatios>,
}

impl CompanyRecord {
    pub fn new(company_id: impl Into<String>, industry: impl Into<String>, financials: Financials) -> Self {
        Self {
            company_id: company_id.into(),
            industry: industry.into(),
            financials,
            ratios: None,
        }
    }

    pub fn ratio(&self, metric: Metric) -> Option<f64> {
        self.ratios.as_ref().and_then(|r| r.get(metric))
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// Ordered collection of records, in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    records: Vec<CompanyRecord>,
}

impl Dataset {
    pub fn new(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CompanyRecord] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [CompanyRecord] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True once every record carries derived ratios.
    pub fn has_ratios(&self) -> bool {
        self.records.iter().all(|r| r.ratios.is_some())
    }
}

// ── Sector aggregate ──────────────────────────────────────────────────────────

/// Per-industry means of the derived ratios.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectorAggregate {
    pub industry: String,
    /// Records in this industry, defined or not.
    pub record_count: usize,
    /// Mean over the records whose ratio is defined; `None` when none are.
    pub means: DerivedRatios,
    /// Defined values per metric, indexed by `Metric::index`.
    pub defined_counts: [usize; 3],
}

impl SectorAggregate {
    pub fn mean(&self, metric: Metric) -> Option<f64> {
        self.means.get(metric)
    }

    #[cfg(test)]
    pub fn defined_count(&self, metric: Metric) -> usize {
        self.defined_counts[metric.index()]
    }
}

// ── Raw CSV rows ──────────────────────────────────────────────────────────────

/// One CSV row as text, in `schema::REQUIRED_COLUMNS` order.
#[derive(Debug, Clone, Default)]
pub struct RawRecordRow {
    pub company_id: Option<String>,
    pub industry: Option<String>,
    pub current_assets: Option<String>,
    pub current_liabilities: Option<String>,
    pub short_term_debt: Option<String>,
    pub long_term_debt: Option<String>,
    pub equity: Option<String>,
    pub total_revenue: Option<String>,
    pub financial_expenses: Option<String>,
}
