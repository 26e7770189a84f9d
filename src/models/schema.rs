//! Canonical column names and display labels.
//!
//! Every loader, aggregate and chart refers to columns through this table so
//! that a metric has exactly one column name and one label.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Raw columns ───────────────────────────────────────────────────────────────

pub const COMPANY_ID: &str = "Company_ID";
pub const INDUSTRY: &str = "Industry";
pub const CURRENT_ASSETS: &str = "Current_Assets";
pub const CURRENT_LIABILITIES: &str = "Current_Liabilities";
pub const SHORT_TERM_DEBT: &str = "Short_Term_Debt";
pub const LONG_TERM_DEBT: &str = "Long_Term_Debt";
pub const EQUITY: &str = "Equity";
pub const TOTAL_REVENUE: &str = "Total_Revenue";
pub const FINANCIAL_EXPENSES: &str = "Financial_Expenses";

/// Columns a source CSV must carry, in the order `RawRecordRow` reads them.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COMPANY_ID,
    INDUSTRY,
    CURRENT_ASSETS,
    CURRENT_LIABILITIES,
    SHORT_TERM_DEBT,
    LONG_TERM_DEBT,
    EQUITY,
    TOTAL_REVENUE,
    FINANCIAL_EXPENSES,
];

// ── Derived metrics ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    LiquidityRatio,
    DebtToEquityRatio,
    FinancialExpenseCoverage,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::LiquidityRatio,
        Metric::DebtToEquityRatio,
        Metric::FinancialExpenseCoverage,
    ];

    /// Column name of the derived value.
    pub fn column(self) -> &'static str {
        match self {
            Metric::LiquidityRatio => "LiquidityRatio",
            Metric::DebtToEquityRatio => "DebtToEquityRatio",
            Metric::FinancialExpenseCoverage => "FinancialExpenseCoverage",
        }
    }

    /// Human label used for chart series and titles.
    pub fn label(self) -> &'static str {
        match self {
            Metric::LiquidityRatio => "Liquidity Ratio",
            Metric::DebtToEquityRatio => "Debt to Equity Ratio",
            Metric::FinancialExpenseCoverage => "Financial Expense Coverage",
        }
    }

    /// Position in `ALL`, used to index per-metric arrays.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "liquidityratio" | "liquidity" | "liquidity-ratio" => Ok(Metric::LiquidityRatio),
            "debttoequityratio" | "debt-to-equity" | "debt-to-equity-ratio" => {
                Ok(Metric::DebtToEquityRatio)
            }
            "financialexpensecoverage" | "coverage" | "financial-expense-coverage" => {
                Ok(Metric::FinancialExpenseCoverage)
            }
            _ => Err(DashboardError::InvalidMetric(s.to_string())),
        }
    }
}

// ── Chart kinds ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Pie,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Pie => "pie",
        })
    }
}

impl FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bar" | "bars" => Ok(ChartKind::Bar),
            "line" | "lines" => Ok(ChartKind::Line),
            "pie" => Ok(ChartKind::Pie),
            _ => Err(DashboardError::InvalidChartKind(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_from_str() {
        assert_eq!("LiquidityRatio".parse::<Metric>().unwrap(), Metric::LiquidityRatio);
        assert_eq!("debt_to_equity".parse::<Metric>().unwrap(), Metric::DebtToEquityRatio);
        assert_eq!("coverage".parse::<Metric>().unwrap(), Metric::FinancialExpenseCoverage);
        assert!(matches!(
            "InvalidName".parse::<Metric>(),
            Err(DashboardError::InvalidMetric(name)) if name == "InvalidName"
        ));
    }

    #[test]
    fn test_metric_index_matches_all() {
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
            assert_eq!(m.column().parse::<Metric>().unwrap(), *m);
        }
    }

    #[test]
    fn test_chart_kind_from_str() {
        assert_eq!("Bar".parse::<ChartKind>().unwrap(), ChartKind::Bar);
        assert_eq!(" line ".parse::<ChartKind>().unwrap(), ChartKind::Line);
        assert_eq!("pie".parse::<ChartKind>().unwrap(), ChartKind::Pie);
        assert!("donut".parse::<ChartKind>().is_err());
    }
}
