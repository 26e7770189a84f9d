use thiserror::Error;

/// Failures of the ratio pipeline.
///
/// An undefined ratio (zero or missing denominator) is not an error: it is
/// carried as `None` on the record and skipped by the aggregates.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The source could not be fetched, or its CSV is malformed.
    #[error("data unavailable from {location}: {reason}")]
    DataUnavailable { location: String, reason: String },

    #[error("derived ratios have not been computed for this dataset")]
    RatiosMissing,

    #[error(
        "invalid metric {0:?} (expected LiquidityRatio, DebtToEquityRatio or FinancialExpenseCoverage)"
    )]
    InvalidMetric(String),

    #[error("invalid chart kind {0:?} (expected bar, line or pie)")]
    InvalidChartKind(String),

    #[error("unknown company id(s): {}", .0.join(", "))]
    InvalidSelection(Vec<String>),
}

impl DashboardError {
    pub fn unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
