//! Ratio calculator.
//!
//! Division policy: a ratio is undefined (`None`) when its denominator is
//! zero, absent or non-finite, or when any numerator input is absent. Negative
//! denominators are divided normally. Undefined ratios never raise.

use crate::models::{Dataset, DerivedRatios, Financials};

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 || !d.is_finite() {
        return None;
    }
    let r = n / d;
    r.is_finite().then_some(r)
}

/// Pure function of the raw fields.
pub fn compute(f: &Financials) -> DerivedRatios {
    let total_debt = match (f.short_term_debt, f.long_term_debt) {
        (Some(s), Some(l)) => Some(s + l),
        _ => None,
    };

    DerivedRatios {
        liquidity: ratio(f.current_assets, f.current_liabilities),
        debt_to_equity: ratio(total_debt, f.equity),
        expense_coverage: ratio(f.total_revenue, f.financial_expenses),
    }
}

/// Attach ratios to every record, overwriting any previous values.
pub fn apply(dataset: &mut Dataset) {
    for rec in dataset.records_mut() {
        rec.ratios = Some(compute(&rec.financials));
    }
}
