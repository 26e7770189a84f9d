use crate::models::schema;
use crate::models::{CompanyRecord, Financials, RawRecordRow};

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Tokens that mark an absent value rather than a malformed one.
const NULL_TOKENS: [&str; 7] = ["", "n/a", "na", "nan", "null", "-", "—"];

fn is_null_token(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    NULL_TOKENS.contains(&lower.as_str())
}

/// Parse a numeric cell, dropping thousands separators.
/// "1,234.5" → Some(1234.5) | "N/A" → None | "abc" → Err
pub fn parse_number(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if is_null_token(s) {
        return Ok(None);
    }
    let cleaned = s.replace(',', "");
    let value: f64 = cleaned
        .parse()
        .map_err(|_| format!("{:?} is not a number", s))?;
    Ok(value.is_finite().then_some(value))
}

fn required_text(value: Option<&str>, column: &str) -> Result<String, String> {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(format!("{} is empty", column)),
    }
}

fn numeric(value: Option<&str>, column: &str) -> Result<Option<f64>, String> {
    match value {
        None => Ok(None),
        Some(s) => parse_number(s).map_err(|e| format!("{}: {}", column, e)),
    }
}

// ── CSV row → CompanyRecord ───────────────────────────────────────────────────

/// Convert a raw row. The error names the offending column.
pub fn row_to_record(row: &RawRecordRow) -> Result<CompanyRecord, String> {
    let company_id = required_text(row.company_id.as_deref(), schema::COMPANY_ID)?;
    let industry = required_text(row.industry.as_deref(), schema::INDUSTRY)?;

    let financials = Financials {
        current_assets: numeric(row.current_assets.as_deref(), schema::CURRENT_ASSETS)?,
        current_liabilities: numeric(row.current_liabilities.as_deref(), schema::CURRENT_LIABILITIES)?,
        short_term_debt: numeric(row.short_term_debt.as_deref(), schema::SHORT_TERM_DEBT)?,
        long_term_debt: numeric(row.long_term_debt.as_deref(), schema::LONG_TERM_DEBT)?,
        equity: numeric(row.equity.as_deref(), schema::EQUITY)?,
        total_revenue: numeric(row.total_revenue.as_deref(), schema::TOTAL_REVENUE)?,
        financial_expenses: numeric(row.financial_expenses.as_deref(), schema::FINANCIAL_EXPENSES)?,
    };

    Ok(CompanyRecord::new(company_id, industry, financials))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, industry: &str, assets: &str) -> RawRecordRow {
        RawRecordRow {
            company_id: Some(id.into()),
            industry: Some(industry.into()),
            current_assets: Some(assets.into()),
            current_liabilities: Some("100".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,234.5"), Ok(Some(1234.5)));
        assert_eq!(parse_number(" -42 "), Ok(Some(-42.0)));
        assert_eq!(parse_number("N/A"), Ok(None));
        assert_eq!(parse_number("NaN"), Ok(None));
        assert_eq!(parse_number(""), Ok(None));
        assert!(parse_number("12abc").is_err());
    }

    #[test]
    fn test_row_to_record() {
        let rec = row_to_record(&raw(" A ", "Tech", "200")).unwrap();
        assert_eq!(rec.company_id, "A");
        assert_eq!(rec.financials.current_assets, Some(200.0));
        assert_eq!(rec.financials.current_liabilities, Some(100.0));
        assert_eq!(rec.financials.equity, None);
        assert!(rec.ratios.is_none());
    }

    #[test]
    fn test_row_to_record_rejects_bad_cells() {
        let err = row_to_record(&raw("A", "", "200")).unwrap_err();
        assert!(err.contains("Industry"));

        let err = row_to_record(&raw("A", "Tech", "lots")).unwrap_err();
        assert!(err.contains("Current_Assets"));
    }
}
