//! Loads the financials CSV into a `Dataset`.
//!
//! A `DataSource` yields the raw CSV text (remote URL or local file);
//! `parse_dataset` checks the header against the canonical schema and turns
//! every row into a `CompanyRecord`. Any missing column or malformed row fails
//! the whole load with `DataUnavailable`.

pub mod cache;
pub mod cleaner;
pub mod http_client;

use crate::config::SourceConfig;
use crate::error::{DashboardError, Result};
use crate::models::schema::REQUIRED_COLUMNS;
use crate::models::{Dataset, RawRecordRow};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, info};
use url::Url;

use self::cleaner::row_to_record;
use self::http_client::HttpClient;

pub use self::cache::DatasetCache;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable origin of the CSV text.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Stable description of where the data lives; part of the cache key.
    fn location(&self) -> String;

    async fn fetch(&self) -> Result<String>;
}

// ── Remote CSV ────────────────────────────────────────────────────────────────

pub struct HttpSource {
    client: HttpClient,
    url: Url,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> anyhow::Result<Self> {
        let url = Url::parse(&config.url)
            .map_err(|e| anyhow::anyhow!("Invalid source URL {:?}: {}", config.url, e))?;
        Ok(Self {
            client: HttpClient::new(config)?,
            url,
        })
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn location(&self) -> String {
        self.url.to_string()
    }

    async fn fetch(&self) -> Result<String> {
        info!("Fetching dataset from {}", self.url);
        self.client
            .get_text(&self.url)
            .await
            .map_err(|e| DashboardError::unavailable(self.location(), e.to_string()))
    }
}

// ── Local CSV ─────────────────────────────────────────────────────────────────

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<String> {
        info!("Reading dataset from {:?}", self.path);
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| DashboardError::unavailable(self.location(), e.to_string()))
    }
}

/// Build the configured source: a local path wins over the URL.
pub fn source_from_config(config: &SourceConfig) -> anyhow::Result<Box<dyn DataSource>> {
    match &config.path {
        Some(path) => Ok(Box::new(FileSource::new(path))),
        None => Ok(Box::new(HttpSource::new(config)?)),
    }
}

// ── CSV parsing ───────────────────────────────────────────────────────────────

/// Header positions of the required columns, in `REQUIRED_COLUMNS` order.
struct ColumnIndex([usize; REQUIRED_COLUMNS.len()]);

impl ColumnIndex {
    fn resolve(headers: &csv::StringRecord) -> std::result::Result<Self, Vec<&'static str>> {
        let mut idx = [0usize; REQUIRED_COLUMNS.len()];
        let mut missing = Vec::new();

        for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
            match headers.iter().position(|h| h.trim() == *name) {
                Some(i) => idx[slot] = i,
                None => missing.push(*name),
            }
        }

        if missing.is_empty() { Ok(Self(idx)) } else { Err(missing) }
    }

    fn read(&self, record: &csv::StringRecord) -> RawRecordRow {
        let cell = |slot: usize| record.get(self.0[slot]).map(|s| s.to_string());
        RawRecordRow {
            company_id: cell(0),
            industry: cell(1),
            current_assets: cell(2),
            current_liabilities: cell(3),
            short_term_debt: cell(4),
            long_term_debt: cell(5),
            equity: cell(6),
            total_revenue: cell(7),
            financial_expenses: cell(8),
        }
    }
}

/// Parse CSV text with a header row into a `Dataset` (ratios not yet applied).
pub fn parse_dataset(location: &str, text: &str) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::unavailable(location, format!("unreadable header: {}", e)))?
        .clone();

    let index = ColumnIndex::resolve(&headers).map_err(|missing| {
        DashboardError::unavailable(
            location,
            format!("missing required column(s): {}", missing.join(", ")),
        )
    })?;

    let mut records = Vec::new();
    for (i, result) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let record = result
            .map_err(|e| DashboardError::unavailable(location, format!("line {}: {}", line, e)))?;
        if record.len() < headers.len() {
            return Err(DashboardError::unavailable(
                location,
                format!(
                    "line {}: expected {} fields, found {}",
                    line,
                    headers.len(),
                    record.len()
                ),
            ));
        }

        let raw = index.read(&record);
        let rec = row_to_record(&raw)
            .map_err(|e| DashboardError::unavailable(location, format!("line {}: {}", line, e)))?;
        records.push(rec);
    }

    debug!("{}: parsed {} records", location, records.len());
    Ok(Dataset::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Company_ID,Industry,Current_Assets,Current_Liabilities,Short_Term_Debt,Long_Term_Debt,Equity,Total_Revenue,Financial_Expenses";

    #[test]
    fn test_parse_dataset_preserves_order() {
        let text = format!(
            "{}\nA,Tech,200,100,10,20,60,500,25\nB,Retail,\"1,000\",500,N/A,5,50,100,0\nA,Tech,220,110,10,20,60,520,26\n",
            HEADER
        );
        let ds = parse_dataset("mem", &text).unwrap();
        assert_eq!(ds.len(), 3);
        let ids: Vec<&str> = ds.records().iter().map(|r| r.company_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "A"]);
        assert_eq!(ds.records()[1].financials.current_assets, Some(1000.0));
        assert_eq!(ds.records()[1].financials.short_term_debt, None);
        assert!(!ds.has_ratios());
    }

    #[test]
    fn test_parse_dataset_ignores_extra_and_reordered_columns() {
        let text = "Year,Industry,Company_ID,Equity,Current_Assets,Current_Liabilities,Short_Term_Debt,Long_Term_Debt,Total_Revenue,Financial_Expenses\n\
                    2023,Tech,X,10,4,2,1,1,9,3\n";
        let ds = parse_dataset("mem", text).unwrap();
        let rec = &ds.records()[0];
        assert_eq!(rec.company_id, "X");
        assert_eq!(rec.industry, "Tech");
        assert_eq!(rec.financials.equity, Some(10.0));
        assert_eq!(rec.financials.current_liabilities, Some(2.0));
    }

    #[test]
    fn test_missing_columns_are_all_named() {
        let text = "Company_ID,Industry,Current_Assets\nA,Tech,1\n";
        let err = parse_dataset("mem", text).unwrap_err();
        match err {
            DashboardError::DataUnavailable { location, reason } => {
                assert_eq!(location, "mem");
                assert!(reason.contains("Current_Liabilities"));
                assert!(reason.contains("Financial_Expenses"));
                assert!(!reason.contains("Current_Assets"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let text = format!("{}\nA,Tech,200,100,10,20,60,500,25\nB,Tech,abc,1,1,1,1,1,1\n", HEADER);
        let err = parse_dataset("mem", &text).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("line 3"), "{msg}");
        assert!(msg.contains("Current_Assets"), "{msg}");
    }

    #[test]
    fn test_short_row_fails_load() {
        let text = format!("{}\nA,Tech,200,100,10,20,60,500,25\nB,Tech,200,100\n", HEADER);
        match parse_dataset("mem", &text).unwrap_err() {
            DashboardError::DataUnavailable { location, reason } => {
                assert_eq!(location, "mem");
                assert_eq!(reason, "line 3: expected 9 fields, found 4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_longer_rows_are_accepted() {
        let text = format!("{}\nA,Tech,200,100,10,20,60,500,25,extra\n", HEADER);
        let ds = parse_dataset("mem", &text).unwrap();
        assert_eq!(ds.records()[0].financials.financial_expenses, Some(25.0));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let ds = parse_dataset("mem", &format!("{}\n", HEADER)).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn test_file_source_missing_file() {
        let src = FileSource::new("/definitely/not/here.csv");
        let err = tokio_test::block_on(src.fetch()).unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }
}
