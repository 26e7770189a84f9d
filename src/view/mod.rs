//! View model for the two dashboard charts.
//!
//! `render` is a pure function of the selection state and the dataset; it is
//! re-run after every state change. A frontend (or the terminal renderer in
//! `text`) draws whatever it returns.

mod text;

use crate::error::{DashboardError, Result};
use crate::models::schema;
use crate::models::{ChartKind, Dataset, Metric};
use crate::pipeline::{SelectionState, sector_aggregates, select_companies};
use serde::Serialize;

pub const SECTOR_TITLE: &str = "Financial Ratios by Sector";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    pub sectors: SectorChart,
    pub comparison: ComparisonView,
}

/// Stacked bar chart: one category per industry, one series per metric.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SectorChart {
    pub title: &'static str,
    pub categories: Vec<String>,
    pub series: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartSeries {
    pub metric: Metric,
    pub name: &'static str,
    /// Aligned with `SectorChart::categories`.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ComparisonView {
    /// Nothing selected; shown as an explicit prompt rather than an empty chart.
    NoSelection { metric: Metric, chart: ChartKind },
    Chart(ComparisonChart),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonChart {
    pub title: String,
    pub kind: ChartKind,
    pub metric: Metric,
    pub x_field: &'static str,
    pub y_field: &'static str,
    pub color_field: &'static str,
    pub points: Vec<ComparisonPoint>,
    /// Points whose metric is undefined; drawn as gaps.
    pub undefined_points: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparisonPoint {
    pub company_id: String,
    pub industry: String,
    pub value: Option<f64>,
}

pub fn render_sectors(dataset: &Dataset) -> Result<SectorChart> {
    let aggregates = sector_aggregates(dataset)?;

    let categories = aggregates.iter().map(|a| a.industry.clone()).collect();
    let series = Metric::ALL
        .iter()
        .map(|&metric| ChartSeries {
            metric,
            name: metric.label(),
            values: aggregates.iter().map(|a| a.mean(metric)).collect(),
        })
        .collect();

    Ok(SectorChart {
        title: SECTOR_TITLE,
        categories,
        series,
    })
}

pub fn render_comparison(state: &SelectionState, dataset: &Dataset) -> Result<ComparisonView> {
    if !dataset.has_ratios() {
        return Err(DashboardError::RatiosMissing);
    }

    let selected = select_companies(dataset, state.companies())?;
    if selected.is_empty() {
        return Ok(ComparisonView::NoSelection {
            metric: state.metric,
            chart: state.chart,
        });
    }

    let points: Vec<ComparisonPoint> = selected
        .iter()
        .map(|r| ComparisonPoint {
            company_id: r.company_id.clone(),
            industry: r.industry.clone(),
            value: r.ratio(state.metric),
        })
        .collect();
    let undefined_points = points.iter().filter(|p| p.value.is_none()).count();

    Ok(ComparisonView::Chart(ComparisonChart {
        title: format!("{} by Company", state.metric.label()),
        kind: state.chart,
        metric: state.metric,
        x_field: schema::COMPANY_ID,
        y_field: state.metric.column(),
        color_field: schema::INDUSTRY,
        points,
        undefined_points,
    }))
}

/// One full rendering pass.
pub fn render(state: &SelectionState, dataset: &Dataset) -> Result<DashboardView> {
    Ok(DashboardView {
        sectors: render_sectors(dataset)?,
        comparison: render_comparison(state, dataset)?,
    })
}
