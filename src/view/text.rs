//! Plain-text rendering of the view model for the terminal.

use super::{ComparisonChart, ComparisonView, DashboardView, SectorChart};
use crate::models::ChartKind;
use crate::utils::{fit, fmt_ratio};
use std::fmt;

const LABEL_WIDTH: usize = 22;
const PLOT_WIDTH: usize = 30;

impl fmt::Display for SectorChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if self.categories.is_empty() {
            return writeln!(f, "  (no records)");
        }

        write!(f, "  {}", fit("Industry", LABEL_WIDTH))?;
        for s in &self.series {
            write!(f, "  {}", s.name)?;
        }
        writeln!(f)?;

        for (i, industry) in self.categories.iter().enumerate() {
            write!(f, "  {}", fit(industry, LABEL_WIDTH))?;
            for s in &self.series {
                write!(f, "  {:>w$}", fmt_ratio(s.values[i]), w = s.name.len())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Horizontal position of `v` on a 0..=PLOT_WIDTH scale.
fn scale(v: f64, max_abs: f64) -> usize {
    if max_abs <= 0.0 {
        return 0;
    }
    ((v.abs() / max_abs) * PLOT_WIDTH as f64).round() as usize
}

fn plot(kind: ChartKind, value: Option<f64>, max_abs: f64, positive_total: f64) -> String {
    let Some(v) = value else {
        return String::new();
    };
    match kind {
        ChartKind::Bar => {
            let glyph = if v < 0.0 { "░" } else { "█" };
            glyph.repeat(scale(v, max_abs).max(1))
        }
        ChartKind::Line => {
            let pos = scale(v, max_abs);
            format!("{}●", "·".repeat(pos))
        }
        ChartKind::Pie if v > 0.0 && positive_total > 0.0 => {
            format!("{:5.1}%", v / positive_total * 100.0)
        }
        ChartKind::Pie => "  -".to_string(),
    }
}

impl fmt::Display for ComparisonChart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.title, self.kind)?;

        let defined = self.points.iter().filter_map(|p| p.value);
        let max_abs = defined.clone().fold(0.0_f64, |m, v| m.max(v.abs()));
        let positive_total: f64 = defined.filter(|v| *v > 0.0).sum();

        for p in &self.points {
            writeln!(
                f,
                "  {} {} {:>10}  {}",
                fit(&p.company_id, 12),
                fit(&p.industry, 16),
                fmt_ratio(p.value),
                plot(self.kind, p.value, max_abs, positive_total),
            )?;
        }

        if self.undefined_points > 0 {
            writeln!(
                f,
                "  {} record(s) have no {} (zero or missing denominator)",
                self.undefined_points, self.y_field
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ComparisonView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonView::NoSelection { metric, chart } => writeln!(
                f,
                "{} by Company [{}]\n  No companies selected. Select one or more companies to compare.",
                metric.label(),
                chart
            ),
            ComparisonView::Chart(chart) => write!(f, "{}", chart),
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sectors)?;
        writeln!(f)?;
        write!(f, "{}", self.comparison)
    }
}
