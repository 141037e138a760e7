/*
Pretty printing of an analysis result as terminal tables.
*/
use crate::numerical::analysis::AnalysisResult;
use crate::numerical::critical_points::CriticalPoint;
use crate::numerical::roots::RootSet;
use crate::numerical::statistics::Statistics;
use itertools::Itertools;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Integer when within 1e-10 of one, otherwise 6 decimals.
pub fn format_root(x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() < 1e-10 {
        format!("{}", nearest as i64)
    } else {
        format!("{:.6}", x)
    }
}

/// `(x, y)` with 4 decimals
pub fn format_critical_point(point: &CriticalPoint) -> String {
    // + 0.0 turns -0.0 into 0.0
    format!("({:.4}, {:.4})", point.x + 0.0, point.y + 0.0)
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct SummaryRow {
    #[tabled(rename = "f(x)")]
    pub function: String,
    pub roots: String,
    #[tabled(rename = "root search")]
    pub tier: String,
    #[tabled(rename = "critical points")]
    pub critical_points: String,
    #[tabled(rename = "integral at x_max")]
    pub integral: String,
    #[tabled(rename = "integral gaps")]
    pub gaps: usize,
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct StatisticsRow {
    pub quantity: String,
    pub value: String,
}

fn roots_cell(roots: &RootSet) -> (String, String) {
    let tier = if roots.is_exact() { "exact" } else { "approximate" };
    let values = if roots.is_empty() {
        "none".to_string()
    } else {
        roots.values().iter().map(|&x| format_root(x)).join(", ")
    };
    (values, tier.to_string())
}

pub fn summary_rows(result: &AnalysisResult) -> Vec<SummaryRow> {
    result
        .series
        .iter()
        .enumerate()
        .map(|(i, series)| {
            let (roots, tier) = match result.roots.as_ref().and_then(|r| r.get(i)) {
                Some(roots) => roots_cell(roots),
                None => ("-".to_string(), "-".to_string()),
            };
            let critical_points = match result.critical_points.as_ref().and_then(|c| c.get(i)) {
                Some(points) if points.is_empty() => "none".to_string(),
                Some(points) => points.iter().map(format_critical_point).join(", "),
                None => "-".to_string(),
            };
            let integral = match series.integral.values.last() {
                Some(Some(value)) => format!("{:.6}", value),
                _ => "gap".to_string(),
            };
            SummaryRow {
                function: series.expression.text().to_string(),
                roots,
                tier,
                critical_points,
                integral,
                gaps: series.integral.failures.len(),
            }
        })
        .collect()
}

pub fn statistics_rows(result: &AnalysisResult, statistics: &Statistics) -> Vec<StatisticsRow> {
    let row = |quantity: String, value: f64| StatisticsRow {
        quantity,
        value: format!("{:.6}", value),
    };
    let mut rows = vec![
        row("max".to_string(), statistics.max),
        row("min".to_string(), statistics.min),
        row("mean".to_string(), statistics.mean),
        row("std".to_string(), statistics.std_dev),
    ];
    for (series, area) in result.series.iter().zip(&statistics.areas) {
        rows.push(row(format!("area of {}", series.expression.text()), *area));
    }
    rows.push(row("total area".to_string(), statistics.total_area));
    rows
}

/// Both tables, ready to print.
pub fn render(result: &AnalysisResult) -> String {
    let mut summary = Table::new(summary_rows(result));
    summary.with(Style::modern_rounded());
    let mut output = format!(
        "Analysis on [{}, {}], {} samples, derivative order {}\n{}\n",
        result.domain.x_min(),
        result.domain.x_max(),
        result.domain.samples(),
        result.order.get(),
        summary
    );
    if let Some(statistics) = &result.statistics {
        let mut table = Table::new(statistics_rows(result, statistics));
        table.with(Style::modern_rounded());
        output.push_str(&format!("Statistics\n{}\n", table));
    }
    output
}
