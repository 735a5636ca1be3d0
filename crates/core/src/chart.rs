//! Label/dataset assembly for fundamental charts.
//!
//! Missing metric values are plotted as 0 so every dataset stays positionally aligned with
//! the labels.

use crate::aggregate::ViewMode;
use crate::domain::records::{EpsRecord, FinancialRatioRecord, PeRecord, ReportDated, RoaRoeRecord};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// Metric families that know how to lay themselves out as a chart.
pub trait ChartSeries: ReportDated + Sized {
    fn datasets(records: &[Self]) -> Vec<Dataset>;
}

pub fn period_label(date: NaiveDate, view: ViewMode) -> String {
    match view {
        ViewMode::Quarter => format!("Q{}/{}", date.month0() / 3 + 1, date.year()),
        ViewMode::Year => date.year().to_string(),
    }
}

pub fn build_chart<T: ChartSeries>(records: &[T], view: ViewMode) -> ChartData {
    ChartData {
        labels: records
            .iter()
            .map(|r| period_label(r.report_date(), view))
            .collect(),
        datasets: T::datasets(records),
    }
}

fn series<T>(
    label: &str,
    kind: SeriesKind,
    records: &[T],
    value: impl Fn(&T) -> Option<f64>,
) -> Dataset {
    Dataset {
        label: label.to_string(),
        kind,
        data: records.iter().map(|r| value(r).unwrap_or(0.0)).collect(),
    }
}

/// Percentage by which `pe` sits above (or below) the industry PE.
fn pe_premium(r: &PeRecord) -> Option<f64> {
    match (r.pe, r.industry_pe) {
        (Some(pe), Some(industry)) if industry != 0.0 => Some((pe - industry) / industry * 100.0),
        _ => None,
    }
}

impl ChartSeries for EpsRecord {
    fn datasets(records: &[Self]) -> Vec<Dataset> {
        vec![
            series("EPS", SeriesKind::Bar, records, |r| r.eps),
            series("Industry EPS", SeriesKind::Bar, records, |r| r.industry_eps),
            series("EPS growth (%)", SeriesKind::Line, records, |r| r.eps_growth),
            series("Industry EPS growth (%)", SeriesKind::Line, records, |r| {
                r.industry_eps_growth
            }),
        ]
    }
}

impl ChartSeries for PeRecord {
    fn datasets(records: &[Self]) -> Vec<Dataset> {
        vec![
            series("P/E", SeriesKind::Bar, records, |r| r.pe),
            series("Industry P/E", SeriesKind::Bar, records, |r| r.industry_pe),
            series("P/E premium vs industry (%)", SeriesKind::Line, records, pe_premium),
        ]
    }
}

impl ChartSeries for RoaRoeRecord {
    fn datasets(records: &[Self]) -> Vec<Dataset> {
        vec![
            series("ROA (%)", SeriesKind::Bar, records, |r| r.roa),
            series("Industry ROA (%)", SeriesKind::Bar, records, |r| r.industry_roa),
            series("ROE (%)", SeriesKind::Line, records, |r| r.roe),
            series("Industry ROE (%)", SeriesKind::Line, records, |r| r.industry_roe),
        ]
    }
}

impl ChartSeries for FinancialRatioRecord {
    fn datasets(records: &[Self]) -> Vec<Dataset> {
        vec![
            series("Debt/Equity", SeriesKind::Bar, records, |r| r.debt_to_equity),
            series("Industry Debt/Equity", SeriesKind::Bar, records, |r| {
                r.industry_debt_to_equity
            }),
            series("Debt/Assets (%)", SeriesKind::Line, records, |r| r.debt_to_assets),
            series("Industry Debt/Assets (%)", SeriesKind::Line, records, |r| {
                r.industry_debt_to_assets
            }),
        ]
    }
}
