use crate::domain::dates::flexible_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A fundamental record reported for a specific date.
pub trait ReportDated {
    fn report_date(&self) -> NaiveDate;
}

macro_rules! impl_report_dated {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ReportDated for $ty {
                fn report_date(&self) -> NaiveDate {
                    self.report_date
                }
            }
        )+
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EpsRecord {
    pub id: i32,
    pub symbol: String,
    #[serde(with = "flexible_date")]
    pub report_date: NaiveDate,
    pub eps: Option<f64>,
    pub industry_eps: Option<f64>,
    pub eps_growth: Option<f64>,
    pub industry_eps_growth: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PeRecord {
    pub id: i32,
    pub symbol: String,
    #[serde(with = "flexible_date")]
    pub report_date: NaiveDate,
    pub pe: Option<f64>,
    pub industry_pe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoaRoeRecord {
    pub id: i32,
    pub symbol: String,
    #[serde(with = "flexible_date")]
    pub report_date: NaiveDate,
    pub roa: Option<f64>,
    pub industry_roa: Option<f64>,
    pub roe: Option<f64>,
    pub industry_roe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRatioRecord {
    pub id: i32,
    pub symbol: String,
    #[serde(with = "flexible_date")]
    pub report_date: NaiveDate,
    pub debt_to_equity: Option<f64>,
    pub industry_debt_to_equity: Option<f64>,
    pub debt_to_assets: Option<f64>,
    pub industry_debt_to_assets: Option<f64>,
}

impl_report_dated!(EpsRecord, PeRecord, RoaRoeRecord, FinancialRatioRecord);

/// One page of a paginated listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, page: i64, page_size: i64, total: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            data,
            page,
            page_size,
            total,
            total_pages,
        }
    }
}
