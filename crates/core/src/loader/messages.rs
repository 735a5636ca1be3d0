use crate::client::ServiceError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Vi,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "vi" => Ok(Self::Vi),
            other => anyhow::bail!("unsupported locale: {other} (expected en or vi)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    Stock,
    QIndices,
    Eps,
    Pe,
    RoaRoe,
    FinancialRatios,
    Posts,
    Setting,
}

impl DataKind {
    fn noun(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, Self::Stock) => "stock information",
            (Locale::En, Self::QIndices) => "technical indicators",
            (Locale::En, Self::Eps) => "EPS data",
            (Locale::En, Self::Pe) => "P/E data",
            (Locale::En, Self::RoaRoe) => "ROA/ROE data",
            (Locale::En, Self::FinancialRatios) => "financial ratios",
            (Locale::En, Self::Posts) => "news",
            (Locale::En, Self::Setting) => "settings",
            (Locale::Vi, Self::Stock) => "thông tin cổ phiếu",
            (Locale::Vi, Self::QIndices) => "chỉ báo kỹ thuật",
            (Locale::Vi, Self::Eps) => "dữ liệu EPS",
            (Locale::Vi, Self::Pe) => "dữ liệu P/E",
            (Locale::Vi, Self::RoaRoe) => "dữ liệu ROA/ROE",
            (Locale::Vi, Self::FinancialRatios) => "chỉ số tài chính",
            (Locale::Vi, Self::Posts) => "tin tức",
            (Locale::Vi, Self::Setting) => "cấu hình",
        }
    }
}

pub fn load_failed(locale: Locale, kind: DataKind) -> String {
    match locale {
        Locale::En => format!("Could not load {}. Please reload the page.", kind.noun(locale)),
        Locale::Vi => format!("Không thể tải {}. Vui lòng tải lại trang.", kind.noun(locale)),
    }
}

pub fn stock_not_found(locale: Locale, symbol: &str) -> String {
    match locale {
        Locale::En => format!("Stock {symbol} was not found."),
        Locale::Vi => format!("Không tìm thấy mã cổ phiếu {symbol}."),
    }
}

/// Inline message for a failed fetch, distinguishing a missing stock from other failures.
pub fn for_error(locale: Locale, kind: DataKind, symbol: &str, err: &anyhow::Error) -> String {
    let not_found = err
        .downcast_ref::<ServiceError>()
        .is_some_and(ServiceError::is_not_found);
    if kind == DataKind::Stock && not_found {
        stock_not_found(locale, symbol)
    } else {
        load_failed(locale, kind)
    }
}
