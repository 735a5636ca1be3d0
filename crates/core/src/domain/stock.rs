use crate::domain::dates::flexible_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: i32,
    pub symbol: String,
    pub name: String,
    pub exchange: Option<String>,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Daily derived indicator row; unique per `(stock_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockQIndex {
    pub id: i32,
    pub stock_id: i32,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub low: Option<f64>,
    pub high: Option<f64>,
    pub close: Option<f64>,
    pub trend_q: Option<f64>,
    pub fq: Option<f64>,
    pub qv1: Option<i64>,
    pub band_down: Option<f64>,
    pub band_up: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QIndexList {
    pub data: Vec<StockQIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QIndexSortField {
    #[default]
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "trendQ")]
    TrendQ,
    #[serde(rename = "fq")]
    Fq,
    #[serde(rename = "qv1")]
    Qv1,
}

impl QIndexSortField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Close => "close",
            Self::TrendQ => "trendQ",
            Self::Fq => "fq",
            Self::Qv1 => "qv1",
        }
    }

    /// Column name in `stock_q_indices`. Only these values are ever interpolated into SQL.
    pub fn column(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Close => "close",
            Self::TrendQ => "trend_q",
            Self::Fq => "fq",
            Self::Qv1 => "qv1",
        }
    }
}

impl FromStr for QIndexSortField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "date" => Ok(Self::Date),
            "close" => Ok(Self::Close),
            "trendQ" | "trend_q" => Ok(Self::TrendQ),
            "fq" => Ok(Self::Fq),
            "qv1" => Ok(Self::Qv1),
            other => anyhow::bail!("unknown sort field: {other}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDir {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => anyhow::bail!("unknown sort direction: {other}"),
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
