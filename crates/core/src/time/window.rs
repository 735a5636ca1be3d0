use crate::domain::dates::format_date;
use anyhow::Context;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lookback for fundamental-ratio charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FundamentalPeriod {
    #[serde(rename = "1y")]
    OneYear,
    #[default]
    #[serde(rename = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "all")]
    All,
}

/// Lookback for technical (Q-index) charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TechnicalPeriod {
    #[serde(rename = "3m")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "5y")]
    FiveYears,
}

impl FundamentalPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::ThreeYears => "3y",
            Self::FiveYears => "5y",
            Self::All => "all",
        }
    }

    /// `None` means unbounded.
    pub fn months(self) -> Option<u32> {
        match self {
            Self::OneYear => Some(12),
            Self::ThreeYears => Some(36),
            Self::FiveYears => Some(60),
            Self::All => None,
        }
    }

    /// First date still inside the window, or `None` for `all`.
    pub fn cutoff(self, today: NaiveDate) -> anyhow::Result<Option<NaiveDate>> {
        self.months()
            .map(|m| months_before(today, m))
            .transpose()
    }
}

impl TechnicalPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThreeMonths => "3m",
            Self::SixMonths => "6m",
            Self::OneYear => "1y",
            Self::FiveYears => "5y",
        }
    }

    pub fn months(self) -> u32 {
        match self {
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
            Self::FiveYears => 60,
        }
    }
}

impl FromStr for FundamentalPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(Self::OneYear),
            "3y" => Ok(Self::ThreeYears),
            "5y" => Ok(Self::FiveYears),
            "all" => Ok(Self::All),
            other => anyhow::bail!("unknown fundamental period: {other} (expected 1y, 3y, 5y or all)"),
        }
    }
}

impl FromStr for TechnicalPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "3m" => Ok(Self::ThreeMonths),
            "6m" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            "5y" => Ok(Self::FiveYears),
            other => anyhow::bail!("unknown technical period: {other} (expected 3m, 6m, 1y or 5y)"),
        }
    }
}

impl fmt::Display for FundamentalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TechnicalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[start, end]` query window. `start == None` requests the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn for_fundamental(period: FundamentalPeriod, today: NaiveDate) -> anyhow::Result<Self> {
        Ok(Self {
            start: period.cutoff(today)?,
            end: today,
        })
    }

    pub fn for_technical(period: TechnicalPeriod, today: NaiveDate) -> anyhow::Result<Self> {
        Ok(Self {
            start: Some(months_before(today, period.months())?),
            end: today,
        })
    }

    pub fn start_param(&self) -> Option<String> {
        self.start.map(format_date)
    }

    pub fn end_param(&self) -> String {
        format_date(self.end)
    }

    /// `startDate`/`endDate` query pairs; `startDate` is omitted when unbounded.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::with_capacity(2);
        if let Some(start) = self.start_param() {
            out.push(("startDate", start));
        }
        out.push(("endDate", self.end_param()));
        out
    }

    pub fn contains(&self, d: NaiveDate) -> bool {
        self.start.map_or(true, |s| d >= s) && d <= self.end
    }
}

// Calendar subtraction; days past the end of the target month clamp to its last day.
fn months_before(today: NaiveDate, months: u32) -> anyhow::Result<NaiveDate> {
    today
        .checked_sub_months(Months::new(months))
        .with_context(|| format!("date out of range: {today} minus {months} months"))
}
