//! Window filtering and quarter/year bucketing for fundamental records.

use crate::domain::records::ReportDated;
use crate::time::window::FundamentalPeriod;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Quarter,
    Year,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl FromStr for ViewMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarter" | "q" => Ok(Self::Quarter),
            "year" | "y" => Ok(Self::Year),
            other => anyhow::bail!("unknown view mode: {other} (expected quarter or year)"),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drops records reported strictly before the period cutoff. `all` keeps everything.
pub fn filter_by_period<T: ReportDated>(
    records: Vec<T>,
    period: FundamentalPeriod,
    today: NaiveDate,
) -> anyhow::Result<Vec<T>> {
    let Some(cutoff) = period.cutoff(today)? else {
        return Ok(records);
    };
    Ok(records
        .into_iter()
        .filter(|r| r.report_date() >= cutoff)
        .collect())
}

/// Quarter view passes records through in input order. Year view keeps the latest report of
/// each calendar year and returns them ascending by date; on equal dates the later input wins.
pub fn reduce_by_view<T: ReportDated>(records: Vec<T>, view: ViewMode) -> Vec<T> {
    match view {
        ViewMode::Quarter => records,
        ViewMode::Year => {
            let mut by_year: BTreeMap<i32, T> = BTreeMap::new();
            for record in records {
                let year = record.report_date().year();
                let keep_current = by_year
                    .get(&year)
                    .is_some_and(|best| best.report_date() > record.report_date());
                if !keep_current {
                    by_year.insert(year, record);
                }
            }
            // One record per year, so year order is date order.
            by_year.into_values().collect()
        }
    }
}

pub fn aggregate<T: ReportDated>(
    records: Vec<T>,
    period: FundamentalPeriod,
    view: ViewMode,
    today: NaiveDate,
) -> anyhow::Result<Vec<T>> {
    let filtered = filter_by_period(records, period, today)?;
    Ok(reduce_by_view(filtered, view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Rec {
        tag: &'static str,
        date: NaiveDate,
    }

    impl ReportDated for Rec {
        fn report_date(&self) -> NaiveDate {
            self.date
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rec(tag: &'static str, date: NaiveDate) -> Rec {
        Rec { tag, date }
    }

    fn sample() -> Vec<Rec> {
        vec![
            rec("a", d(2021, 6, 1)),
            rec("b", d(2021, 11, 1)),
            rec("c", d(2022, 2, 1)),
        ]
    }

    fn tags(v: &[Rec]) -> Vec<&'static str> {
        v.iter().map(|r| r.tag).collect()
    }

    #[test]
    fn year_view_over_all_keeps_latest_per_year() {
        let out = aggregate(sample(), FundamentalPeriod::All, ViewMode::Year, d(2022, 7, 1)).unwrap();
        assert_eq!(tags(&out), vec!["b", "c"]);
    }

    #[test]
    fn quarter_view_one_year_drops_older_reports() {
        let out =
            aggregate(sample(), FundamentalPeriod::OneYear, ViewMode::Quarter, d(2022, 7, 1)).unwrap();
        assert_eq!(tags(&out), vec!["c"]);
    }

    #[test]
    fn all_period_is_identity() {
        let input = vec![rec("z", d(1999, 1, 1)), rec("y", d(2030, 1, 1))];
        let out = filter_by_period(input.clone(), FundamentalPeriod::All, d(2022, 7, 1)).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn cutoff_is_inclusive() {
        let input = vec![rec("before", d(2019, 6, 30)), rec("on", d(2019, 7, 1))];
        let out = filter_by_period(input, FundamentalPeriod::ThreeYears, d(2022, 7, 1)).unwrap();
        assert_eq!(tags(&out), vec!["on"]);
    }

    #[test]
    fn filtered_records_respect_every_cutoff() {
        let today = d(2022, 7, 1);
        let input: Vec<Rec> = (2015..=2022)
            .flat_map(|y| [rec("q1", d(y, 3, 31)), rec("q3", d(y, 9, 30))])
            .collect();
        for period in [
            FundamentalPeriod::OneYear,
            FundamentalPeriod::ThreeYears,
            FundamentalPeriod::FiveYears,
        ] {
            let cutoff = period.cutoff(today).unwrap().unwrap();
            let out = filter_by_period(input.clone(), period, today).unwrap();
            assert!(!out.is_empty());
            assert!(out.iter().all(|r| r.date >= cutoff), "{period}");
        }
    }

    #[test]
    fn quarter_view_preserves_unsorted_input_order() {
        let input = vec![
            rec("c", d(2022, 2, 1)),
            rec("a", d(2021, 6, 1)),
            rec("b", d(2021, 11, 1)),
        ];
        let out = reduce_by_view(input.clone(), ViewMode::Quarter);
        assert_eq!(out, input);
    }

    #[test]
    fn year_view_sorts_unsorted_input_and_picks_max() {
        let input = vec![
            rec("c", d(2022, 2, 1)),
            rec("b", d(2021, 11, 1)),
            rec("e", d(2020, 12, 31)),
            rec("a", d(2021, 6, 1)),
            rec("d", d(2022, 1, 15)),
        ];
        let out = reduce_by_view(input, ViewMode::Year);
        assert_eq!(tags(&out), vec!["e", "b", "c"]);
    }

    #[test]
    fn year_view_tie_goes_to_later_input() {
        let input = vec![rec("first", d(2021, 12, 31)), rec("second", d(2021, 12, 31))];
        let out = reduce_by_view(input, ViewMode::Year);
        assert_eq!(tags(&out), vec!["second"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let today = d(2022, 7, 1);
        let a = aggregate(sample(), FundamentalPeriod::FiveYears, ViewMode::Year, today).unwrap();
        let b = aggregate(sample(), FundamentalPeriod::FiveYears, ViewMode::Year, today).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn parses_view_modes() {
        assert_eq!("Year".parse::<ViewMode>().unwrap(), ViewMode::Year);
        assert_eq!("quarter".parse::<ViewMode>().unwrap(), ViewMode::Quarter);
        assert!("month".parse::<ViewMode>().is_err());
    }
}
