use anyhow::Context;
use chrono::{DateTime, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses either a bare `YYYY-MM-DD` date or an RFC 3339 timestamp, keeping the calendar date
/// as written in the timestamp's own offset.
pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(d);
    }
    let ts = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("expected YYYY-MM-DD or RFC 3339 timestamp, got {s:?}"))?;
    Ok(ts.date_naive())
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// serde adapter for `NaiveDate` fields that may arrive as timestamps.
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_date(*d))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        assert_eq!(parse_date("2022-02-01").unwrap(), expected);
        assert_eq!(parse_date("2022-02-01T00:00:00.000Z").unwrap(), expected);
        assert_eq!(parse_date(" 2022-02-01T23:30:00+07:00 ").unwrap(), expected);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("01/02/2022").is_err());
        assert!(parse_date("").is_err());
    }
}
