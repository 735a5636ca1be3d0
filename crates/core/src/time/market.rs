use crate::domain::dates::parse_date;
use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Resolves the "today" used for window arithmetic.
///
/// An explicit `YYYY-MM-DD` argument wins; otherwise the current instant is shifted into the
/// market's fixed UTC offset and truncated to its calendar date.
pub fn resolve_today(
    today_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_hours: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = today_arg {
        return parse_date(s);
    }

    let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
        .with_context(|| format!("invalid market UTC offset: {utc_offset_hours}h"))?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}
