//! 日期字段转换工具
//!
//! 将自然语言短语或格式化时间字符串解析为存储原生时间戳

use crate::types::DataValue;
use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeDelta, TimeZone, Utc};

/// 带时间的本地格式，按 UTC 解释
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",     // 2024-01-15 14:30:00
    "%Y-%m-%d %H:%M:%S%.f",  // 2024-01-15 14:30:00.123
    "%Y-%m-%d %H:%M",        // 2024-01-15 14:30
    "%Y-%m-%dT%H:%M:%S",     // 2024-01-15T14:30:00
    "%Y-%m-%dT%H:%M:%S%.f",  // 2024-01-15T14:30:00.123
    "%Y-%m-%dT%H:%M",        // 2024-01-15T14:30
    "%Y/%m/%d %H:%M:%S",     // 2024/01/15 14:30:00
    "%Y/%m/%d %H:%M",        // 2024/01/15 14:30
    "%m/%d/%Y %H:%M:%S",     // 01/15/2024 14:30:00
];

/// 仅日期的格式，时间取 00:00:00
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%Y/%m/%d", // 2024/01/15
    "%m/%d/%Y", // 01/15/2024
    "%d-%m-%Y", // 15-01-2024
    "%d.%m.%Y", // 15.01.2024
    "%B %d %Y", // January 15 2024
    "%b %d %Y", // Jan 15 2024
    "%d %B %Y", // 15 January 2024
    "%d %b %Y", // 15 Jan 2024
];

/// 转换为日期值
///
/// 已是时间戳的值原样返回；无法解析时退化为 Unix 纪元
pub fn to_date(value: DataValue) -> DataValue {
    to_date_at(value, Utc::now())
}

/// 以指定的"当前时间"为基准转换，相对时间短语基于 `now` 计算
pub fn to_date_at(value: DataValue, now: DateTime<Utc>) -> DataValue {
    let parsed = match value {
        DataValue::DateTime(dt) => Some(dt),
        DataValue::Int(secs) => Utc.timestamp_opt(secs, 0).single(),
        DataValue::Float(secs) if secs.is_finite() => {
            Utc.timestamp_millis_opt((secs * 1000.0) as i64).single()
        }
        DataValue::String(text) => parse_datetime_str(&text, now),
        _ => None,
    };
    DataValue::DateTime(parsed.unwrap_or_else(epoch))
}

fn epoch() -> DateTime<Utc> {
    // DateTime<Utc> 的默认值即 Unix 纪元
    DateTime::<Utc>::default()
}

/// 解析时间字符串
pub fn parse_datetime_str(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = input.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(secs) = text.strip_prefix('@') {
        return secs
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single());
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    parse_relative(&text.to_ascii_lowercase(), now)
}

fn start_of_day(dt: DateTime<Utc>) -> Option<DateTime<Utc>> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// 自然语言与相对时间：`now`、`today`、`tomorrow +2 hours`、`3 days ago`
fn parse_relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let mut base = now;
    match tokens[0] {
        "now" => {
            tokens.remove(0);
        }
        "today" | "midnight" => {
            base = start_of_day(now)?;
            tokens.remove(0);
        }
        "tomorrow" => {
            base = start_of_day(now.checked_add_signed(TimeDelta::try_days(1)?)?)?;
            tokens.remove(0);
        }
        "yesterday" => {
            base = start_of_day(now.checked_sub_signed(TimeDelta::try_days(1)?)?)?;
            tokens.remove(0);
        }
        _ => {}
    }

    let ago = tokens.last() == Some(&"ago");
    if ago {
        tokens.pop();
    }
    if tokens.len() % 2 != 0 {
        return None;
    }

    let mut result = base;
    for pair in tokens.chunks(2) {
        let amount: i64 = pair[0].trim_start_matches('+').parse().ok()?;
        let amount = if ago { amount.checked_neg()? } else { amount };
        result = apply_offset(result, amount, pair[1])?;
    }
    Some(result)
}

fn apply_offset(dt: DateTime<Utc>, amount: i64, unit: &str) -> Option<DateTime<Utc>> {
    // 超出范围的偏移量返回 None，由调用方退化为纪元
    let delta = match unit.trim_end_matches('s') {
        "sec" | "second" => TimeDelta::try_seconds(amount)?,
        "min" | "minute" => TimeDelta::try_minutes(amount)?,
        "hour" => TimeDelta::try_hours(amount)?,
        "day" => TimeDelta::try_days(amount)?,
        "week" => TimeDelta::try_weeks(amount)?,
        "fortnight" => TimeDelta::try_weeks(amount.checked_mul(2)?)?,
        "month" => return shift_months(dt, amount),
        "year" => return shift_months(dt, amount.checked_mul(12)?),
        _ => return None,
    };
    dt.checked_add_signed(delta)
}

fn shift_months(dt: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        dt.checked_add_months(magnitude)
    } else {
        dt.checked_sub_months(magnitude)
    }
}
