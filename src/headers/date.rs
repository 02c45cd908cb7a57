//! HTTP-date handling.
//!
//! Strict HTTP-date parsing (IMF-fixdate with the two obsolete forms) for
//! header fields, and the loose cookie-date algorithm of RFC 6265 §5.1.1
//! used by Set-Cookie's Expires attribute.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

pub const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";
const RFC850_DATE: &str = "%A, %d-%b-%y %H:%M:%S GMT";
const ASCTIME_DATE: &str = "%a %b %e %H:%M:%S %Y";

/// Parse an HTTP-date into seconds since the epoch.
pub fn parse_http_date(value: &str) -> Option<i64> {
    [IMF_FIXDATE, RFC850_DATE, ASCTIME_DATE]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
}

/// Format seconds since the epoch as an IMF-fixdate.
pub fn format_http_date(secs: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.format(IMF_FIXDATE).to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieDateError {
    #[error("didn't have a: {0}")]
    Missing(String),

    #[error("{value} is out of range for {field}")]
    OutOfRange { value: u32, field: &'static str },

    #[error("not a calendar date")]
    NotADate,
}

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn is_delimiter(c: char) -> bool {
    matches!(c, '\x09' | '\x20'..='\x2F' | '\x3B'..='\x40' | '\x5B'..='\x60' | '\x7B'..='\x7E')
}

/// Leading run of `min..=max` digits; the run must not continue past `max`.
fn leading_digits(s: &str, min: usize, max: usize) -> Option<(u32, &str)> {
    let len = s.bytes().take_while(|b| b.is_ascii_digit()).count();
    if len < min || len > max {
        return None;
    }
    let value = s[..len].parse().ok()?;
    Some((value, &s[len..]))
}

fn match_time(token: &str) -> Option<(u32, u32, u32)> {
    let (hour, rest) = leading_digits(token, 1, 2)?;
    let (minute, rest) = leading_digits(rest.strip_prefix(':')?, 1, 2)?;
    let (second, _) = leading_digits(rest.strip_prefix(':')?, 1, 2)?;
    Some((hour, minute, second))
}

fn match_month(token: &str) -> Option<u32> {
    let prefix = token.get(..3)?.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|i| i as u32 + 1)
}

/// RFC 6265 §5.1.1 cookie-date parsing, returning seconds since the epoch.
pub fn parse_cookie_date(value: &str) -> Result<i64, CookieDateError> {
    let mut time = None;
    let mut day = None;
    let mut month = None;
    let mut year = None;

    for token in value.split(is_delimiter).filter(|t| !t.is_empty()) {
        if time.is_none() {
            if let Some(t) = match_time(token) {
                time = Some(t);
                continue;
            }
        }
        if day.is_none() {
            if let Some((d, _)) = leading_digits(token, 1, 2) {
                day = Some(d);
                continue;
            }
        }
        if month.is_none() {
            if let Some(m) = match_month(token) {
                month = Some(m);
                continue;
            }
        }
        if year.is_none() {
            if let Some((y, _)) = leading_digits(token, 2, 4) {
                year = Some(y);
                continue;
            }
        }
    }

    let year = year.map(|y| match y {
        70..=99 => y + 1900,
        0..=69 => y + 2000,
        _ => y,
    });

    let (Some((hour, minute, second)), Some(day), Some(month), Some(year)) =
        (time, day, month, year)
    else {
        let missing: Vec<&str> = [
            ("time", time.is_none()),
            ("day", day.is_none()),
            ("month", month.is_none()),
            ("year", year.is_none()),
        ]
        .iter()
        .filter(|(_, absent)| *absent)
        .map(|(name, _)| *name)
        .collect();
        return Err(CookieDateError::Missing(missing.join(",")));
    };

    if !(1..=31).contains(&day) {
        return Err(CookieDateError::OutOfRange { value: day, field: "day_of_month" });
    }
    if year < 1601 {
        return Err(CookieDateError::OutOfRange { value: year, field: "year" });
    }
    if hour > 23 {
        return Err(CookieDateError::OutOfRange { value: hour, field: "hour" });
    }
    if minute > 59 {
        return Err(CookieDateError::OutOfRange { value: minute, field: "minute" });
    }
    if second > 59 {
        return Err(CookieDateError::OutOfRange { value: second, field: "second" });
    }

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or(CookieDateError::NotADate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_date_forms() {
        let expected = 784111777;
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(expected));
        assert_eq!(parse_http_date("Sun Nov  6 08:49:37 1994"), Some(expected));
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(
            format_http_date(784111777).as_deref(),
            Some("Sun, 06 Nov 1994 08:49:37 GMT")
        );
    }

    #[test]
    fn test_cookie_date() {
        assert_eq!(parse_cookie_date("Wed, 09 Jun 2021 10:18:14 GMT"), Ok(1623233894));
        assert_eq!(parse_cookie_date("Wed, 9 Jun 2021 10:18:14 GMT"), Ok(1623233894));
        assert_eq!(parse_cookie_date("Sun, 06 Nov 1994 08:49:37 GMT"), Ok(784111777));
        assert_eq!(parse_cookie_date("06-Nov-94 08:49:37"), Ok(784111777));
    }

    #[test]
    fn test_cookie_date_errors() {
        assert_eq!(
            parse_cookie_date("Wed, 09 Jun 10:18:14"),
            Err(CookieDateError::Missing("year".to_string()))
        );
        assert_eq!(
            parse_cookie_date("garbage"),
            Err(CookieDateError::Missing("time,day,month,year".to_string()))
        );
        assert!(matches!(
            parse_cookie_date("Wed, 09 Jun 2021 25:18:14 GMT"),
            Err(CookieDateError::OutOfRange { field: "hour", .. })
        ));
        assert_eq!(
            parse_cookie_date("31 Feb 2021 10:18:14"),
            Err(CookieDateError::NotADate)
        );
    }
}
