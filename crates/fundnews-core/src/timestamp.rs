//! Publish-timestamp normalization.
//!
//! Every accepted input becomes a UTC instant. Anything unparseable becomes
//! `None`; no fabricated fallback such as "now" is ever substituted.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::article::PublishedRaw;

const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Normalize a raw publish timestamp to UTC.
#[must_use]
pub fn normalize_published(raw: &PublishedRaw) -> Option<DateTime<Utc>> {
    match raw {
        PublishedRaw::Epoch(secs) => DateTime::from_timestamp(*secs, 0),
        PublishedRaw::Text(text) => parse_timestamp_str(text),
    }
}

/// Parse an ISO-8601-like, RFC 2822, or epoch-seconds string into UTC.
///
/// Naive date-times (no offset) are interpreted as UTC; a bare date maps to
/// midnight UTC.
#[must_use]
pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let digits = s.strip_prefix('-').unwrap_or(s);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(raw: &PublishedRaw) -> Option<String> {
        normalize_published(raw).map(|dt| dt.to_rfc3339())
    }

    #[test]
    fn epoch_seconds_normalize_to_utc_iso() {
        assert_eq!(
            iso(&PublishedRaw::Epoch(1_700_000_000)).as_deref(),
            Some("2023-11-14T22:13:20+00:00")
        );
    }

    #[test]
    fn epoch_string_is_accepted() {
        assert_eq!(
            iso(&PublishedRaw::Text("1700000000".to_string())).as_deref(),
            Some("2023-11-14T22:13:20+00:00")
        );
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(iso(&PublishedRaw::Text("not-a-date".to_string())), None);
        assert_eq!(iso(&PublishedRaw::Text(String::new())), None);
        assert_eq!(iso(&PublishedRaw::Text("   ".to_string())), None);
    }

    #[test]
    fn out_of_range_epoch_yields_none() {
        assert_eq!(iso(&PublishedRaw::Epoch(i64::MAX)), None);
    }

    #[test]
    fn offset_timestamps_convert_to_utc() {
        assert_eq!(
            parse_timestamp_str("2025-10-27T13:25:00-04:00").map(|d| d.to_rfc3339()),
            Some("2025-10-27T17:25:00+00:00".to_string())
        );
        assert_eq!(
            parse_timestamp_str("2025-10-27T13:25:00Z").map(|d| d.to_rfc3339()),
            Some("2025-10-27T13:25:00+00:00".to_string())
        );
    }

    #[test]
    fn rfc2822_pub_dates_parse() {
        assert_eq!(
            parse_timestamp_str("Mon, 27 Oct 2025 13:25:00 GMT").map(|d| d.to_rfc3339()),
            Some("2025-10-27T13:25:00+00:00".to_string())
        );
        assert_eq!(
            parse_timestamp_str("Mon, 27 Oct 2025 09:25:00 -0400").map(|d| d.to_rfc3339()),
            Some("2025-10-27T13:25:00+00:00".to_string())
        );
    }

    #[test]
    fn naive_values_are_treated_as_utc() {
        assert_eq!(
            parse_timestamp_str("2025-10-27 13:25:00").map(|d| d.to_rfc3339()),
            Some("2025-10-27T13:25:00+00:00".to_string())
        );
        assert_eq!(
            parse_timestamp_str("2025-10-27").map(|d| d.to_rfc3339()),
            Some("2025-10-27T00:00:00+00:00".to_string())
        );
    }
}
