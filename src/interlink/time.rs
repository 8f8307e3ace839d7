use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::interlink::error::InterlinkError;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 instant. Offsets are honoured and converted to UTC;
/// timestamps without a zone, and bare dates, are taken to be UTC.
pub fn parse_utc_instant(s: &str) -> Result<DateTime<Utc>, InterlinkError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            InterlinkError::InvalidScanConfig(format!("invalid timestamp '{}'", s))
        })
}
