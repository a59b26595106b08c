use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

/// Always written as RFC 3339
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(de::Error::custom)
}

/// Parse an RFC 3339 timestamp, a naive datetime (UTC) or a `YYYY-MM-DD` date
/// (midnight UTC).
pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(format!(
        "invalid date '{}': expected RFC 3339 or YYYY-MM-DD",
        raw
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_keeps_instant() {
        let dt = parse("2020-01-01T05:00:00+05:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_and_date() {
        assert_eq!(
            parse("2021-06-15T12:30:00").unwrap().to_rfc3339(),
            "2021-06-15T12:30:00+00:00"
        );
        assert_eq!(
            parse("2021-06-15T12:30:00.250").unwrap().to_rfc3339(),
            "2021-06-15T12:30:00.250+00:00"
        );
        assert_eq!(
            parse("2021-06-15").unwrap().to_rfc3339(),
            "2021-06-15T00:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("yesterday").is_err());
        assert!(parse("2021-13-40").is_err());
    }
}
