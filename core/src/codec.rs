//! Conversions between typed values and the platform's all-strings wire format.
//!
//! # Design
//! The API transmits every scalar as a JSON string: ids, quantities and
//! timestamps alike. Each logical type gets one `parse_*` / `format_*` pair
//! here and every reader and the webhook parser goes through them, so the
//! empty-string and timezone rules live in exactly one place.
//!
//! - Required fields reject the empty string with `ParseErrorKind::Empty`.
//! - Optional fields map the empty string to the zero value (`0`, `None`).
//! - Timestamps carry no offset on the wire and are always read as
//!   Asia/Tokyo civil time via [`JST`], independent of the host zone.
//! - A JSON `null` reads the same as a missing key: see [`null_as_default`].

use std::num::ParseIntError;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer};

use crate::error::{ParseError, ParseErrorKind};

/// Wire layout of every timestamp, e.g. `2022-02-01 01:23:21`.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Asia/Tokyo. Japan has observed UTC+9 without daylight saving since 1951.
pub const JST: FixedOffset = match FixedOffset::east_opt(9 * 3600) {
    Some(offset) => offset,
    None => panic!("UTC+9 is a valid offset"),
};

/// Deserialize `null` as `T::default()`.
///
/// For wire fields: `null` becomes `""` and a null list becomes empty, so
/// both then follow the usual required/optional rules.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn error(field: &'static str, raw: &str, kind: ParseErrorKind) -> ParseError {
    ParseError {
        field,
        value: raw.to_string(),
        kind,
    }
}

fn parse_int<T>(field: &'static str, raw: &str) -> Result<T, ParseError>
where
    T: FromStr<Err = ParseIntError>,
{
    raw.parse::<T>()
        .map_err(|e| error(field, raw, ParseErrorKind::Integer(e)))
}

fn require(field: &'static str, raw: &str) -> Result<(), ParseError> {
    if raw.is_empty() {
        return Err(error(field, raw, ParseErrorKind::Empty));
    }
    Ok(())
}

/// Parse a required non-negative identifier.
pub fn parse_id(field: &'static str, raw: &str) -> Result<u64, ParseError> {
    require(field, raw)?;
    parse_int(field, raw)
}

/// Parse an optional identifier; `""` is `0`.
pub fn parse_optional_id(field: &'static str, raw: &str) -> Result<u64, ParseError> {
    if raw.is_empty() {
        return Ok(0);
    }
    parse_int(field, raw)
}

/// Parse a required signed quantity (stock amounts and deltas).
pub fn parse_quantity(field: &'static str, raw: &str) -> Result<i64, ParseError> {
    require(field, raw)?;
    parse_int(field, raw)
}

/// Parse an optional signed quantity; `""` is `0`.
pub fn parse_optional_quantity(field: &'static str, raw: &str) -> Result<i64, ParseError> {
    if raw.is_empty() {
        return Ok(0);
    }
    parse_int(field, raw)
}

/// Parse a required `YYYY-MM-DD HH:MM:SS` timestamp in Tokyo time.
pub fn parse_date_time(field: &'static str, raw: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    require(field, raw)?;
    let naive = NaiveDateTime::parse_from_str(raw, DATE_TIME_FORMAT)
        .map_err(|e| error(field, raw, ParseErrorKind::DateTime(e)))?;
    JST.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| error(field, raw, ParseErrorKind::OutOfRange))
}

/// Parse an optional timestamp; `""` is `None`.
pub fn parse_optional_date_time(
    field: &'static str,
    raw: &str,
) -> Result<Option<DateTime<FixedOffset>>, ParseError> {
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date_time(field, raw).map(Some)
}

pub fn format_id(value: u64) -> String {
    value.to_string()
}

pub fn format_quantity(value: i64) -> String {
    value.to_string()
}

/// Render a timestamp in the wire layout, converted to Tokyo time first.
pub fn format_date_time<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    value.with_timezone(&JST).format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike, Utc};

    use super::*;

    #[test]
    fn id_round_trips() {
        for raw in ["0", "1", "42", "18446744073709551615"] {
            let parsed = parse_id("productId", raw).unwrap();
            assert_eq!(format_id(parsed), raw);
        }
    }

    #[test]
    fn quantity_round_trips_including_negative() {
        for raw in ["0", "7", "-3", "9223372036854775807", "-9223372036854775808"] {
            let parsed = parse_quantity("amount", raw).unwrap();
            assert_eq!(format_quantity(parsed), raw);
        }
    }

    #[test]
    fn required_id_rejects_empty() {
        let err = parse_id("storeId", "").unwrap_err();
        assert_eq!(err.field, "storeId");
        assert_eq!(err.kind, ParseErrorKind::Empty);
    }

    #[test]
    fn optional_fields_map_empty_to_zero() {
        assert_eq!(parse_optional_id("fromStoreId", "").unwrap(), 0);
        assert_eq!(parse_optional_quantity("stockAmount", "").unwrap(), 0);
        assert_eq!(parse_optional_date_time("updDateTime", "").unwrap(), None);
    }

    #[test]
    fn optional_fields_still_reject_garbage() {
        let err = parse_optional_quantity("stockAmount", "12x").unwrap_err();
        assert_eq!(err.field, "stockAmount");
        assert_eq!(err.value, "12x");
        assert!(matches!(err.kind, ParseErrorKind::Integer(_)));
    }

    #[test]
    fn id_rejects_negative() {
        let err = parse_id("productId", "-1").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Integer(_)));
    }

    #[test]
    fn id_rejects_overflow() {
        let err = parse_id("productId", "18446744073709551616").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Integer(_)));
    }

    #[test]
    fn date_time_is_read_in_tokyo() {
        let parsed = parse_date_time("updDateTime", "2022-02-01 01:23:21").unwrap();
        assert_eq!(parsed.offset(), &JST);
        assert_eq!((parsed.year(), parsed.month(), parsed.day()), (2022, 2, 1));
        assert_eq!((parsed.hour(), parsed.minute(), parsed.second()), (1, 23, 21));

        let utc = parsed.with_timezone(&Utc);
        assert_eq!(utc.to_rfc3339(), "2022-01-31T16:23:21+00:00");
    }

    #[test]
    fn date_time_round_trips() {
        let raw = "2021-12-31 23:59:59";
        let parsed = parse_date_time("updDateTime", raw).unwrap();
        assert_eq!(format_date_time(&parsed), raw);
    }

    #[test]
    fn format_date_time_converts_other_zones() {
        let utc = Utc.with_ymd_and_hms(2022, 1, 31, 16, 23, 21).unwrap();
        assert_eq!(format_date_time(&utc), "2022-02-01 01:23:21");
    }

    #[test]
    fn date_time_rejects_iso_layout() {
        let err = parse_date_time("updDateTime", "2022-02-01T01:23:21").unwrap_err();
        assert_eq!(err.value, "2022-02-01T01:23:21");
        assert!(matches!(err.kind, ParseErrorKind::DateTime(_)));
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Nullable {
        #[serde(deserialize_with = "null_as_default")]
        name: String,
        #[serde(deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn null_reads_as_default() {
        let value: Nullable = serde_json::from_str(r#"{"name":null,"tags":null}"#).unwrap();
        assert_eq!(value.name, "");
        assert!(value.tags.is_empty());

        let value: Nullable = serde_json::from_str(r#"{"name":"a","tags":["b"]}"#).unwrap();
        assert_eq!(value.name, "a");
        assert_eq!(value.tags, ["b"]);

        let value: Nullable = serde_json::from_str("{}").unwrap();
        assert_eq!(value.name, "");
    }

    #[test]
    fn null_does_not_accept_other_types() {
        assert!(serde_json::from_str::<Nullable>(r#"{"name":7}"#).is_err());
    }

    #[test]
    fn required_date_time_rejects_empty() {
        let err = parse_date_time("updDateTime", "").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Empty);
    }
}
