//! Extraction of book attributes from decoded metadata
//!
//! A decoded blob looks like `{attributes: {title, authors: {author}, ...}}`.
//! Any path may be missing or hold a list (several authors); lists are joined
//! with `", "`. Values that cannot be read become `None` rather than errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use plist::Value;
use shelfscope_core::BookRecord;
use std::time::SystemTime;

const TITLE: &[&str] = &["attributes", "title"];
const AUTHOR: &[&str] = &["attributes", "authors", "author"];
const PUBLISHER: &[&str] = &["attributes", "publishers", "publisher"];
const CONTENT_TAG: &[&str] = &["attributes", "content_tags", "tag"];
const PURCHASE_DATE: &[&str] = &["attributes", "purchase_date"];
const PUBLICATION_DATE: &[&str] = &["attributes", "publication_date"];
const ASIN: &[&str] = &["attributes", "ASIN"];

/// Unix timestamp of 2001-01-01T00:00:00Z, the reference date of `NSDate`
const REFERENCE_DATE_UNIX: i64 = 978_307_200;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
];
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Builds a record from a decoded metadata tree
pub fn record_from_metadata(metadata: &Value) -> BookRecord {
    BookRecord {
        title: text_at(metadata, TITLE),
        author: text_at(metadata, AUTHOR),
        publisher: text_at(metadata, PUBLISHER),
        purchase_date: date_at(metadata, PURCHASE_DATE),
        publication_date: date_at(metadata, PUBLICATION_DATE),
        content_tag: text_at(metadata, CONTENT_TAG),
        asin: text_at(metadata, ASIN),
    }
}

/// Collects every value reachable at `path`, descending into lists
fn values_at<'v>(value: &'v Value, path: &[&str], out: &mut Vec<&'v Value>) {
    match (path.split_first(), value) {
        (None, _) => out.push(value),
        (Some((key, rest)), Value::Dictionary(dict)) => {
            if let Some(child) = dict.get(key) {
                values_at(child, rest, out);
            }
        }
        (Some(_), Value::Array(items)) => {
            for item in items {
                values_at(item, path, out);
            }
        }
        _ => {}
    }
}

fn text_at(value: &Value, path: &[&str]) -> Option<String> {
    let mut found = Vec::new();
    values_at(value, path, &mut found);

    let mut parts = Vec::new();
    for value in found {
        push_text(value, &mut parts);
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn push_text(value: &Value, parts: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let text = text.trim();
            if !text.is_empty() && text != "$null" {
                parts.push(text.to_string());
            }
        }
        Value::Integer(n) => {
            if let Some(v) = n.as_signed() {
                parts.push(v.to_string());
            } else if let Some(v) = n.as_unsigned() {
                parts.push(v.to_string());
            }
        }
        Value::Real(v) => parts.push(v.to_string()),
        Value::Boolean(v) => parts.push(v.to_string()),
        Value::Array(items) => {
            for item in items {
                push_text(item, parts);
            }
        }
        _ => {}
    }
}

fn date_at(value: &Value, path: &[&str]) -> Option<NaiveDate> {
    let mut found = Vec::new();
    values_at(value, path, &mut found);
    found.into_iter().find_map(parse_date_value)
}

/// Reads a calendar date from any of the shapes the reader writes
pub fn parse_date_value(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(date) => {
            let time: SystemTime = (*date).into();
            Some(DateTime::<Utc>::from(time).date_naive())
        }
        Value::String(text) => parse_date_text(text),
        Value::Real(seconds) => from_reference_seconds(*seconds),
        Value::Integer(n) => n.as_signed().and_then(|s| from_reference_seconds(s as f64)),
        Value::Dictionary(dict) => dict.get("NS.time").and_then(parse_date_value),
        Value::Array(items) => items.iter().find_map(parse_date_value),
        _ => None,
    }
}

/// Parses a textual timestamp, keeping the calendar date in its own offset
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.date_naive());
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

fn from_reference_seconds(seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() {
        return None;
    }
    let unix = REFERENCE_DATE_UNIX.checked_add(seconds.floor() as i64)?;
    DateTime::from_timestamp(unix, 0).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::decode_keyed_archive;
    use crate::archive::test_support::{metadata_blob, ArchiveBuilder, Attributes};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_from_full_metadata() {
        let blob = metadata_blob(&Attributes {
            title: Some("Spy x Family 1"),
            authors: vec!["Tatsuya Endo"],
            publisher: Some("Shueisha"),
            purchase_date: Some("2024-01-10T08:15:00+0000"),
            publication_date: Some("2019-07-04"),
            tag: Some("comic"),
            asin: Some("B07TX1P5F9"),
        });
        let record = record_from_metadata(&decode_keyed_archive(&blob).unwrap());

        assert_eq!(record.title.as_deref(), Some("Spy x Family 1"));
        assert_eq!(record.author.as_deref(), Some("Tatsuya Endo"));
        assert_eq!(record.publisher.as_deref(), Some("Shueisha"));
        assert_eq!(record.purchase_date, Some(ymd(2024, 1, 10)));
        assert_eq!(record.publication_date, Some(ymd(2019, 7, 4)));
        assert_eq!(record.content_tag.as_deref(), Some("comic"));
        assert_eq!(record.asin.as_deref(), Some("B07TX1P5F9"));
    }

    #[test]
    fn test_multiple_authors_are_joined() {
        let blob = metadata_blob(&Attributes {
            title: Some("Good Omens"),
            authors: vec!["Terry Pratchett", "Neil Gaiman"],
            ..Default::default()
        });
        let record = record_from_metadata(&decode_keyed_archive(&blob).unwrap());

        assert_eq!(
            record.author.as_deref(),
            Some("Terry Pratchett, Neil Gaiman")
        );
    }

    #[test]
    fn test_missing_attributes_are_none() {
        let blob = metadata_blob(&Attributes {
            title: Some("Untagged"),
            ..Default::default()
        });
        let record = record_from_metadata(&decode_keyed_archive(&blob).unwrap());

        assert_eq!(record.title.as_deref(), Some("Untagged"));
        assert!(record.author.is_none());
        assert!(record.publisher.is_none());
        assert!(record.purchase_date.is_none());
        assert!(record.content_tag.is_none());
    }

    #[test]
    fn test_unparseable_date_is_none() {
        let blob = metadata_blob(&Attributes {
            title: Some("Bad date"),
            purchase_date: Some("sometime last spring"),
            ..Default::default()
        });
        let record = record_from_metadata(&decode_keyed_archive(&blob).unwrap());

        assert!(record.purchase_date.is_none());
    }

    #[test]
    fn test_nsdate_purchase_date() {
        let mut builder = ArchiveBuilder::new();
        // 2024-03-05T12:00:00Z
        let date = builder.date(731_332_800.0);
        let attributes = builder.dictionary(vec![("purchase_date", date)]);
        let root = builder.dictionary(vec![("attributes", attributes)]);
        let value = decode_keyed_archive(&builder.finish(root)).unwrap();

        let record = record_from_metadata(&value);
        assert_eq!(record.purchase_date, Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_parse_date_text_formats() {
        assert_eq!(parse_date_text("2024-01-10"), Some(ymd(2024, 1, 10)));
        assert_eq!(parse_date_text("2024/01/10"), Some(ymd(2024, 1, 10)));
        assert_eq!(
            parse_date_text("2024-01-10T23:30:00Z"),
            Some(ymd(2024, 1, 10))
        );
        assert_eq!(
            parse_date_text("2024-01-10T23:30:00.250+09:00"),
            Some(ymd(2024, 1, 10))
        );
        assert_eq!(
            parse_date_text("2024-01-10 23:30:00 +0900"),
            Some(ymd(2024, 1, 10))
        );
        assert_eq!(
            parse_date_text("2024-01-10 23:30:00"),
            Some(ymd(2024, 1, 10))
        );
        assert_eq!(parse_date_text("   "), None);
        assert_eq!(parse_date_text("not a date"), None);
    }

    #[test]
    fn test_date_keeps_source_offset() {
        // Still the 10th in UTC
        assert_eq!(
            parse_date_text("2024-01-11T01:30:00+09:00"),
            Some(ymd(2024, 1, 11))
        );
    }

    #[test]
    fn test_plist_date_value() {
        let time = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_704_844_800);
        let value = Value::Date(time.into());
        assert_eq!(parse_date_value(&value), Some(ymd(2024, 1, 10)));
    }
}
