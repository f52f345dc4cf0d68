//! Shared types used across the editor, the backend client and the exporter.
//!
//! [`PhotoEntry`] is the wire shape exchanged with the photo server;
//! [`PhotoRecord`] is the editor's working copy of one photo.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Path prefix the server exposes photo files under.
pub const PHOTO_URL_PREFIX: &str = "photos/";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid timestamp: {0}")]
    Timestamp(String),
    #[error("Unknown paper size: {0} (expected a4 or letter)")]
    PaperSize(String),
    #[error("Unknown orientation: {0} (expected portrait or landscape)")]
    Orientation(String),
}

/// One photo as listed by `GET /photos-list` and sent to `POST /update-dates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEntry {
    pub name: String,
    pub date: String,
}

/// The editor's working copy of one photo.
///
/// `url` is unique per photo and never changes during a session. Captions
/// are local to the session; the server has no field for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub url: String,
    pub date: DateTime<Utc>,
    pub caption: String,
}

impl PhotoRecord {
    pub fn new(name: &str, date: DateTime<Utc>) -> Self {
        Self {
            url: format!("{PHOTO_URL_PREFIX}{name}"),
            date,
            caption: String::new(),
        }
    }

    /// Build a record from a listing entry.
    pub fn from_entry(entry: &PhotoEntry) -> Result<Self, ParseError> {
        Ok(Self::new(&entry.name, parse_timestamp(&entry.date)?))
    }

    /// Filename: the last path segment of the url.
    pub fn name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }

    /// Wire form used by the update request.
    pub fn to_entry(&self) -> PhotoEntry {
        PhotoEntry {
            name: self.name().to_string(),
            date: format_timestamp(&self.date),
        }
    }
}

/// Parse a timestamp as sent by the server or typed by a user.
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00.000Z`) and naive forms
/// (`2024-05-01 10:00:00`, `2024-05-01T10:00:00`, `2024-05-01T10:00`),
/// which are taken as UTC. A bare date (`2024-05-01`) means midnight.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ParseError::Timestamp(value.to_string()))
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Named paper format. Dimensions are portrait, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Portrait `(width, height)` in millimetres.
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaperSize::A4 => "a4",
            PaperSize::Letter => "letter",
        }
    }
}

impl fmt::Display for PaperSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaperSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" => Ok(PaperSize::Letter),
            other => Err(ParseError::PaperSize(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }

    /// Apply the orientation to a portrait `(width, height)` pair.
    pub fn orient(self, (width, height): (f32, f32)) -> (f32, f32) {
        match self {
            Orientation::Portrait => (width, height),
            Orientation::Landscape => (height, width),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portrait" => Ok(Orientation::Portrait),
            "landscape" => Ok(Orientation::Landscape),
            other => Err(ParseError::Orientation(other.to_string())),
        }
    }
}

/// Physical page size of the exported document, in millimetres.
pub fn page_dimensions(paper: PaperSize, orientation: Orientation) -> (f32, f32) {
    orientation.orient(paper.dimensions_mm())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_from_entry_prefixes_url() {
        let entry = PhotoEntry {
            name: "dawn.jpg".to_string(),
            date: "2023-06-01 08:30:00".to_string(),
        };
        let record = PhotoRecord::from_entry(&entry).unwrap();
        assert_eq!(record.url, "photos/dawn.jpg");
        assert_eq!(record.name(), "dawn.jpg");
        assert_eq!(
            record.date,
            Utc.with_ymd_and_hms(2023, 6, 1, 8, 30, 0).unwrap()
        );
        assert!(record.caption.is_empty());
    }

    #[test]
    fn record_to_entry_uses_iso_format() {
        let record = PhotoRecord::new("a.png", Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(
            record.to_entry(),
            PhotoEntry {
                name: "a.png".to_string(),
                date: "2020-01-02T03:04:05.000Z".to_string(),
            }
        );
    }

    #[test]
    fn parse_timestamp_accepts_rfc3339_with_offset() {
        let dt = parse_timestamp("2024-05-01T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_accepts_datetime_local_input() {
        let dt = parse_timestamp("2024-05-01T10:15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_accepts_bare_date() {
        let dt = parse_timestamp("2024-05-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parse_timestamp_rejects_garbage() {
        assert_eq!(
            parse_timestamp("yesterday"),
            Err(ParseError::Timestamp("yesterday".to_string()))
        );
    }

    #[test]
    fn page_dimensions_swap_for_landscape() {
        assert_eq!(page_dimensions(PaperSize::A4, Orientation::Portrait), (210.0, 297.0));
        assert_eq!(page_dimensions(PaperSize::A4, Orientation::Landscape), (297.0, 210.0));
        assert_eq!(
            page_dimensions(PaperSize::Letter, Orientation::Landscape),
            (279.4, 215.9)
        );
    }

    #[test]
    fn paper_and_orientation_parse_case_insensitively() {
        assert_eq!("Letter".parse::<PaperSize>(), Ok(PaperSize::Letter));
        assert_eq!("LANDSCAPE".parse::<Orientation>(), Ok(Orientation::Landscape));
        assert!("a3".parse::<PaperSize>().is_err());
    }
}
