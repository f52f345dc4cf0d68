//! Shared test utilities for the simple-album test suite.
//!
//! Provides fixture builders for stores and listings, lookup helpers and a
//! tiny in-memory PNG so raster tests never touch the network.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = sample_store(&[("a.jpg", 1), ("b.jpg", 2)]);
//! assert_eq!(record_names(store.records()), vec!["a.jpg", "b.jpg"]);
//! ```

use chrono::{DateTime, TimeZone, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::store::PhotoStore;
use crate::types::{PhotoEntry, PhotoRecord, format_timestamp};

// =========================================================================
// Fixtures
// =========================================================================

/// Noon UTC on the given day of January 2024.
pub fn at_day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
}

/// Listing entries `(name, day)` in the given order.
pub fn sample_entries(photos: &[(&str, u32)]) -> Vec<PhotoEntry> {
    photos
        .iter()
        .map(|(name, day)| PhotoEntry {
            name: name.to_string(),
            date: format_timestamp(&at_day(*day)),
        })
        .collect()
}

/// A clean store holding `(name, day)` records in the given order.
pub fn sample_store(photos: &[(&str, u32)]) -> PhotoStore {
    PhotoStore::from_entries(&sample_entries(photos))
}

/// `count` photos named `p00.png`, `p01.png`, ... on consecutive days.
pub fn numbered_store(count: usize) -> PhotoStore {
    let records = (0..count)
        .map(|i| PhotoRecord::new(&format!("p{i:02}.png"), at_day(1 + (i % 28) as u32)))
        .collect();
    PhotoStore::new(records)
}

/// Encode a solid-colour PNG of the given size.
pub fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Filenames in record order.
pub fn record_names(records: &[PhotoRecord]) -> Vec<&str> {
    records.iter().map(|r| r.name()).collect()
}
