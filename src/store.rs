//! In-memory photo store: the editor's working copy of the server's list.
//!
//! Records keep insertion (server) order until a successful save sorts
//! them by date. Any edit to a date sets the dirty flag; only a
//! successful save clears it. Caption edits are local and never make the
//! store dirty because the server has nowhere to put them.

use crate::types::{PhotoEntry, PhotoRecord};
use chrono::{DateTime, Utc};

/// Date given to photos whose listed date can't be read.
pub const UNKNOWN_DATE: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

#[derive(Debug, Default, Clone)]
pub struct PhotoStore {
    records: Vec<PhotoRecord>,
    dirty: bool,
}

impl PhotoStore {
    pub fn new(records: Vec<PhotoRecord>) -> Self {
        Self {
            records,
            dirty: false,
        }
    }

    /// Build a store from a listing. Entries with unreadable dates keep
    /// their place with [`UNKNOWN_DATE`] and a warning, so every listed
    /// photo stays in the album and can be given a real date.
    pub fn from_entries(entries: &[PhotoEntry]) -> Self {
        let records = entries
            .iter()
            .map(|entry| {
                PhotoRecord::from_entry(entry).unwrap_or_else(|err| {
                    tracing::warn!(name = %entry.name, error = %err, "Photo has an unreadable date");
                    PhotoRecord::new(&entry.name, UNKNOWN_DATE)
                })
            })
            .collect();
        Self::new(records)
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Find a record by filename or by full url.
    pub fn position(&self, name_or_url: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| r.url == name_or_url || r.name() == name_or_url)
    }

    pub fn get(&self, name_or_url: &str) -> Option<&PhotoRecord> {
        self.position(name_or_url).map(|i| &self.records[i])
    }

    /// Set one photo's date in place. Returns `false` if no such photo.
    pub fn set_date(&mut self, name_or_url: &str, date: DateTime<Utc>) -> bool {
        match self.position(name_or_url) {
            Some(i) => {
                self.records[i].date = date;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Set one photo's caption. Returns `false` if no such photo.
    pub fn set_caption(&mut self, name_or_url: &str, caption: &str) -> bool {
        match self.position(name_or_url) {
            Some(i) => {
                self.records[i].caption = caption.to_string();
                true
            }
            None => false,
        }
    }

    /// Records ordered by date, ties keeping their current relative order.
    pub fn sorted_by_date(&self) -> Vec<PhotoRecord> {
        let mut sorted = self.records.clone();
        sorted.sort_by_key(|r| r.date);
        sorted
    }

    /// Replace the working copy with a saved ordering and clear the dirty flag.
    pub(crate) fn commit_saved(&mut self, records: Vec<PhotoRecord>) {
        self.records = records;
        self.dirty = false;
    }
}
