//! Flushing date edits back to the server.
//!
//! A save sends the whole list, sorted by date, in one `update_dates`
//! request. The sorted order is only adopted locally once the server has
//! accepted it: on failure the store keeps its dirty flag and its
//! on-screen order, so the user can retry.

use crate::backend::{BackendError, PhotoBackend};
use crate::store::PhotoStore;
use crate::types::PhotoEntry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to save dates: {0}")]
    Backend(#[from] BackendError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing was edited; no request was made.
    Clean,
    /// The server accepted `count` entries.
    Saved { count: usize },
}

/// Send the store's dates to the backend if anything changed.
pub fn save_changes(store: &mut PhotoStore, backend: &impl PhotoBackend) -> Result<SyncOutcome, SyncError> {
    if !store.is_dirty() {
        tracing::debug!("No date changes to save");
        return Ok(SyncOutcome::Clean);
    }

    let sorted = store.sorted_by_date();
    let updates: Vec<PhotoEntry> = sorted.iter().map(|r| r.to_entry()).collect();

    if let Err(err) = backend.update_dates(&updates) {
        tracing::error!(error = %err, "Saving dates failed; keeping local edits");
        return Err(err.into());
    }

    let count = updates.len();
    store.commit_saved(sorted);
    tracing::info!(count, "Saved photo dates");
    Ok(SyncOutcome::Saved { count })
}
