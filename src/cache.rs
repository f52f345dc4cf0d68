//! On-disk cache of downloaded photos.
//!
//! Export rasterizes every page, which means downloading every photo from
//! the server. Repeated exports of the same album (different paper size,
//! different grid density) fetch the same bytes again. [`CachingBackend`]
//! wraps any [`PhotoBackend`] and keeps a copy of each photo on disk.
//!
//! ## Cache keys
//!
//! Entries are keyed by the SHA-256 of `"{namespace}\0{url}"`, where the
//! namespace is the server base URL. Two servers with a `photos/a.jpg`
//! never share an entry.
//!
//! Listing and date updates always go to the wrapped backend; only
//! `fetch_photo` is cached. Unreadable entries are treated as misses and
//! overwritten by the fresh download.
//!
//! ## Expiry
//!
//! The key says nothing about the photo's content, so a photo replaced on
//! the server under the same name would be served stale forever. With
//! [`CachingBackend::with_max_age`] an entry older than the limit (by file
//! modification time) is downloaded again. `[cache] max_age_secs` sets it
//! for the CLI.
//!
//! ## Bypassing the cache
//!
//! Pass `--no-cache` to `export`, or set `[cache] enabled = false`.

use crate::backend::{BackendError, PhotoBackend};
use crate::types::PhotoEntry;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// SHA-256 cache key for a photo url, as a hex string.
pub fn cache_key(namespace: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b"\0");
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A [`PhotoBackend`] that serves `fetch_photo` from disk when it can.
pub struct CachingBackend<B> {
    inner: B,
    dir: PathBuf,
    namespace: String,
    max_age: Option<Duration>,
    stats: CacheStats,
}

impl<B: PhotoBackend> CachingBackend<B> {
    pub fn new(inner: B, dir: impl Into<PathBuf>, namespace: &str) -> Self {
        Self {
            inner,
            dir: dir.into(),
            namespace: namespace.to_string(),
            max_age: None,
            stats: CacheStats::default(),
        }
    }

    /// Download entries again once they are older than `max_age`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(cache_key(&self.namespace, url))
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let Some(max_age) = self.max_age else {
            return true;
        };
        match std::fs::metadata(path).and_then(|m| m.modified()) {
            // A timestamp in the future counts as brand new.
            Ok(modified) => modified.elapsed().unwrap_or_default() < max_age,
            Err(_) => false,
        }
    }

    fn store(&self, path: &Path, bytes: &[u8]) {
        let result = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(path, bytes));
        if let Err(err) = result {
            tracing::warn!(path = %path.display(), error = %err, "Could not write photo cache entry");
        }
    }
}

impl<B: PhotoBackend> PhotoBackend for CachingBackend<B> {
    fn list_photos(&self) -> Result<Vec<PhotoEntry>, BackendError> {
        self.inner.list_photos()
    }

    fn update_dates(&self, updates: &[PhotoEntry]) -> Result<(), BackendError> {
        self.inner.update_dates(updates)
    }

    fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let path = self.entry_path(url);
        if self.is_fresh(&path) {
            match std::fs::read(&path) {
                Ok(bytes) if !bytes.is_empty() => {
                    tracing::debug!(%url, "Photo cache hit");
                    self.stats.hit();
                    return Ok(bytes);
                }
                _ => {}
            }
        } else {
            tracing::debug!(%url, "Photo cache entry expired");
        }
        let bytes = self.inner.fetch_photo(url)?;
        self.stats.miss();
        self.store(&path, &bytes);
        Ok(bytes)
    }
}

/// Hit/miss counters. Atomic because pages decode their photos in parallel.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU32,
    misses: AtomicU32,
}

impl CacheStats {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u32 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u32 {
        self.hits() + self.misses()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits() > 0 {
            write!(
                f,
                "{} cached, {} downloaded ({} total)",
                self.hits(),
                self.misses(),
                self.total()
            )
        } else {
            write!(f, "{} downloaded", self.misses())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    #[test]
    fn cache_key_deterministic() {
        assert_eq!(cache_key("a", "photos/x.jpg"), cache_key("a", "photos/x.jpg"));
        assert_eq!(cache_key("a", "photos/x.jpg").len(), 64);
    }

    #[test]
    fn cache_key_varies_with_namespace() {
        assert_ne!(cache_key("a", "photos/x.jpg"), cache_key("b", "photos/x.jpg"));
        assert_ne!(cache_key("a", "photos/x.jpg"), cache_key("a", "photos/y.jpg"));
    }

    #[test]
    fn second_fetch_is_served_from_disk() {
        let tmp = TempDir::new().unwrap();
        let mock = MockBackend::new().with_photo("photos/a.png", vec![7; 16]);
        let backend = CachingBackend::new(mock, tmp.path().join("cache"), "http://srv");

        assert_eq!(backend.fetch_photo("photos/a.png").unwrap(), vec![7; 16]);
        assert_eq!(backend.fetch_photo("photos/a.png").unwrap(), vec![7; 16]);

        let fetches = backend
            .inner()
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Fetch(_)))
            .count();
        assert_eq!(fetches, 1);
        assert_eq!(backend.stats().hits(), 1);
        assert_eq!(backend.stats().misses(), 1);
        assert!(backend.entry_path("photos/a.png").exists());
    }

    #[test]
    fn empty_entry_is_refetched() {
        let tmp = TempDir::new().unwrap();
        let mock = MockBackend::new().with_photo("photos/a.png", vec![1, 2]);
        let backend = CachingBackend::new(mock, tmp.path(), "ns");
        std::fs::write(backend.entry_path("photos/a.png"), b"").unwrap();

        assert_eq!(backend.fetch_photo("photos/a.png").unwrap(), vec![1, 2]);
        assert_eq!(backend.stats().misses(), 1);
    }

    #[test]
    fn expired_entry_is_downloaded_again() {
        let tmp = TempDir::new().unwrap();
        let original = MockBackend::new().with_photo("photos/a.png", vec![1; 4]);
        CachingBackend::new(original, tmp.path(), "ns")
            .fetch_photo("photos/a.png")
            .unwrap();

        // The server now has a different photo under the same name.
        let replaced = || MockBackend::new().with_photo("photos/a.png", vec![2; 4]);

        let within_age = CachingBackend::new(replaced(), tmp.path(), "ns")
            .with_max_age(Duration::from_secs(3600));
        assert_eq!(within_age.fetch_photo("photos/a.png").unwrap(), vec![1; 4]);
        assert_eq!(within_age.stats().hits(), 1);

        let expired = CachingBackend::new(replaced(), tmp.path(), "ns").with_max_age(Duration::ZERO);
        assert_eq!(expired.fetch_photo("photos/a.png").unwrap(), vec![2; 4]);
        assert_eq!(expired.stats().misses(), 1);

        // The refreshed entry replaced the stale one.
        let after = CachingBackend::new(MockBackend::new(), tmp.path(), "ns");
        assert_eq!(after.fetch_photo("photos/a.png").unwrap(), vec![2; 4]);
    }

    #[test]
    fn fetch_errors_are_not_cached() {
        let tmp = TempDir::new().unwrap();
        let backend = CachingBackend::new(MockBackend::new(), tmp.path(), "ns");
        assert!(backend.fetch_photo("photos/missing.png").is_err());
        assert!(!backend.entry_path("photos/missing.png").exists());
        assert_eq!(backend.stats().total(), 0);
    }

    #[test]
    fn list_and_update_pass_through() {
        let tmp = TempDir::new().unwrap();
        let backend = CachingBackend::new(MockBackend::new(), tmp.path(), "ns");
        backend.list_photos().unwrap();
        backend.update_dates(&[]).unwrap();
        assert_eq!(
            backend.inner().get_operations(),
            vec![RecordedOp::List, RecordedOp::Update(vec![])]
        );
    }

    #[test]
    fn cache_stats_display() {
        let s = CacheStats::default();
        s.miss();
        s.miss();
        assert_eq!(format!("{}", s), "2 downloaded");
        s.hit();
        assert_eq!(format!("{}", s), "1 cached, 2 downloaded (3 total)");
    }
}
