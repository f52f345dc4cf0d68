//! Photo server client.
//!
//! The [`PhotoBackend`] trait is the seam between the editor and the photo
//! server. It covers the three requests the editor makes:
//!
//! | Operation | Request |
//! |---|---|
//! | `list_photos` | `GET /photos-list` → `[{name, date}]` |
//! | `update_dates` | `POST /update-dates` with `[{name, date}]` |
//! | `fetch_photo` | `GET /photos/<name>` → image bytes |
//!
//! The production implementation is [`HttpBackend`] (blocking reqwest).
//! Tests substitute a recording mock.

use crate::types::PhotoEntry;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
    #[error("Server rejected request: {0}")]
    Rejected(String),
}

/// Trait for photo servers.
///
/// `Sync` so one page's photos can be downloaded from rayon workers.
pub trait PhotoBackend: Sync {
    /// Fetch the canonical photo list.
    fn list_photos(&self) -> Result<Vec<PhotoEntry>, BackendError>;

    /// Replace the server's dates with `updates`, all or nothing.
    fn update_dates(&self, updates: &[PhotoEntry]) -> Result<(), BackendError>;

    /// Download one photo by its url relative to the server root
    /// (`photos/<name>`).
    fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, BackendError>;
}

/// Blocking HTTP client for the photo server.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(BackendError::InvalidUrl(base_url));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl PhotoBackend for HttpBackend {
    fn list_photos(&self) -> Result<Vec<PhotoEntry>, BackendError> {
        let url = self.endpoint("photos-list");
        tracing::debug!(%url, "Fetching photo list");
        let entries: Vec<PhotoEntry> = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;
        tracing::info!(count = entries.len(), "Loaded photo list");
        Ok(entries)
    }

    fn update_dates(&self, updates: &[PhotoEntry]) -> Result<(), BackendError> {
        let url = self.endpoint("update-dates");
        tracing::debug!(%url, count = updates.len(), "Sending date updates");
        let response = self.client.post(&url).json(updates).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Rejected(format!("{status}: {body}")));
        }
        Ok(())
    }

    fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let url = self.endpoint(url);
        let bytes = self.client.get(&url).send()?.error_for_status()?.bytes()?;
        tracing::debug!(%url, bytes = bytes.len(), "Downloaded photo");
        Ok(bytes.to_vec())
    }
}

impl<B: PhotoBackend + ?Sized> PhotoBackend for &B {
    fn list_photos(&self) -> Result<Vec<PhotoEntry>, BackendError> {
        (**self).list_photos()
    }

    fn update_dates(&self, updates: &[PhotoEntry]) -> Result<(), BackendError> {
        (**self).update_dates(updates)
    }

    fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        (**self).fetch_photo(url)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend that records requests and replays canned answers.
    #[derive(Default)]
    pub struct MockBackend {
        pub entries: Vec<PhotoEntry>,
        pub photos: HashMap<String, Vec<u8>>,
        pub fail_list: bool,
        pub fail_update: Mutex<bool>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        List,
        Update(Vec<PhotoEntry>),
        Fetch(String),
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entries(entries: Vec<PhotoEntry>) -> Self {
            Self {
                entries,
                ..Self::default()
            }
        }

        pub fn with_photo(mut self, url: &str, bytes: Vec<u8>) -> Self {
            self.photos.insert(url.to_string(), bytes);
            self
        }

        pub fn set_fail_update(&self, fail: bool) {
            *self.fail_update.lock().unwrap() = fail;
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn updates(&self) -> Vec<Vec<PhotoEntry>> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Update(u) => Some(u),
                    _ => None,
                })
                .collect()
        }
    }

    impl PhotoBackend for MockBackend {
        fn list_photos(&self) -> Result<Vec<PhotoEntry>, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::List);
            if self.fail_list {
                return Err(BackendError::Rejected("500 Internal Server Error".into()));
            }
            Ok(self.entries.clone())
        }

        fn update_dates(&self, updates: &[PhotoEntry]) -> Result<(), BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Update(updates.to_vec()));
            if *self.fail_update.lock().unwrap() {
                return Err(BackendError::Rejected("503 Service Unavailable".into()));
            }
            Ok(())
        }

        fn fetch_photo(&self, url: &str) -> Result<Vec<u8>, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Fetch(url.to_string()));
            self.photos
                .get(url)
                .cloned()
                .ok_or_else(|| BackendError::Rejected(format!("404 Not Found: {url}")))
        }
    }

    #[test]
    fn http_backend_rejects_non_http_urls() {
        assert!(matches!(
            HttpBackend::new("ftp://example.com", Duration::from_secs(1)),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn http_backend_normalizes_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.endpoint("/photos-list"), "http://localhost:8000/photos-list");
        assert_eq!(
            backend.endpoint("photos/a.jpg"),
            "http://localhost:8000/photos/a.jpg"
        );
    }

    #[test]
    fn mock_records_requests() {
        let backend = MockBackend::new().with_photo("photos/a.png", vec![1, 2, 3]);
        assert_eq!(backend.fetch_photo("photos/a.png").unwrap(), vec![1, 2, 3]);
        assert!(backend.fetch_photo("photos/missing.png").is_err());
        backend.update_dates(&[]).unwrap();
        assert_eq!(
            backend.get_operations(),
            vec![
                RecordedOp::Fetch("photos/a.png".into()),
                RecordedOp::Fetch("photos/missing.png".into()),
                RecordedOp::Update(vec![]),
            ]
        );
    }
}
