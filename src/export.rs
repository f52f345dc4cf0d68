//! Paginated export: every page of the album, rasterized, into one document.
//!
//! ## States
//!
//! ```text
//! Idle ──export──▶ Exporting(0) ─▶ Exporting(1) ─▶ … ─▶ Idle
//! ```
//!
//! The state lives in an [`ExportStatus`] handle that UI code can poll. It
//! leaves `Idle` only through a [`BusyGuard`], and the guard puts it back on
//! drop, so the trigger is re-enabled on every exit path, errors included.
//!
//! ## Per-page loop
//!
//! For each page index, in order:
//!
//! 1. render that page from the store (fresh cards, never a previous frame);
//! 2. append a blank document page, except for the first;
//! 3. rasterize the rendered container;
//! 4. fit the bitmap to the physical page ([`fit_to_page`]);
//! 5. draw it, then draw its card text at the same scale ([`place_text`]).
//!
//! The loop's page index belongs to an [`ExportSession`], not to the
//! editor, so the page the user was looking at is never overwritten. When
//! the loop ends the session hands back the index to restore.
//!
//! ## Failure
//!
//! Nothing is written unless every page succeeded: the document is only
//! saved after the loop, and [`PdfAlbum`](crate::document::PdfAlbum) saves
//! through a temporary file. A failed export leaves no output file.

use crate::document::{AlbumDocument, DocumentError, PageSetup};
use crate::imaging::{
    CaptureError, CaptureOptions, ImageEncoding, Rasterizer, fit_to_page, place_text,
};
use crate::layout::LayoutOptions;
use crate::paginate::page_count;
use crate::render::render_page;
use crate::types::PhotoRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("An export is already running")]
    Busy,
    #[error("Nothing to export: the album has no photos")]
    Empty,
    #[error("Failed to capture page {page}: {source}")]
    Capture {
        page: usize,
        #[source]
        source: CaptureError,
    },
    #[error("Failed to draw page {page}: {source}")]
    Document {
        page: usize,
        #[source]
        source: DocumentError,
    },
    #[error("Failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}

/// Observable export state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    /// Zero-based page currently being captured.
    Exporting(usize),
}

/// Shared handle on the export state. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct ExportStatus(Arc<AtomicUsize>);

const IDLE: usize = 0;

impl ExportStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> ExportState {
        match self.0.load(Ordering::SeqCst) {
            IDLE => ExportState::Idle,
            n => ExportState::Exporting(n - 1),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.get() != ExportState::Idle
    }

    fn set_page(&self, index: usize) {
        self.0.store(index + 1, Ordering::SeqCst);
    }
}

/// Holds the status out of `Idle` for as long as it lives.
#[derive(Debug)]
pub struct BusyGuard {
    status: ExportStatus,
}

impl BusyGuard {
    /// Enter `Exporting(0)`, or fail with [`ExportError::Busy`] if an export
    /// already holds the status.
    pub fn acquire(status: &ExportStatus) -> Result<Self, ExportError> {
        status
            .0
            .compare_exchange(IDLE, 1, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| ExportError::Busy)?;
        Ok(Self {
            status: status.clone(),
        })
    }

    pub fn set_page(&self, index: usize) {
        self.status.set_page(index);
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.status.0.store(IDLE, Ordering::SeqCst);
    }
}

/// The export loop's own bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSession {
    original_index: usize,
    page_index: usize,
    page_count: usize,
}

impl ExportSession {
    pub fn new(original_index: usize, page_count: usize) -> Self {
        Self {
            original_index,
            page_index: 0,
            page_count,
        }
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn is_first_page(&self) -> bool {
        self.page_index == 0
    }

    /// Move to the next page; `false` once past the last one.
    pub fn advance(&mut self) -> bool {
        self.page_index += 1;
        self.page_index < self.page_count
    }

    /// End the session, returning the page index to restore.
    pub fn finish(self) -> usize {
        self.original_index
    }
}

/// Progress notifications sent while exporting.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Started { pages: usize },
    PageCaptured { index: usize, pages: usize },
    Saved { path: PathBuf, pages: usize },
    Failed { message: String },
}

/// Everything the exporter reads from the editor.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub records: &'a [PhotoRecord],
    pub layout: &'a LayoutOptions,
    /// Page on screen when the export started.
    pub current_index: usize,
    pub capture: CaptureOptions,
    pub encoding: ImageEncoding,
    pub output: &'a Path,
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub pages: usize,
    pub path: PathBuf,
    /// Page index the editor must show again.
    pub restore_index: usize,
}

fn notify(events: Option<&Sender<ExportEvent>>, event: ExportEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}

/// Export every page of the album into a new document.
///
/// `new_document` receives the physical page setup and returns the document
/// to draw into; it already holds the first page.
pub fn export_album<R, D, F>(
    request: &ExportRequest<'_>,
    rasterizer: &R,
    new_document: F,
    status: &ExportStatus,
    events: Option<&Sender<ExportEvent>>,
) -> Result<ExportReport, ExportError>
where
    R: Rasterizer + ?Sized,
    D: AlbumDocument,
    F: FnOnce(&PageSetup) -> D,
{
    let guard = BusyGuard::acquire(status)?;
    let result = run_export(request, rasterizer, new_document, &guard, events);
    drop(guard);

    match &result {
        Ok(report) => {
            tracing::info!(pages = report.pages, path = %report.path.display(), "Exported album");
            notify(
                events,
                ExportEvent::Saved {
                    path: report.path.clone(),
                    pages: report.pages,
                },
            );
        }
        Err(err) => {
            tracing::error!(error = %err, "Export failed");
            notify(
                events,
                ExportEvent::Failed {
                    message: err.to_string(),
                },
            );
        }
    }
    result
}

fn run_export<R, D, F>(
    request: &ExportRequest<'_>,
    rasterizer: &R,
    new_document: F,
    guard: &BusyGuard,
    events: Option<&Sender<ExportEvent>>,
) -> Result<ExportReport, ExportError>
where
    R: Rasterizer + ?Sized,
    D: AlbumDocument,
    F: FnOnce(&PageSetup) -> D,
{
    let layout = request.layout;
    let pages = page_count(request.records.len(), layout.photos_per_page);
    if pages == 0 {
        return Err(ExportError::Empty);
    }

    let setup = PageSetup {
        paper: layout.paper_size,
        orientation: layout.orientation,
    };
    let page_mm = setup.dimensions_mm();
    let mut document = new_document(&setup);
    let mut session = ExportSession::new(request.current_index, pages);
    notify(events, ExportEvent::Started { pages });

    loop {
        let index = session.page_index();
        guard.set_page(index);
        let page = render_page(request.records, index, layout);

        if !session.is_first_page() {
            document
                .add_page()
                .map_err(|source| ExportError::Document {
                    page: index + 1,
                    source,
                })?;
        }

        let capture = rasterizer
            .capture(&page, &request.capture)
            .map_err(|source| ExportError::Capture {
                page: index + 1,
                source,
            })?;
        let placement = fit_to_page(capture.dimensions(), page_mm);
        let drawn = document
            .add_image(&capture.bitmap, request.encoding, placement)
            .and_then(|_| {
                capture.labels.iter().try_for_each(|label| {
                    document.add_text(&place_text(label, capture.dimensions(), &placement))
                })
            });
        drawn.map_err(|source| ExportError::Document {
            page: index + 1,
            source,
        })?;

        tracing::debug!(page = index + 1, of = pages, photos = page.cards.len(), "Captured page");
        notify(events, ExportEvent::PageCaptured { index, pages });

        if !session.advance() {
            break;
        }
    }

    let restore_index = session.finish();
    document
        .save(request.output)
        .map_err(|source| ExportError::Save {
            path: request.output.to_path_buf(),
            source,
        })?;

    Ok(ExportReport {
        pages,
        path: request.output.to_path_buf(),
        restore_index,
    })
}
