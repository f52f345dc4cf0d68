//! Application state and command dispatch.
//!
//! [`AlbumEditor`] owns everything the editor screen shows: the photo
//! store, the layout options, the current page index and the rendered
//! page. User actions arrive as [`Command`] values and go through
//! [`AlbumEditor::dispatch`], which applies them in order and answers with
//! a [`Notice`] for the user.
//!
//! The screen is re-rendered after every change that could affect it, so
//! [`AlbumEditor::screen`] always matches the store and layout.
//!
//! Text commands (the `shell` front end) are parsed by [`parse_command`].

use crate::backend::{BackendError, PhotoBackend};
use crate::config::ConfigError;
use crate::document::{AlbumDocument, PageSetup, PdfAlbum};
use crate::export::{ExportError, ExportEvent, ExportReport, ExportRequest, ExportStatus, export_album};
use crate::imaging::{CaptureOptions, GridRasterizer, ImageEncoding, Rasterizer};
use crate::layout::{LayoutChange, LayoutOptions, apply_change};
use crate::paginate::{Navigation, PageOption, PageSize, page_count, page_selector};
use crate::render::{RenderedPage, render_page};
use crate::store::PhotoStore;
use crate::sync::{SyncError, SyncOutcome, save_changes};
use crate::types::{Orientation, PaperSize, ParseError, parse_timestamp};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Title written into exported documents.
pub const DOCUMENT_TITLE: &str = "Photo Album";

#[derive(Error, Debug)]
pub enum AlbumError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Save error: {0}")]
    Sync(#[from] SyncError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    NextPage,
    PrevPage,
    /// Zero-based page index.
    GoToPage(usize),
    SetPhotosPerPage(PageSize),
    SetPaperSize(PaperSize),
    SetOrientation(Orientation),
    EditDate { photo: String, date: DateTime<Utc> },
    EditCaption { photo: String, caption: String },
    SaveChanges,
    /// Export to `output`, or to the editor's default output path.
    Export { output: Option<PathBuf> },
}

/// What the user is told after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The screen was re-rendered.
    Rendered,
    /// The command's control is disabled; nothing happened.
    Unchanged,
    NoSuchPage { page: usize, page_count: usize },
    UnknownPhoto(String),
    NothingToSave,
    Saved { count: usize },
    SaveFailed(String),
    Exported { pages: usize, path: PathBuf },
    ExportFailed(String),
}

/// The editor.
pub struct AlbumEditor<B> {
    backend: B,
    store: PhotoStore,
    layout: LayoutOptions,
    current_index: usize,
    screen: RenderedPage,
    status: ExportStatus,
    capture: CaptureOptions,
    encoding: ImageEncoding,
    default_output: PathBuf,
    events: Option<Sender<ExportEvent>>,
}

impl<B: PhotoBackend> AlbumEditor<B> {
    pub fn new(backend: B, store: PhotoStore, layout: LayoutOptions) -> Self {
        let screen = render_page(store.records(), 0, &layout);
        Self {
            backend,
            store,
            layout,
            current_index: 0,
            screen,
            status: ExportStatus::new(),
            capture: CaptureOptions::default(),
            encoding: ImageEncoding::default(),
            default_output: PathBuf::from("photo-album.pdf"),
            events: None,
        }
    }

    /// Load the photo list from the backend and show the first page.
    ///
    /// A failed load is logged and leaves the album empty.
    pub fn load(backend: B, layout: LayoutOptions) -> Self {
        let store = match backend.list_photos() {
            Ok(entries) => PhotoStore::from_entries(&entries),
            Err(err) => {
                tracing::error!(error = %err, "Failed to load photo list");
                PhotoStore::default()
            }
        };
        Self::new(backend, store, layout)
    }

    pub fn with_capture(mut self, capture: CaptureOptions, encoding: ImageEncoding) -> Self {
        self.capture = capture;
        self.encoding = encoding;
        self
    }

    pub fn with_default_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.default_output = output.into();
        self
    }

    /// Send export progress to `events`.
    pub fn with_events(mut self, events: Sender<ExportEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &PhotoStore {
        &self.store
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn current_page(&self) -> usize {
        self.current_index
    }

    pub fn page_count(&self) -> usize {
        page_count(self.store.len(), self.layout.photos_per_page)
    }

    /// The page as currently displayed.
    pub fn screen(&self) -> &RenderedPage {
        &self.screen
    }

    pub fn navigation(&self) -> Navigation {
        Navigation::new(self.current_index, self.page_count())
    }

    /// `Page N of M`.
    pub fn page_info(&self) -> String {
        self.screen.view.label()
    }

    pub fn page_selector(&self) -> Vec<PageOption> {
        page_selector(self.current_index, self.page_count())
    }

    /// Shared handle on the export state, for progress displays.
    pub fn export_status(&self) -> ExportStatus {
        self.status.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    fn rerender(&mut self) {
        self.screen = render_page(self.store.records(), self.current_index, &self.layout);
    }

    fn show_page(&mut self, index: usize) -> Notice {
        let count = self.page_count();
        if index >= count {
            return Notice::NoSuchPage {
                page: index,
                page_count: count,
            };
        }
        self.current_index = index;
        self.rerender();
        Notice::Rendered
    }

    /// Apply one command.
    pub fn dispatch(&mut self, command: Command) -> Notice {
        tracing::debug!(?command, "Dispatching command");
        match command {
            Command::NextPage => {
                if !self.navigation().next_enabled {
                    return Notice::Unchanged;
                }
                self.show_page(self.current_index + 1)
            }
            Command::PrevPage => {
                if !self.navigation().prev_enabled {
                    return Notice::Unchanged;
                }
                self.show_page(self.current_index - 1)
            }
            Command::GoToPage(index) => self.show_page(index),
            Command::SetPhotosPerPage(size) => self.change_layout(LayoutChange::PhotosPerPage(size)),
            Command::SetPaperSize(paper) => self.change_layout(LayoutChange::PaperSize(paper)),
            Command::SetOrientation(orientation) => {
                self.change_layout(LayoutChange::Orientation(orientation))
            }
            Command::EditDate { photo, date } => {
                if !self.store.set_date(&photo, date) {
                    return Notice::UnknownPhoto(photo);
                }
                self.rerender();
                Notice::Rendered
            }
            Command::EditCaption { photo, caption } => {
                if !self.store.set_caption(&photo, &caption) {
                    return Notice::UnknownPhoto(photo);
                }
                self.rerender();
                Notice::Rendered
            }
            Command::SaveChanges => match self.save() {
                Ok(SyncOutcome::Clean) => Notice::NothingToSave,
                Ok(SyncOutcome::Saved { count }) => Notice::Saved { count },
                Err(err) => Notice::SaveFailed(err.to_string()),
            },
            Command::Export { output } => {
                let output = output.unwrap_or_else(|| self.default_output.clone());
                let result = {
                    let rasterizer = GridRasterizer::new(&self.backend);
                    self.run_export(&rasterizer, pdf_document, &output)
                };
                match self.finish_export(result) {
                    Ok(report) => Notice::Exported {
                        pages: report.pages,
                        path: report.path,
                    },
                    Err(err) => Notice::ExportFailed(err.to_string()),
                }
            }
        }
    }

    fn change_layout(&mut self, change: LayoutChange) -> Notice {
        if apply_change(&mut self.layout, change) {
            self.current_index = 0;
        }
        self.rerender();
        Notice::Rendered
    }

    /// Flush date edits to the backend, re-rendering on success.
    pub fn save(&mut self) -> Result<SyncOutcome, SyncError> {
        let outcome = save_changes(&mut self.store, &self.backend)?;
        if let SyncOutcome::Saved { .. } = outcome {
            self.rerender();
        }
        Ok(outcome)
    }

    /// Export with a caller-supplied rasterizer and document.
    pub fn export_with<R, D, F>(
        &mut self,
        rasterizer: &R,
        new_document: F,
        output: &Path,
    ) -> Result<ExportReport, ExportError>
    where
        R: Rasterizer + ?Sized,
        D: AlbumDocument,
        F: FnOnce(&PageSetup) -> D,
    {
        let result = self.run_export(rasterizer, new_document, output);
        self.finish_export(result)
    }

    fn run_export<R, D, F>(
        &self,
        rasterizer: &R,
        new_document: F,
        output: &Path,
    ) -> Result<ExportReport, ExportError>
    where
        R: Rasterizer + ?Sized,
        D: AlbumDocument,
        F: FnOnce(&PageSetup) -> D,
    {
        let request = ExportRequest {
            records: self.store.records(),
            layout: &self.layout,
            current_index: self.current_index,
            capture: self.capture,
            encoding: self.encoding,
            output,
        };
        export_album(
            &request,
            rasterizer,
            new_document,
            &self.status,
            self.events.as_ref(),
        )
    }

    /// Put the pre-export page back on screen, whatever the outcome.
    fn finish_export(
        &mut self,
        result: Result<ExportReport, ExportError>,
    ) -> Result<ExportReport, ExportError> {
        if let Ok(report) = &result {
            self.current_index = report.restore_index;
        }
        self.rerender();
        result
    }
}

fn pdf_document(setup: &PageSetup) -> PdfAlbum {
    PdfAlbum::new(DOCUMENT_TITLE, setup)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0}")]
    Unknown(String),
    #[error("Missing {what} for `{command}`")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error("Not a valid number: {0}")]
    InvalidNumber(String),
    #[error("Photos per page must be at least 1")]
    ZeroPerPage,
    #[error("Page numbers start at 1")]
    ZeroPage,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parse one line of text into a [`Command`].
///
/// Page numbers are one-based here, as shown to the user.
///
/// | Line | Command |
/// |---|---|
/// | `next` / `prev` | [`Command::NextPage`] / [`Command::PrevPage`] |
/// | `goto N` | [`Command::GoToPage`] |
/// | `per-page N` | [`Command::SetPhotosPerPage`] |
/// | `paper a4\|letter` | [`Command::SetPaperSize`] |
/// | `orientation portrait\|landscape` | [`Command::SetOrientation`] |
/// | `date NAME DATE` | [`Command::EditDate`] |
/// | `caption NAME TEXT...` | [`Command::EditCaption`] |
/// | `save` | [`Command::SaveChanges`] |
/// | `export [PATH]` | [`Command::Export`] |
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let required = |command: &'static str, what: &'static str| {
        if rest.is_empty() {
            Err(CommandError::MissingArgument { command, what })
        } else {
            Ok(rest)
        }
    };

    match word {
        "" => Err(CommandError::Empty),
        "next" => Ok(Command::NextPage),
        "prev" => Ok(Command::PrevPage),
        "goto" => {
            let number = parse_number(required("goto", "page number")?)?;
            let index = number.checked_sub(1).ok_or(CommandError::ZeroPage)?;
            Ok(Command::GoToPage(index))
        }
        "per-page" => {
            let n = parse_number(required("per-page", "count")?)?;
            let size = PageSize::new(n).ok_or(CommandError::ZeroPerPage)?;
            Ok(Command::SetPhotosPerPage(size))
        }
        "paper" => Ok(Command::SetPaperSize(required("paper", "paper size")?.parse()?)),
        "orientation" => Ok(Command::SetOrientation(
            required("orientation", "orientation")?.parse()?,
        )),
        "date" => {
            let args = required("date", "photo name")?;
            let (photo, date) = args
                .split_once(char::is_whitespace)
                .ok_or(CommandError::MissingArgument {
                    command: "date",
                    what: "date",
                })?;
            Ok(Command::EditDate {
                photo: photo.to_string(),
                date: parse_timestamp(date)?,
            })
        }
        "caption" => {
            let args = required("caption", "photo name")?;
            let (photo, caption) = match args.split_once(char::is_whitespace) {
                Some((photo, caption)) => (photo, caption.trim()),
                None => (args, ""),
            };
            Ok(Command::EditCaption {
                photo: photo.to_string(),
                caption: caption.to_string(),
            })
        }
        "save" => Ok(Command::SaveChanges),
        "export" => Ok(Command::Export {
            output: (!rest.is_empty()).then(|| PathBuf::from(rest)),
        }),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_number(value: &str) -> Result<usize, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::InvalidNumber(value.to_string()))
}
