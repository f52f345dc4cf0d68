//! # Simple Album
//!
//! A photo-album editor for print layouts. Photos come from a small photo
//! server; the editor lays them out a few to a page on A4 or Letter paper,
//! lets you fix their capture dates and add captions, saves the dates back
//! to the server and exports the whole album as a multi-page PDF.
//!
//! # Architecture
//!
//! ```text
//! backend ──list──▶ store ──▶ paginate + layout ──▶ render ──▶ screen
//!    ▲                │                                 │
//!    └──update-dates── sync                  export: raster ──▶ document
//! ```
//!
//! - The store loads once from the server and keeps the working copy.
//! - Layout decides the grid and the container box; the paginator decides
//!   which records are on a page; the renderer turns both into cards.
//! - Edits mutate the store and set its dirty flag. Saving sorts the list by
//!   date and sends it to the server in one request.
//! - Export renders every page in order, rasterizes it, scales the bitmap to
//!   the paper and draws it as one PDF page, with each card's date and
//!   caption as text under its photo.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | `AlbumEditor` state, `Command` dispatch, shell command parsing |
//! | [`store`] | In-memory photo list with the dirty flag |
//! | [`paginate`] | Page arithmetic, page views, navigation state |
//! | [`layout`] | Paper size, orientation and photos-per-page → grid and container box |
//! | [`render`] | One page of records → card models and maud HTML preview |
//! | [`export`] | Render → rasterize → fit → draw loop over all pages |
//! | [`sync`] | Sorted date updates back to the server |
//! | [`backend`] | `PhotoBackend` trait and the blocking HTTP client |
//! | [`cache`] | On-disk photo cache keyed by SHA-256 of the URL |
//! | [`imaging`] | Page rasterization and placement geometry |
//! | [`document`] | `AlbumDocument` trait and the printpdf writer |
//! | [`config`] | `album.toml` loading, validation, merging |
//! | [`logging`] | tracing subscriber setup |
//! | [`output`] | CLI output formatting |
//! | [`types`] | Shared types: wire entries, records, paper and orientation |
//!
//! # Design Decisions
//!
//! ## Collaborators Behind Traits
//!
//! The server, the rasterizer and the document writer are traits
//! ([`backend::PhotoBackend`], [`imaging::Rasterizer`],
//! [`document::AlbumDocument`]). Production code uses reqwest, the `image`
//! crate and printpdf; tests swap in recording mocks and exercise the editor
//! and the export loop without a network or a PDF.
//!
//! ## Export Never Touches the Visible Page
//!
//! The export loop walks pages with its own index ([`export::ExportSession`])
//! and renders each page fresh from the store. When it ends, successfully or
//! not, the editor shows the page it showed before. A failed export writes
//! nothing: the PDF is saved once, after the last page, through a temporary
//! file.
//!
//! ## Server Order Until Saved
//!
//! Photos stay in the server's order while you edit. Only a successful save
//! re-sorts them by date, so a failed save changes nothing on screen.

pub mod app;
pub mod backend;
pub mod cache;
pub mod config;
pub mod document;
pub mod export;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod output;
pub mod paginate;
pub mod render;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
