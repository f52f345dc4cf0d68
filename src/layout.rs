//! Layout controller: maps the user's layout options to the grid and the
//! container box the renderer draws into.
//!
//! Column rule: up to two photos per page are stacked in a single column,
//! anything denser uses two columns. The on-screen container box depends
//! only on orientation (297×210 mm landscape, 210×297 mm portrait); the
//! exported document page uses the real paper size, and export scales the
//! captured container to fit it.

use crate::config::LayoutConfig;
use crate::paginate::PageSize;
use crate::types::{Orientation, PaperSize, page_dimensions};

/// CSS reference pixels per millimetre (96 dpi).
pub const PX_PER_MM: f32 = 96.0 / 25.4;

/// The three user-facing layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub paper_size: PaperSize,
    pub orientation: Orientation,
    pub photos_per_page: PageSize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            orientation: Orientation::Portrait,
            photos_per_page: PageSize::default(),
        }
    }
}

impl LayoutOptions {
    /// `None` if `photos_per_page` is zero.
    pub fn from_config(config: &LayoutConfig) -> Option<Self> {
        Some(Self {
            paper_size: config.paper_size,
            orientation: config.orientation,
            photos_per_page: PageSize::new(config.photos_per_page)?,
        })
    }

    /// Grid columns for the photo cards.
    pub fn columns(&self) -> usize {
        if self.photos_per_page.get() <= 2 { 1 } else { 2 }
    }

    /// On-screen container box `(width, height)` in millimetres.
    pub fn container_mm(&self) -> (f32, f32) {
        match self.orientation {
            Orientation::Landscape => (297.0, 210.0),
            Orientation::Portrait => (210.0, 297.0),
        }
    }

    /// Container box in CSS pixels, rounded to whole pixels.
    pub fn container_px(&self) -> (u32, u32) {
        let (w, h) = self.container_mm();
        ((w * PX_PER_MM).round() as u32, (h * PX_PER_MM).round() as u32)
    }

    /// Exported document page `(width, height)` in millimetres.
    pub fn page_mm(&self) -> (f32, f32) {
        page_dimensions(self.paper_size, self.orientation)
    }
}

/// A change raised by one of the layout controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChange {
    PaperSize(PaperSize),
    Orientation(Orientation),
    PhotosPerPage(PageSize),
}

impl LayoutChange {
    /// Whether this change invalidates the current page index.
    pub fn resets_page(&self) -> bool {
        matches!(self, LayoutChange::PhotosPerPage(_))
    }
}

/// Apply a change. Returns `true` when pagination must restart at page 0.
pub fn apply_change(options: &mut LayoutOptions, change: LayoutChange) -> bool {
    match change {
        LayoutChange::PaperSize(paper) => options.paper_size = paper,
        LayoutChange::Orientation(orientation) => options.orientation = orientation,
        LayoutChange::PhotosPerPage(size) => options.photos_per_page = size,
    }
    change.resets_page()
}
