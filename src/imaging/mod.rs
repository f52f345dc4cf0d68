//! Page imaging: rasterizing rendered pages and placing them on paper.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Capture** | [`GridRasterizer`]: `image` decode + Lanczos3 resize, rayon per card |
//! | **Placement** | [`fit_to_page`]: fit-width-then-height, centered |
//! | **Card text** | [`TextLabel`] on the bitmap, [`place_text`] onto the page |
//! | **Encoding** | [`ImageEncoding`]: JPEG at the configured [`Quality`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for page and grid geometry (unit testable)
//! - **Parameters**: Data structures describing capture and encoding
//! - **Raster**: [`Rasterizer`] trait + [`GridRasterizer`]

mod calculations;
mod params;
pub mod raster;

pub use calculations::{
    Cell, PlacedText, Placement, TextLabel, fit_to_page, fit_within, grid_cells, mm_to_px,
    place_text, split_cell, wrap_text,
};
pub use params::{CaptureOptions, ImageEncoding, Quality};
pub use raster::{CaptureError, GridRasterizer, PageCapture, Rasterizer};
