//! Page rasterization.
//!
//! The [`Rasterizer`] trait is the capture step of the export: it turns a
//! [`RenderedPage`] into a [`PageCapture`]. Its contract:
//!
//! - the capture reflects exactly the cards of the page passed in, photo,
//!   date and caption;
//! - the bitmap's size is the container box in CSS pixels times `options.scale`;
//! - anything transparent is flattened onto `options.background`.
//!
//! Card text is not painted into the bitmap. It comes back as
//! [`TextLabel`]s in bitmap coordinates and the document draws it as text,
//! scaled with the page image.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Download | [`PhotoBackend::fetch_photo`] |
//! | Decode (JPEG, PNG, GIF, WebP) | `image::load_from_memory` |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Compose | `image::imageops::replace` onto an `RgbImage` canvas |
//! | Card text | [`TextLabel`] per line, drawn by the document |
//! | Parallelism | rayon `par_iter` over the page's cards |

use super::calculations::{Cell, TextLabel, fit_within, grid_cells, mm_to_px, split_cell, wrap_text};
use super::params::CaptureOptions;
use crate::backend::{BackendError, PhotoBackend};
use crate::render::{PhotoCard, RenderedPage};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use rayon::prelude::*;
use thiserror::Error;

/// Padding between the container edge and the card grid.
pub const PAGE_PADDING_MM: f32 = 10.0;
/// Gap between cards.
pub const CARD_GAP_MM: f32 = 6.0;
/// Height of the text band under each photo: padding, date and caption.
pub const TEXT_BAND_MM: f32 = 17.0;
/// Space between a photo and its date line.
pub const TEXT_PADDING_MM: f32 = 2.0;
/// Card text size.
pub const LABEL_SIZE_PT: f32 = 10.0;
/// Caption lines that fit in the band.
pub const CAPTION_LINES: usize = 2;
const LINE_HEIGHT: f32 = 1.4;
/// Average Helvetica advance, in ems, used to estimate line length.
const AVG_CHAR_WIDTH_EM: f32 = 0.5;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: BackendError,
    },
    #[error("Failed to decode {url}: {message}")]
    Decode { url: String, message: String },
    #[error("Page container has zero size")]
    EmptyCanvas,
}

/// A captured page: the pixels plus the text drawn over them.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub bitmap: RgbImage,
    pub labels: Vec<TextLabel>,
}

impl PageCapture {
    pub fn new(bitmap: RgbImage) -> Self {
        Self {
            bitmap,
            labels: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }
}

/// Trait for page rasterizers.
pub trait Rasterizer {
    /// Draw `page` into a new capture.
    fn capture(&self, page: &RenderedPage, options: &CaptureOptions) -> Result<PageCapture, CaptureError>;
}

/// Text lines for one card, laid out in its text band.
///
/// The date comes first; the caption follows, wrapped to the band width.
pub fn card_labels(card: &PhotoCard, band: &Cell, scale: f32) -> Vec<TextLabel> {
    let size = LABEL_SIZE_PT * 96.0 / 72.0 * scale;
    let line = (size * LINE_HEIGHT).round() as u32;
    let first = band.y + mm_to_px(TEXT_PADDING_MM, scale) + size.round() as u32;
    let max_chars = (band.width as f32 / (size * AVG_CHAR_WIDTH_EM)).floor() as usize;

    std::iter::once(card.date_label.clone())
        .chain(wrap_text(&card.caption, max_chars, CAPTION_LINES))
        .enumerate()
        .map(|(i, text)| TextLabel {
            text,
            x: band.x,
            baseline: first + i as u32 * line,
            size,
        })
        .collect()
}

/// Rasterizer that lays the page's photos out on the card grid.
///
/// Photos are downloaded through the backend and fitted (never cropped)
/// into their grid cell, centered.
pub struct GridRasterizer<'a, B> {
    backend: &'a B,
}

impl<'a, B: PhotoBackend> GridRasterizer<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    fn load_photo(&self, card: &PhotoCard) -> Result<RgbaImage, CaptureError> {
        let bytes = self
            .backend
            .fetch_photo(&card.url)
            .map_err(|source| CaptureError::Fetch {
                url: card.url.clone(),
                source,
            })?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| CaptureError::Decode {
            url: card.url.clone(),
            message: e.to_string(),
        })?;
        Ok(decoded.to_rgba8())
    }

    /// Photo scaled to fit `cell` and flattened onto the background.
    fn prepare_photo(
        &self,
        card: &PhotoCard,
        cell: &Cell,
        background: Rgb<u8>,
    ) -> Result<RgbImage, CaptureError> {
        let photo = self.load_photo(card)?;
        let (w, h) = fit_within(photo.dimensions(), (cell.width, cell.height));
        if w == 0 || h == 0 {
            return Ok(RgbImage::new(0, 0));
        }
        let resized = imageops::resize(&photo, w, h, FilterType::Lanczos3);
        Ok(flatten(&resized, background))
    }
}

impl<B: PhotoBackend> Rasterizer for GridRasterizer<'_, B> {
    fn capture(&self, page: &RenderedPage, options: &CaptureOptions) -> Result<PageCapture, CaptureError> {
        let width = (page.box_px.0 as f32 * options.scale).round() as u32;
        let height = (page.box_px.1 as f32 * options.scale).round() as u32;
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyCanvas);
        }

        let mut canvas = RgbImage::from_pixel(width, height, options.background);
        if page.cards.is_empty() {
            return Ok(PageCapture::new(canvas));
        }

        let padding = mm_to_px(PAGE_PADDING_MM, options.scale);
        let gap = mm_to_px(CARD_GAP_MM, options.scale);
        let band = mm_to_px(TEXT_BAND_MM, options.scale);
        let cells: Vec<(Cell, Cell)> = grid_cells((width, height), page.columns, page.rows(), padding, gap)
            .iter()
            .map(|cell| split_cell(cell, band))
            .collect();

        let photos: Vec<RgbImage> = page
            .cards
            .par_iter()
            .zip(cells.par_iter())
            .map(|(card, (area, _))| self.prepare_photo(card, area, options.background))
            .collect::<Result<_, _>>()?;

        let mut labels = Vec::new();
        for ((photo, (area, text_band)), card) in photos.iter().zip(&cells).zip(&page.cards) {
            let x = area.x + area.width.saturating_sub(photo.width()) / 2;
            let y = area.y + area.height.saturating_sub(photo.height()) / 2;
            imageops::replace(&mut canvas, photo, x as i64, y as i64);
            labels.extend(card_labels(card, text_band, options.scale));
        }

        tracing::debug!(
            page = page.view.index,
            photos = photos.len(),
            labels = labels.len(),
            width,
            height,
            "Rasterized page"
        );
        Ok(PageCapture {
            bitmap: canvas,
            labels,
        })
    }
}

/// Composite an RGBA image over a solid background.
pub fn flatten(image: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let Rgb([bg_r, bg_g, bg_b]) = background;
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let mix = |c: u8, bg: u8| (c as f32 * alpha + bg as f32 * (1.0 - alpha)).round() as u8;
        Rgb([mix(r, bg_r), mix(g, bg_g), mix(b, bg_b)])
    })
}
