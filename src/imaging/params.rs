//! Parameter types for capture and encoding.
//!
//! These structs describe *what* to produce, not *how*. They sit between
//! the export pipeline (which decides what each page needs) and the
//! rasterizer / document writer (which do the pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`CaptureOptions`]: Device scale and background for rasterizing a page.
//! - [`ImageEncoding`]: How a page bitmap is embedded in the document.

use crate::config::{ExportConfig, parse_hex_color};
use image::Rgb;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How a page is rasterized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Bitmap pixels per CSS pixel.
    pub scale: f32,
    /// Fill behind and between photos; transparent pixels are flattened onto it.
    pub background: Rgb<u8>,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Rgb([255, 255, 255]),
        }
    }
}

impl CaptureOptions {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            scale: config.scale,
            background: Rgb(parse_hex_color(&config.background).unwrap_or([255, 255, 255])),
        }
    }
}

/// Encoding of a page bitmap inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageEncoding {
    Jpeg(Quality),
}

impl Default for ImageEncoding {
    fn default() -> Self {
        ImageEncoding::Jpeg(Quality::new(100))
    }
}
