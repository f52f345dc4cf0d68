//! Output document assembly.
//!
//! The [`AlbumDocument`] trait mirrors the calls the export pipeline makes:
//! the document is created with its first page already present, `add_page`
//! appends a blank page, `add_image` and `add_text` draw onto the last page,
//! and `save` writes the file.
//!
//! [`PdfAlbum`] implements it with `printpdf`. Page bitmaps are embedded as
//! JPEG (`DCTDecode`), scaled by choosing the image DPI so the bitmap spans
//! exactly the placement width. Card text (dates and captions) is drawn on
//! top as real PDF text in the builtin Helvetica face, so it stays sharp and
//! searchable.
//!
//! `save` writes to a sibling `.part` file and renames it into place, so an
//! interrupted or failed save never leaves a truncated PDF behind.

use crate::imaging::{ImageEncoding, Placement, PlacedText};
use crate::types::{Orientation, PaperSize, page_dimensions};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageFilter, ImageTransform, ImageXObject,
    IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex, PdfPageIndex, Px,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LAYER_NAME: &str = "Photos";

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Document was already saved")]
    Closed,
}

/// Physical setup of the output document. Units are millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub paper: PaperSize,
    pub orientation: Orientation,
}

impl PageSetup {
    pub fn dimensions_mm(&self) -> (f32, f32) {
        page_dimensions(self.paper, self.orientation)
    }
}

/// Trait for multi-page output documents.
pub trait AlbumDocument {
    /// Append a blank page; later images are drawn onto it.
    fn add_page(&mut self) -> Result<(), DocumentError>;

    /// Draw a bitmap onto the last page.
    fn add_image(
        &mut self,
        bitmap: &RgbImage,
        encoding: ImageEncoding,
        placement: Placement,
    ) -> Result<(), DocumentError>;

    /// Draw one line of text onto the last page.
    fn add_text(&mut self, text: &PlacedText) -> Result<(), DocumentError>;

    /// Write the document to `path`.
    fn save(&mut self, path: &Path) -> Result<(), DocumentError>;

    /// Pages in the document, including the initial one.
    fn page_count(&self) -> usize;
}

/// PDF document built with `printpdf`.
pub struct PdfAlbum {
    doc: Option<PdfDocumentReference>,
    current: (PdfPageIndex, PdfLayerIndex),
    page_mm: (f32, f32),
    pages: usize,
    font: Option<IndirectFontRef>,
}

impl PdfAlbum {
    pub fn new(title: &str, setup: &PageSetup) -> Self {
        let page_mm = setup.dimensions_mm();
        let (doc, page, layer) = PdfDocument::new(title, Mm(page_mm.0), Mm(page_mm.1), LAYER_NAME);
        Self {
            doc: Some(doc),
            current: (page, layer),
            page_mm,
            pages: 1,
            font: None,
        }
    }

    fn doc(&self) -> Result<&PdfDocumentReference, DocumentError> {
        self.doc.as_ref().ok_or(DocumentError::Closed)
    }

    /// Helvetica, registered with the document on first use.
    fn font(&mut self) -> Result<IndirectFontRef, DocumentError> {
        if let Some(font) = &self.font {
            return Ok(font.clone());
        }
        let font = self
            .doc()?
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DocumentError::Pdf(e.to_string()))?;
        self.font = Some(font.clone());
        Ok(font)
    }
}

impl AlbumDocument for PdfAlbum {
    fn add_page(&mut self) -> Result<(), DocumentError> {
        let (w, h) = self.page_mm;
        let label = format!("Page {}", self.pages + 1);
        let current = self.doc()?.add_page(Mm(w), Mm(h), LAYER_NAME);
        tracing::trace!(page = %label, "Added document page");
        self.current = current;
        self.pages += 1;
        Ok(())
    }

    fn add_image(
        &mut self,
        bitmap: &RgbImage,
        encoding: ImageEncoding,
        placement: Placement,
    ) -> Result<(), DocumentError> {
        let (width_px, height_px) = bitmap.dimensions();
        if width_px == 0 || height_px == 0 || placement.width <= 0.0 {
            return Err(DocumentError::Pdf("cannot place an empty image".into()));
        }

        let ImageEncoding::Jpeg(quality) = encoding;
        let mut jpeg = Vec::new();
        JpegEncoder::new_with_quality(&mut jpeg, quality.value() as u8).encode_image(bitmap)?;

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: jpeg,
            image_filter: Some(ImageFilter::DCT),
            clipping_bbox: None,
            smask: None,
        });

        // DPI that makes the bitmap exactly `placement.width` wide.
        let dpi = width_px as f32 * 25.4 / placement.width;
        // PDF origin is bottom-left.
        let bottom = self.page_mm.1 - placement.y - placement.height;

        let (page, layer) = self.current;
        let layer = self.doc()?.get_page(page).get_layer(layer);
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(placement.x)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn add_text(&mut self, text: &PlacedText) -> Result<(), DocumentError> {
        if text.text.is_empty() {
            return Ok(());
        }
        let font = self.font()?;
        let (page, layer) = self.current;
        let layer = self.doc()?.get_page(page).get_layer(layer);
        layer.use_text(
            text.text.as_str(),
            text.size_pt,
            Mm(text.x),
            Mm(self.page_mm.1 - text.baseline),
            &font,
        );
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
        let doc = self.doc.take().ok_or(DocumentError::Closed)?;
        let part = part_path(path);
        let result = File::create(&part)
            .map_err(DocumentError::from)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                doc.save(&mut writer)
                    .map_err(|e| DocumentError::Pdf(e.to_string()))
            })
            .and_then(|_| std::fs::rename(&part, path).map_err(DocumentError::from));
        if result.is_err()
            && let Err(err) = std::fs::remove_file(&part)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %part.display(), error = %err, "Could not remove partial PDF");
        }
        result
    }

    fn page_count(&self) -> usize {
        self.pages
    }
}

/// Temporary sibling path used while saving.
pub fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Operations recorded by [`RecordingDocument`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum DocOp {
        AddPage,
        AddImage {
            bitmap: (u32, u32),
            placement: Placement,
        },
        AddText(PlacedText),
        Save(PathBuf),
    }

    /// Document that records calls into a shared log.
    ///
    /// The log is an `Arc<Mutex<..>>` so tests can inspect it after the
    /// exporter has consumed the document.
    #[derive(Clone)]
    pub struct RecordingDocument {
        pub setup: PageSetup,
        pub ops: Arc<Mutex<Vec<DocOp>>>,
        pub fail_save: bool,
        pages: usize,
    }

    impl RecordingDocument {
        pub fn new(setup: PageSetup) -> Self {
            Self {
                setup,
                ops: Arc::new(Mutex::new(Vec::new())),
                fail_save: false,
                pages: 1,
            }
        }

        /// A document whose `save` always fails.
        pub fn failing_save(setup: PageSetup) -> Self {
            Self {
                fail_save: true,
                ..Self::new(setup)
            }
        }

        pub fn ops(&self) -> Vec<DocOp> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl AlbumDocument for RecordingDocument {
        fn add_page(&mut self) -> Result<(), DocumentError> {
            self.ops.lock().unwrap().push(DocOp::AddPage);
            self.pages += 1;
            Ok(())
        }

        fn add_image(
            &mut self,
            bitmap: &RgbImage,
            _encoding: ImageEncoding,
            placement: Placement,
        ) -> Result<(), DocumentError> {
            self.ops.lock().unwrap().push(DocOp::AddImage {
                bitmap: bitmap.dimensions(),
                placement,
            });
            Ok(())
        }

        fn add_text(&mut self, text: &PlacedText) -> Result<(), DocumentError> {
            self.ops.lock().unwrap().push(DocOp::AddText(text.clone()));
            Ok(())
        }

        fn save(&mut self, path: &Path) -> Result<(), DocumentError> {
            if self.fail_save {
                return Err(DocumentError::Io(std::io::Error::other("disk full")));
            }
            self.ops.lock().unwrap().push(DocOp::Save(path.to_path_buf()));
            Ok(())
        }

        fn page_count(&self) -> usize {
            self.pages
        }
    }

    fn a4() -> PageSetup {
        PageSetup {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
        }
    }

    fn full_page() -> Placement {
        Placement {
            x: 0.0,
            y: 0.0,
            width: 210.0,
            height: 297.0,
        }
    }

    #[test]
    fn pdf_album_writes_a_pdf() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("album.pdf");
        let mut doc = PdfAlbum::new("Album", &a4());
        let bitmap = RgbImage::from_pixel(21, 30, image::Rgb([200, 10, 10]));

        doc.add_image(&bitmap, ImageEncoding::default(), full_page()).unwrap();
        doc.add_page().unwrap();
        doc.add_image(&bitmap, ImageEncoding::default(), full_page()).unwrap();
        assert_eq!(doc.page_count(), 2);
        doc.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!part_path(&path).exists());
    }

    #[test]
    fn pdf_album_writes_card_text() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("album.pdf");
        let mut doc = PdfAlbum::new("Album", &a4());
        let bitmap = RgbImage::from_pixel(21, 30, image::Rgb([255, 255, 255]));
        doc.add_image(&bitmap, ImageEncoding::default(), full_page()).unwrap();
        for line in ["Jan 5, 2024", "Harbour at dawn"] {
            doc.add_text(&PlacedText {
                text: line.into(),
                x: 20.0,
                baseline: 250.0,
                size_pt: 10.0,
            })
            .unwrap();
        }
        doc.save(&path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn empty_text_is_skipped() {
        let mut doc = PdfAlbum::new("Album", &a4());
        let blank = PlacedText {
            text: String::new(),
            x: 0.0,
            baseline: 0.0,
            size_pt: 10.0,
        };
        doc.add_text(&blank).unwrap();
        assert!(doc.font.is_none());
    }

    #[test]
    fn text_after_save_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let mut doc = PdfAlbum::new("Album", &a4());
        doc.save(&tmp.path().join("a.pdf")).unwrap();
        let line = PlacedText {
            text: "late".into(),
            x: 0.0,
            baseline: 10.0,
            size_pt: 10.0,
        };
        assert!(matches!(doc.add_text(&line), Err(DocumentError::Closed)));
    }

    #[test]
    fn pdf_album_cannot_be_saved_twice() {
        let tmp = TempDir::new().unwrap();
        let mut doc = PdfAlbum::new("Album", &a4());
        doc.save(&tmp.path().join("a.pdf")).unwrap();
        assert!(matches!(
            doc.save(&tmp.path().join("b.pdf")),
            Err(DocumentError::Closed)
        ));
        assert!(matches!(doc.add_page(), Err(DocumentError::Closed)));
    }

    #[test]
    fn pdf_album_save_into_missing_dir_leaves_nothing() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("album.pdf");
        let mut doc = PdfAlbum::new("Album", &a4());
        assert!(matches!(doc.save(&path), Err(DocumentError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn failed_rename_removes_part_file() {
        let tmp = TempDir::new().unwrap();
        // A directory already sits where the PDF should go.
        let path = tmp.path().join("album.pdf");
        std::fs::create_dir(&path).unwrap();
        let mut doc = PdfAlbum::new("Album", &a4());
        assert!(matches!(doc.save(&path), Err(DocumentError::Io(_))));
        assert!(path.is_dir());
        assert!(!part_path(&path).exists());
    }

    #[test]
    fn empty_bitmap_is_rejected() {
        let mut doc = PdfAlbum::new("Album", &a4());
        let err = doc
            .add_image(&RgbImage::new(0, 0), ImageEncoding::default(), full_page())
            .unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_)));
    }

    #[test]
    fn part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/tmp/out/album.pdf")),
            PathBuf::from("/tmp/out/album.pdf.part")
        );
    }

    #[test]
    fn setup_dimensions_follow_orientation() {
        let setup = PageSetup {
            paper: PaperSize::Letter,
            orientation: Orientation::Landscape,
        };
        assert_eq!(setup.dimensions_mm(), (279.4, 215.9));
    }
}
