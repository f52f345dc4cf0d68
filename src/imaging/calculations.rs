//! Pure calculation functions for page geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Where a bitmap lands on a document page, in millimetres from the
/// top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Fit a bitmap into a page and center it.
///
/// The image first takes the full page width; if that makes it taller than
/// the page it is shrunk to the page height instead. Aspect ratio is kept.
///
/// # Examples
/// ```
/// # use simple_album::imaging::fit_to_page;
/// // 2:1 bitmap on A4 portrait → full width, centered vertically
/// let p = fit_to_page((2000, 1000), (210.0, 297.0));
/// assert_eq!((p.width, p.height), (210.0, 105.0));
/// assert_eq!((p.x, p.y), (0.0, 96.0));
/// ```
pub fn fit_to_page(bitmap: (u32, u32), page: (f32, f32)) -> Placement {
    let (page_w, page_h) = page;
    let aspect = bitmap.0 as f32 / bitmap.1.max(1) as f32;

    let mut width = page_w;
    let mut height = width / aspect;
    if height > page_h {
        height = page_h;
        width = height * aspect;
    }

    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}

/// Largest size with the source aspect ratio that fits inside `bounds`.
///
/// Never returns a zero dimension for a non-empty source.
pub fn fit_within(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let scale = (max_w as f64 / src_w as f64).min(max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h);
    (w, h)
}

/// A cell of the card grid, in bitmap pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Split a canvas into a `columns × rows` grid with outer padding and gaps.
///
/// Cells are returned row by row, left to right, matching the order cards
/// flow in a CSS grid.
pub fn grid_cells(canvas: (u32, u32), columns: usize, rows: usize, padding: u32, gap: u32) -> Vec<Cell> {
    if columns == 0 || rows == 0 {
        return Vec::new();
    }
    let (canvas_w, canvas_h) = canvas;
    let cols = columns as u32;
    let rows_u = rows as u32;
    let inner_w = canvas_w.saturating_sub(2 * padding + gap * (cols - 1));
    let inner_h = canvas_h.saturating_sub(2 * padding + gap * (rows_u - 1));
    let cell_w = inner_w / cols;
    let cell_h = inner_h / rows_u;

    let mut cells = Vec::with_capacity(columns * rows);
    for row in 0..rows_u {
        for col in 0..cols {
            cells.push(Cell {
                x: padding + col * (cell_w + gap),
                y: padding + row * (cell_h + gap),
                width: cell_w,
                height: cell_h,
            });
        }
    }
    cells
}

/// Split a card cell into the photo area and the text band below it.
///
/// The band is at most `band` pixels tall; a cell shorter than that is all
/// band.
pub fn split_cell(cell: &Cell, band: u32) -> (Cell, Cell) {
    let band = band.min(cell.height);
    let photo = Cell {
        height: cell.height - band,
        ..*cell
    };
    let text = Cell {
        y: cell.y + photo.height,
        height: band,
        ..*cell
    };
    (photo, text)
}

/// A line of text positioned on a captured bitmap, in bitmap pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub x: u32,
    /// Baseline, from the top of the bitmap.
    pub baseline: u32,
    /// Font size in bitmap pixels.
    pub size: f32,
}

/// A line of text positioned on a document page, in millimetres from the
/// top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub text: String,
    pub x: f32,
    pub baseline: f32,
    pub size_pt: f32,
}

/// Map a label from bitmap pixels onto the page, following the bitmap's
/// placement so text scales and moves with the image it belongs to.
pub fn place_text(label: &TextLabel, bitmap: (u32, u32), placement: &Placement) -> PlacedText {
    let mm_per_px = placement.width / bitmap.0.max(1) as f32;
    PlacedText {
        text: label.text.clone(),
        x: placement.x + label.x as f32 * mm_per_px,
        baseline: placement.y + label.baseline as f32 * mm_per_px,
        size_pt: label.size * mm_per_px * 72.0 / 25.4,
    }
}

/// Break `text` into at most `max_lines` lines of at most `max_chars`
/// characters, on whitespace. Words longer than a line are split; text
/// that doesn't fit ends with `...`.
pub fn wrap_text(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let max_chars = max_chars.max(4);
    let pieces = text.split_whitespace().flat_map(|word| {
        word.chars()
            .collect::<Vec<_>>()
            .chunks(max_chars)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
    });

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for piece in pieces {
        if current.is_empty() {
            current = piece;
        } else if current.chars().count() + 1 + piece.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&piece);
        } else {
            lines.push(std::mem::replace(&mut current, piece));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = max_chars - 3;
            if last.chars().count() > keep {
                *last = last.chars().take(keep).collect();
            }
            last.push_str("...");
        }
    }
    lines
}

/// Convert millimetres to bitmap pixels at 96 dpi times `scale`.
pub fn mm_to_px(mm: f32, scale: f32) -> u32 {
    (mm * crate::layout::PX_PER_MM * scale).round().max(0.0) as u32
}
