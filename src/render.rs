//! Page renderer: turns one page of records into the container the user
//! sees and the exporter captures.
//!
//! Rendering produces a [`RenderedPage`], a plain description of the
//! container (box size, grid columns, one [`PhotoCard`] per record). Two
//! consumers read it:
//!
//! - [`render_page_html`] / [`render_preview_document`]: maud markup of the
//!   container, written by the `preview` command.
//! - [`Rasterizer`](crate::imaging::Rasterizer): draws the same cards into a
//!   bitmap for the PDF.
//!
//! A `RenderedPage` is rebuilt from the store every time it is needed, so a
//! capture can never see cards left over from a previous page.

use crate::layout::LayoutOptions;
use crate::paginate::{PageView, page_of};
use crate::types::PhotoRecord;
use chrono::{DateTime, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};

/// One photo card on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCard {
    pub filename: String,
    pub url: String,
    /// Short human date shown under the photo.
    pub date_label: String,
    /// Value for a `datetime-local` input (`YYYY-MM-DDTHH:MM`).
    pub date_input: String,
    pub caption: String,
}

impl PhotoCard {
    pub fn from_record(record: &PhotoRecord) -> Self {
        Self {
            filename: record.name().to_string(),
            url: record.url.clone(),
            date_label: date_label(&record.date),
            date_input: date_input_value(&record.date),
            caption: record.caption.clone(),
        }
    }
}

/// The container as drawn for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub view: PageView,
    pub columns: usize,
    /// Container box in millimetres.
    pub box_mm: (f32, f32),
    /// Container box in CSS pixels.
    pub box_px: (u32, u32),
    pub cards: Vec<PhotoCard>,
}

impl RenderedPage {
    /// Rows needed to hold the cards in `columns` columns.
    pub fn rows(&self) -> usize {
        self.cards.len().div_ceil(self.columns.max(1))
    }
}

/// Render page `index` of `records` with the given layout.
pub fn render_page(records: &[PhotoRecord], index: usize, layout: &LayoutOptions) -> RenderedPage {
    let size = layout.photos_per_page;
    let cards = page_of(records, index, size)
        .iter()
        .map(PhotoCard::from_record)
        .collect();
    RenderedPage {
        view: PageView::new(records.len(), index, size),
        columns: layout.columns(),
        box_mm: layout.container_mm(),
        box_px: layout.container_px(),
        cards,
    }
}

pub fn date_label(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

pub fn date_input_value(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M").to_string()
}

const PREVIEW_CSS: &str = r#"
body { margin: 0; background: #eee; font-family: sans-serif; }
.pages { margin: 1rem auto; background: #fff; box-shadow: 0 0 4px rgba(0,0,0,.2); }
.page { display: grid; gap: 6mm; padding: 10mm; box-sizing: border-box; }
.photo-card { display: flex; flex-direction: column; min-height: 0; }
.photo-container { flex: 1; display: flex; align-items: center; justify-content: center; min-height: 0; }
.photo-container img { max-width: 100%; max-height: 100%; object-fit: contain; }
.photo-info { padding-top: 2mm; font-size: 10pt; color: #333; }
.date-input { display: none; }
.photo-caption { width: 100%; border: none; resize: none; font: inherit; }
"#;

/// Markup of the page container alone.
pub fn render_page_html(page: &RenderedPage) -> Markup {
    let (box_w, box_h) = page.box_mm;
    let pages_style = format!("max-width: {box_w}mm;");
    let page_style = format!(
        "grid-template-columns: repeat({}, 1fr); min-height: {box_h}mm;",
        page.columns
    );

    html! {
        div.pages style=(pages_style) {
            div.page #currentPage style=(page_style) {
                @for card in &page.cards {
                    div.photo-card data-filename=(card.filename) {
                        div.photo-container {
                            img src=(card.url) alt=(card.filename);
                        }
                        div.photo-info {
                            div.date-container {
                                div.photo-date { (card.date_label) }
                                input.date-input type="datetime-local" value=(card.date_input);
                            }
                            textarea.photo-caption placeholder="Add a caption..." { (card.caption) }
                        }
                    }
                }
            }
        }
    }
}

/// Standalone HTML document previewing one page, with navigation info.
pub fn render_preview_document(page: &RenderedPage) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                title { "Photo album - " (page.view.label()) }
                style { (PreEscaped(PREVIEW_CSS)) }
            }
            body {
                p #pageInfo { (page.view.label()) }
                (render_page_html(page))
            }
        }
    }
}
