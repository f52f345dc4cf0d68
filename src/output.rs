//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every photo is shown by its position in the album and its filename, with
//! its date and caption as indented context lines. Pages are shown by their
//! one-based number. The same helpers format a photo wherever it appears,
//! so `pages`, `show` and the shell read alike.
//!
//! # Output Format
//!
//! ## Pages
//!
//! ```text
//! Pages (a4 portrait, 4 per page)
//! 001 Page 1 (4 photos)
//!     001 beach.jpg
//!         Date: Jan 5, 2024
//!     002 harbour.jpg
//!         Date: Jan 7, 2024
//!         Caption: Boats at dawn
//! 002 Page 2 (1 photo)
//!     005 tower.jpg
//!         Date: Feb 1, 2024
//! ```
//!
//! ## Show
//!
//! ```text
//! Page 2 of 3
//!     005 tower.jpg
//!         Date: Feb 1, 2024
//! [prev] [next]
//! ```
//!
//! Disabled controls are shown as `[ -- ]`.
//!
//! ## Export
//!
//! ```text
//! Exporting 3 pages
//!     Page 1 of 3
//!     Page 2 of 3
//!     Page 3 of 3
//! Saved photo-album.pdf (3 pages)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::app::Notice;
use crate::export::ExportEvent;
use crate::layout::LayoutOptions;
use crate::paginate::{Navigation, page_count, page_of};
use crate::render::{PhotoCard, RenderedPage, date_label};
use crate::types::PhotoRecord;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Lines for one photo: header plus date and optional caption.
///
/// ```text
/// 001 beach.jpg
///     Date: Jan 5, 2024
///     Caption: Boats at dawn
/// ```
fn photo_lines(position: usize, card: &PhotoCard, depth: usize) -> Vec<String> {
    let pad = indent(depth);
    let mut lines = vec![
        format!("{}{} {}", pad, format_index(position), card.filename),
        format!("{}    Date: {}", pad, card.date_label),
    ];
    if !card.caption.trim().is_empty() {
        lines.push(format!("{}    Caption: {}", pad, card.caption.trim()));
    }
    lines
}

/// `[prev] [next]` with disabled controls blanked out.
fn navigation_line(nav: Navigation) -> String {
    let control = |enabled: bool, label: &str| {
        if enabled {
            format!("[{label}]")
        } else {
            "[ -- ]".to_string()
        }
    };
    format!(
        "{} {}",
        control(nav.prev_enabled, "prev"),
        control(nav.next_enabled, "next")
    )
}

// ============================================================================
// Pages listing
// ============================================================================

/// Every page of the album with its photos.
pub fn format_pages(records: &[PhotoRecord], layout: &LayoutOptions) -> Vec<String> {
    let size = layout.photos_per_page;
    let mut lines = vec![format!(
        "Pages ({} {}, {} per page)",
        layout.paper_size,
        layout.orientation,
        size.get()
    )];

    let pages = page_count(records.len(), size);
    if pages == 0 {
        lines.push("    (no photos)".to_string());
        return lines;
    }

    for index in 0..pages {
        let slice = page_of(records, index, size);
        lines.push(format!(
            "{} Page {} ({})",
            format_index(index + 1),
            index + 1,
            plural(slice.len(), "photo")
        ));
        let first = index * size.get();
        for (offset, record) in slice.iter().enumerate() {
            let card = PhotoCard::from_record(record);
            lines.extend(photo_lines(first + offset + 1, &card, 1));
        }
    }
    lines
}

pub fn print_pages(records: &[PhotoRecord], layout: &LayoutOptions) {
    for line in format_pages(records, layout) {
        println!("{}", line);
    }
}

// ============================================================================
// Single page
// ============================================================================

/// The page as displayed, with navigation state.
pub fn format_page(page: &RenderedPage, nav: Navigation) -> Vec<String> {
    let mut lines = vec![page.view.label()];
    if page.cards.is_empty() {
        lines.push("    (no photos)".to_string());
    }
    for (offset, card) in page.cards.iter().enumerate() {
        lines.extend(photo_lines(page.view.start + offset + 1, card, 1));
    }
    lines.push(navigation_line(nav));
    lines
}

pub fn print_page(page: &RenderedPage, nav: Navigation) {
    for line in format_page(page, nav) {
        println!("{}", line);
    }
}

// ============================================================================
// Export progress
// ============================================================================

pub fn format_export_event(event: &ExportEvent) -> Vec<String> {
    match event {
        ExportEvent::Started { pages } => vec![format!("Exporting {}", plural(*pages, "page"))],
        ExportEvent::PageCaptured { index, pages } => {
            vec![format!("{}Page {} of {}", indent(1), index + 1, pages)]
        }
        ExportEvent::Saved { path, pages } => vec![format!(
            "Saved {} ({})",
            path.display(),
            plural(*pages, "page")
        )],
        ExportEvent::Failed { message } => vec![format!("Export failed: {}", message)],
    }
}

pub fn print_export_event(event: &ExportEvent) {
    for line in format_export_event(event) {
        println!("{}", line);
    }
}

// ============================================================================
// Command results
// ============================================================================

/// What to tell the user after a command. Re-renders print nothing here;
/// the caller shows the page.
pub fn format_notice(notice: &Notice) -> Vec<String> {
    match notice {
        Notice::Rendered => Vec::new(),
        Notice::Unchanged => vec!["(no change)".to_string()],
        Notice::NoSuchPage { page, page_count } => vec![format!(
            "No page {} (album has {})",
            page + 1,
            plural(*page_count, "page")
        )],
        Notice::UnknownPhoto(name) => vec![format!("No photo named {}", name)],
        Notice::NothingToSave => vec!["No changes to save".to_string()],
        Notice::Saved { count } => vec![format!("Saved dates for {}", plural(*count, "photo"))],
        Notice::SaveFailed(message) => vec![
            "Failed to save changes. Please try again.".to_string(),
            format!("{}{}", indent(1), message),
        ],
        // Progress events already reported the path.
        Notice::Exported { .. } => Vec::new(),
        Notice::ExportFailed(message) => vec![
            "Failed to export the album.".to_string(),
            format!("{}{}", indent(1), message),
        ],
    }
}

pub fn print_notice(notice: &Notice) {
    for line in format_notice(notice) {
        println!("{}", line);
    }
}

/// One-line summary of a date change, used by `set-date`.
pub fn format_date_change(name: &str, record: &PhotoRecord) -> String {
    format!("{} \u{2192} {}", name, date_label(&record.date))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginate::PageSize;
    use crate::render::render_page;
    use crate::test_helpers::{at_day, sample_store};
    use std::path::PathBuf;

    fn layout(per_page: usize) -> LayoutOptions {
        LayoutOptions {
            photos_per_page: PageSize::new(per_page).unwrap(),
            ..LayoutOptions::default()
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "photo"), "1 photo");
        assert_eq!(plural(0, "photo"), "0 photos");
        assert_eq!(plural(3, "page"), "3 pages");
    }

    #[test]
    fn navigation_line_blanks_disabled() {
        let nav = Navigation {
            prev_enabled: false,
            next_enabled: true,
        };
        assert_eq!(navigation_line(nav), "[ -- ] [next]");
    }

    // =========================================================================
    // Listing tests
    // =========================================================================

    #[test]
    fn pages_listing_groups_photos() {
        let mut store = sample_store(&[("a.jpg", 1), ("b.jpg", 2), ("c.jpg", 3)]);
        store.set_caption("b.jpg", "Boats at dawn");
        let lines = format_pages(store.records(), &layout(2));
        assert_eq!(
            lines,
            vec![
                "Pages (a4 portrait, 2 per page)",
                "001 Page 1 (2 photos)",
                "    001 a.jpg",
                "        Date: Jan 1, 2024",
                "    002 b.jpg",
                "        Date: Jan 2, 2024",
                "        Caption: Boats at dawn",
                "002 Page 2 (1 photo)",
                "    003 c.jpg",
                "        Date: Jan 3, 2024",
            ]
        );
    }

    #[test]
    fn pages_listing_of_empty_album() {
        let lines = format_pages(&[], &layout(4));
        assert_eq!(lines[1], "    (no photos)");
    }

    #[test]
    fn page_shows_positions_and_navigation() {
        let store = sample_store(&[("a.jpg", 1), ("b.jpg", 2), ("c.jpg", 3)]);
        let page = render_page(store.records(), 1, &layout(2));
        let lines = format_page(&page, Navigation::new(1, 2));
        assert_eq!(
            lines,
            vec![
                "Page 2 of 2",
                "    003 c.jpg",
                "        Date: Jan 3, 2024",
                "[prev] [ -- ]",
            ]
        );
    }

    // =========================================================================
    // Event and notice tests
    // =========================================================================

    #[test]
    fn export_events() {
        assert_eq!(
            format_export_event(&ExportEvent::Started { pages: 3 }),
            vec!["Exporting 3 pages"]
        );
        assert_eq!(
            format_export_event(&ExportEvent::PageCaptured { index: 0, pages: 3 }),
            vec!["    Page 1 of 3"]
        );
        assert_eq!(
            format_export_event(&ExportEvent::Saved {
                path: PathBuf::from("album.pdf"),
                pages: 1
            }),
            vec!["Saved album.pdf (1 page)"]
        );
    }

    #[test]
    fn failure_notices_carry_message() {
        let lines = format_notice(&Notice::SaveFailed("503".into()));
        assert_eq!(lines[0], "Failed to save changes. Please try again.");
        assert_eq!(lines[1], "    503");
        assert!(format_notice(&Notice::Rendered).is_empty());
        assert_eq!(
            format_notice(&Notice::NoSuchPage {
                page: 4,
                page_count: 2
            }),
            vec!["No page 5 (album has 2 pages)"]
        );
    }

    #[test]
    fn date_change_line() {
        let store = sample_store(&[("a.jpg", 1)]);
        let mut record = store.records()[0].clone();
        record.date = at_day(9);
        assert_eq!(format_date_change("a.jpg", &record), "a.jpg \u{2192} Jan 9, 2024");
    }
}
