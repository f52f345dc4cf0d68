//! Pagination over the photo list.
//!
//! All functions here are pure: they never touch the store or the screen.
//! A page is a contiguous window `[index * size, index * size + size)` over
//! the records, clamped to the list bounds.
//!
//! An empty list has **zero** pages. Nothing is rendered and both navigation
//! controls are disabled in that state.

use std::num::NonZeroUsize;

/// Number of photos per page. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    /// Returns `None` for zero.
    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(4).unwrap_or(NonZeroUsize::MIN))
    }
}

/// `ceil(total / size)`.
pub fn page_count(total: usize, size: PageSize) -> usize {
    total.div_ceil(size.get())
}

/// The slice of `items` shown on page `index`. Short or empty past the end.
pub fn page_of<T>(items: &[T], index: usize, size: PageSize) -> &[T] {
    let (start, end) = page_bounds(items.len(), index, size);
    &items[start..end]
}

/// `[start, end)` of page `index`, clamped to `0..=len`.
pub fn page_bounds(len: usize, index: usize, size: PageSize) -> (usize, usize) {
    let start = index.saturating_mul(size.get()).min(len);
    let end = start.saturating_add(size.get()).min(len);
    (start, end)
}

/// A derived window over the store: which page, and which records it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageView {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub page_count: usize,
}

impl PageView {
    pub fn new(len: usize, index: usize, size: PageSize) -> Self {
        let (start, end) = page_bounds(len, index, size);
        Self {
            index,
            start,
            end,
            page_count: page_count(len, size),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `Page 2 of 3`; one-based for display.
    pub fn label(&self) -> String {
        let shown = if self.page_count == 0 { 0 } else { self.index + 1 };
        format!("Page {} of {}", shown, self.page_count)
    }
}

/// Enabled state of the previous/next controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl Navigation {
    pub fn new(index: usize, page_count: usize) -> Self {
        Self {
            prev_enabled: index > 0,
            next_enabled: index + 1 < page_count,
        }
    }
}

/// One entry of the page-jump selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOption {
    /// One-based page number.
    pub number: usize,
    pub label: String,
    pub selected: bool,
}

/// Entries for the page-jump selector, `Go to 1` .. `Go to N`.
pub fn page_selector(index: usize, page_count: usize) -> Vec<PageOption> {
    (1..=page_count)
        .map(|number| PageOption {
            number,
            label: format!("Go to {number}"),
            selected: number == index + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> PageSize {
        PageSize::new(n).unwrap()
    }

    #[test]
    fn page_size_rejects_zero() {
        assert_eq!(PageSize::new(0), None);
        assert_eq!(PageSize::new(1).map(PageSize::get), Some(1));
        assert_eq!(PageSize::default().get(), 4);
    }

    #[test]
    fn page_count_is_ceiling_division() {
        assert_eq!(page_count(10, size(4)), 3);
        assert_eq!(page_count(8, size(4)), 2);
        assert_eq!(page_count(1, size(4)), 1);
        assert_eq!(page_count(7, size(1)), 7);
    }

    #[test]
    fn empty_list_has_zero_pages() {
        assert_eq!(page_count(0, size(4)), 0);
        let view = PageView::new(0, 0, size(4));
        assert!(view.is_empty());
        assert_eq!(view.label(), "Page 0 of 0");
        assert_eq!(
            Navigation::new(0, 0),
            Navigation {
                prev_enabled: false,
                next_enabled: false
            }
        );
        assert!(page_selector(0, 0).is_empty());
    }

    #[test]
    fn ten_photos_four_per_page() {
        let items: Vec<u32> = (0..10).collect();
        let sizes: Vec<usize> = (0..page_count(items.len(), size(4)))
            .map(|i| page_of(&items, i, size(4)).len())
            .collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn pages_reconstruct_the_list_without_gaps_or_overlap() {
        for total in 0..25 {
            let items: Vec<usize> = (0..total).collect();
            for s in 1..7 {
                let rebuilt: Vec<usize> = (0..page_count(total, size(s)))
                    .flat_map(|i| page_of(&items, i, size(s)).iter().copied())
                    .collect();
                assert_eq!(rebuilt, items, "total={total} size={s}");
            }
        }
    }

    #[test]
    fn page_of_past_the_end_is_empty() {
        let items = [1, 2, 3];
        assert!(page_of(&items, 5, size(2)).is_empty());
        assert!(page_of(&items, usize::MAX, size(2)).is_empty());
        assert_eq!(page_of(&items, 1, size(2)), &[3]);
    }

    #[test]
    fn navigation_disables_at_edges() {
        assert_eq!(
            Navigation::new(0, 3),
            Navigation {
                prev_enabled: false,
                next_enabled: true
            }
        );
        assert_eq!(
            Navigation::new(1, 3),
            Navigation {
                prev_enabled: true,
                next_enabled: true
            }
        );
        assert_eq!(
            Navigation::new(2, 3),
            Navigation {
                prev_enabled: true,
                next_enabled: false
            }
        );
        assert_eq!(
            Navigation::new(0, 1),
            Navigation {
                prev_enabled: false,
                next_enabled: false
            }
        );
    }

    #[test]
    fn view_label_is_one_based() {
        let view = PageView::new(10, 2, size(4));
        assert_eq!((view.start, view.end), (8, 10));
        assert_eq!(view.label(), "Page 3 of 3");
    }

    #[test]
    fn selector_marks_current_page() {
        let options = page_selector(1, 3);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Go to 1", "Go to 2", "Go to 3"]);
        let selected: Vec<usize> = options.iter().filter(|o| o.selected).map(|o| o.number).collect();
        assert_eq!(selected, vec![2]);
    }
}
