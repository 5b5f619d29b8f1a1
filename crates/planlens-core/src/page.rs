//! Stateful pagination over ordered sequences.
//!
//! The controller owns one page position per [`ViewKey`], so independent
//! views (different recommendations, different drilldown levels) never
//! interfere. It only ever slices the sequence handed to it; sorting is the
//! producing engine's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Rows per page across the drilldown views.
pub const PAGE_SIZE: usize = 5;

/// Maximum page numbers shown in the navigation window.
const VISIBLE_PAGES: usize = 5;

/// Drilldown level a pagination state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewLevel {
    Paragraphs,
    Sentences,
    Matches,
}

/// Identifies one paginated view: a drilldown level scoped to a
/// recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewKey {
    pub recommendation_code: String,
    pub level: ViewLevel,
}

impl ViewKey {
    pub fn new(code: impl Into<String>, level: ViewLevel) -> Self {
        Self {
            recommendation_code: code.into(),
            level,
        }
    }
}

/// Everything the presentation layer needs to render one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub current: usize,
    pub total_pages: usize,
    pub total_items: usize,
    /// Page numbers to display, at most five.
    pub numbers: Vec<usize>,
    pub has_previous: bool,
    pub has_next: bool,
    /// Start of the page slice, inclusive.
    pub start: usize,
    /// End of the page slice, exclusive.
    pub end: usize,
}

impl PageWindow {
    /// The page's rows out of the full ordered sequence.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.start.min(items.len())..self.end.min(items.len())]
    }
}

/// Pagination controller: the per-view page positions.
#[derive(Debug)]
pub struct Pager {
    page_size: usize,
    pages: HashMap<ViewKey, usize>,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        debug_assert!(page_size >= 1);
        Self {
            page_size,
            pages: HashMap::new(),
        }
    }

    /// Current window for a view.
    ///
    /// Heals the stored position first: if an upstream filter shrank the
    /// sequence below the remembered page, the view resets to page 1 before
    /// any slice is computed.
    pub fn window(&mut self, key: &ViewKey, total_items: usize) -> PageWindow {
        let total_pages = total_pages(total_items, self.page_size);
        let current = self.heal(key, total_pages);
        let start = (current - 1) * self.page_size;
        let end = (start + self.page_size).min(total_items);
        PageWindow {
            current,
            total_pages,
            total_items,
            numbers: visible_numbers(current, total_pages),
            has_previous: current > 1,
            has_next: current < total_pages,
            start,
            end,
        }
    }

    /// Advance one page; a no-op on the last page.
    pub fn next(&mut self, key: &ViewKey, total_items: usize) {
        let total_pages = total_pages(total_items, self.page_size);
        let current = self.heal(key, total_pages);
        self.pages.insert(key.clone(), (current + 1).min(total_pages));
    }

    /// Go back one page; a no-op on page 1.
    pub fn previous(&mut self, key: &ViewKey, total_items: usize) {
        let total_pages = total_pages(total_items, self.page_size);
        let current = self.heal(key, total_pages);
        self.pages.insert(key.clone(), current.saturating_sub(1).max(1));
    }

    /// Jump straight to a page; requests outside [1, total_pages] are
    /// ignored without touching the stored position.
    pub fn jump(&mut self, key: &ViewKey, page: usize, total_items: usize) {
        let total_pages = total_pages(total_items, self.page_size);
        self.heal(key, total_pages);
        if (1..=total_pages).contains(&page) {
            self.pages.insert(key.clone(), page);
        }
    }

    /// Forget the stored position for a view.
    pub fn reset(&mut self, key: &ViewKey) {
        self.pages.remove(key);
    }

    fn heal(&mut self, key: &ViewKey, total_pages: usize) -> usize {
        let current = self.pages.entry(key.clone()).or_insert(1);
        if *current > total_pages {
            *current = 1;
        }
        *current
    }
}

fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size).max(1)
}

/// At most five visible numbers: all pages when they fit, the first five
/// near the start, the last five near the end, a centered window otherwise.
fn visible_numbers(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages <= VISIBLE_PAGES {
        (1..=total_pages).collect()
    } else if current <= 3 {
        (1..=VISIBLE_PAGES).collect()
    } else if current >= total_pages - 2 {
        (total_pages - 4..=total_pages).collect()
    } else {
        (current - 2..=current + 2).collect()
    }
}
