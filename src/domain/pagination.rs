//! Pagination for long selectable lists
//!
//! Pure computations only. The single piece of state they feed is
//! `DialogState::pagination`, which steps update through their outcome.

use serde::{Deserialize, Serialize};

use crate::domain::input::CallbackData;
use crate::domain::messenger::{Button, ButtonRow};

pub const PREVIOUS_PAGE_LABEL: &str = "«";
pub const NEXT_PAGE_LABEL: &str = "»";
pub const PLACEHOLDER_LABEL: &str = " ";

/// Number of pages for a collection, never less than one
pub fn total_pages(total_items: usize, items_per_page: usize) -> u32 {
    if items_per_page == 0 {
        return 1;
    }
    let pages = total_items.div_ceil(items_per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Half-open window `[(page-1)*n, page*n)` clamped to the collection
pub fn page_slice<T>(items: &[T], page: u32, items_per_page: usize) -> &[T] {
    if page == 0 || items_per_page == 0 {
        return &[];
    }

    let start = (page as usize - 1).saturating_mul(items_per_page);
    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(items_per_page).min(items.len());
    &items[start..end]
}

/// Fixed-width navigation row: previous, page indicator, next.
///
/// Positions without a target are filled with inert placeholders.
pub fn navigation_row(page: u32, total_pages: u32) -> ButtonRow {
    let previous = if page > 1 {
        Button::new(PREVIOUS_PAGE_LABEL, CallbackData::page(page - 1))
    } else {
        Button::placeholder(PLACEHOLDER_LABEL)
    };

    let indicator = Button::placeholder(format!("{}/{}", page, total_pages));

    let next = if page < total_pages {
        Button::new(NEXT_PAGE_LABEL, CallbackData::page(page + 1))
    } else {
        Button::placeholder(PLACEHOLDER_LABEL)
    };

    vec![previous, indicator, next]
}

/// Pagination sub-state persisted with the dialog state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl PaginationState {
    /// Start on the first page
    pub fn new(total_items: usize, items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            total_pages: total_pages(total_items, items_per_page),
            total_items,
            items_per_page,
        }
    }

    /// Move to `page`, clamped to the valid range
    pub fn with_page(mut self, page: u32) -> Self {
        self.current_page = page.clamp(1, self.total_pages);
        self
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        page_slice(items, self.current_page, self.items_per_page)
    }

    pub fn navigation_row(&self) -> ButtonRow {
        navigation_row(self.current_page, self.total_pages)
    }

    /// Item rows for the current page followed by the navigation row when
    /// the collection spans more than one page
    pub fn grid<T>(&self, items: &[T], to_button: impl Fn(&T) -> Button) -> Vec<ButtonRow> {
        let mut rows: Vec<ButtonRow> = self
            .slice(items)
            .iter()
            .map(|item| vec![to_button(item)])
            .collect();

        if self.total_pages > 1 {
            rows.push(self.navigation_row());
        }

        rows
    }
}
