//! Result view engine: free-text filter, then fixed-size pages
//!
//! Pure functions over a movement list. Page clamping and resetting the
//! page when the filter changes belong to the caller (see
//! [`crate::session::SearchSession`]).

use serde::{Deserialize, Serialize};

use crate::models::Movement;

/// Default movements per page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// One page of filtered movements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub movements: Vec<Movement>,
    /// 1-based page number as requested
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// Movements matching the filter
    pub filtered_count: usize,
    /// Movements before filtering
    pub total_count: usize,
}

/// Keep movements whose reference, amount or concept contains `filter`
///
/// Case-insensitive; an empty filter keeps everything.
pub fn filter_movements(movements: &[Movement], filter: &str) -> Vec<Movement> {
    if filter.is_empty() {
        return movements.to_vec();
    }
    let needle = filter.to_lowercase();
    movements
        .iter()
        .filter(|m| m.matches(&needle))
        .cloned()
        .collect()
}

/// Number of pages needed for `count` items
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    (count + page_size - 1) / page_size
}

/// Slice out 1-based `page`; out-of-range pages are empty
pub fn paginate(movements: &[Movement], page: usize, page_size: usize) -> Vec<Movement> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    movements.iter().skip(start).take(page_size).cloned().collect()
}

/// Filter then paginate
pub fn view(movements: &[Movement], filter: &str, page: usize, page_size: usize) -> ResultPage {
    let filtered = filter_movements(movements, filter);
    ResultPage {
        movements: paginate(&filtered, page, page_size),
        page,
        page_size,
        total_pages: total_pages(filtered.len(), page_size),
        filtered_count: filtered.len(),
        total_count: movements.len(),
    }
}
