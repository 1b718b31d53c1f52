//! Cursor pagination driver
//!
//! The loop is an explicit state machine. [`transition`] is pure, so every
//! termination rule can be exercised without a network; [`drive`] feeds it
//! with pages from a [`PagingSource`].

use async_trait::async_trait;

use crate::error::CoreResult;

/// Default cap on page requests per search
pub const DEFAULT_MAX_PAGES: usize = 50;

/// A provider that returns results one cursor page at a time
#[async_trait]
pub trait PagingSource: Send + Sync {
    type Item: Send;

    /// Fetch the page that follows `cursor` (empty for the first page)
    async fn fetch_page(&self, cursor: &str) -> CoreResult<Vec<Self::Item>>;

    /// Cursor carried by an item, if any
    fn cursor_of(item: &Self::Item) -> Option<&str>;
}

/// Paging loop states
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingState {
    /// Ready to request the page after `cursor`; `pages` already issued
    Requesting { cursor: String, pages: usize },
    /// A non-empty page was appended; decide whether to continue
    Accumulating {
        cursor: String,
        pages: usize,
        next_cursor: Option<String>,
    },
    /// Provider signalled the last page
    Done { pages: usize },
    /// Request cap reached while the cursor was still advancing
    SafetyLimitHit { pages: usize },
}

impl PagingState {
    /// Initial state: nothing requested, empty cursor
    pub fn start() -> Self {
        PagingState::Requesting {
            cursor: String::new(),
            pages: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PagingState::Done { .. } | PagingState::SafetyLimitHit { .. })
    }

    /// Requests issued so far
    pub fn pages(&self) -> usize {
        match self {
            PagingState::Requesting { pages, .. }
            | PagingState::Accumulating { pages, .. }
            | PagingState::Done { pages }
            | PagingState::SafetyLimitHit { pages } => *pages,
        }
    }
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingEvent {
    /// A page arrived with `len` items; `last_cursor` is the last item's cursor
    PageFetched {
        len: usize,
        last_cursor: Option<String>,
    },
    /// The fetched items were appended to the accumulator
    PageAccumulated,
}

/// Pure transition function of the paging loop
///
/// Events that do not apply to the current state leave it unchanged.
pub fn transition(state: PagingState, event: PagingEvent, max_pages: usize) -> PagingState {
    match (state, event) {
        (PagingState::Requesting { cursor, pages }, PagingEvent::PageFetched { len, last_cursor }) => {
            let pages = pages + 1;
            if len == 0 {
                PagingState::Done { pages }
            } else {
                PagingState::Accumulating {
                    cursor,
                    pages,
                    next_cursor: last_cursor,
                }
            }
        }
        (
            PagingState::Accumulating {
                cursor,
                pages,
                next_cursor,
            },
            PagingEvent::PageAccumulated,
        ) => match next_cursor {
            Some(next) if !next.is_empty() && next != cursor => {
                if pages >= max_pages {
                    PagingState::SafetyLimitHit { pages }
                } else {
                    PagingState::Requesting { cursor: next, pages }
                }
            }
            _ => PagingState::Done { pages },
        },
        (state, _) => state,
    }
}

/// Everything a paging run produced
#[derive(Debug)]
pub struct PagedOutcome<T> {
    /// Items from every page, in arrival order
    pub items: Vec<T>,
    /// Requests issued
    pub pages: usize,
    /// True when the request cap stopped the loop
    pub truncated: bool,
}

/// Run the paging loop against `source` until exhaustion or `max_pages`
///
/// Any fetch error aborts the run and discards what was accumulated.
pub async fn drive<S: PagingSource>(source: &S, max_pages: usize) -> CoreResult<PagedOutcome<S::Item>> {
    let mut state = PagingState::start();
    let mut items = Vec::new();

    loop {
        state = match state {
            PagingState::Requesting { ref cursor, pages } => {
                log::debug!(target: "txportal::paging", "Page {} - cursor: {:?}", pages + 1, cursor);
                let page = source.fetch_page(cursor).await?;
                let last_cursor = page
                    .last()
                    .and_then(S::cursor_of)
                    .map(|c| c.to_string());
                let len = page.len();
                let next = transition(state, PagingEvent::PageFetched { len, last_cursor }, max_pages);
                items.extend(page);
                next
            }
            PagingState::Accumulating { .. } => {
                transition(state, PagingEvent::PageAccumulated, max_pages)
            }
            PagingState::Done { pages } => {
                log::debug!(target: "txportal::paging", "Last page reached after {} requests, {} items", pages, items.len());
                return Ok(PagedOutcome {
                    items,
                    pages,
                    truncated: false,
                });
            }
            PagingState::SafetyLimitHit { pages } => {
                log::warn!(
                    target: "txportal::paging",
                    "Page limit of {} reached with the cursor still advancing; keeping {} items, result may be incomplete",
                    pages,
                    items.len()
                );
                return Ok(PagedOutcome {
                    items,
                    pages,
                    truncated: true,
                });
            }
        };
    }
}
