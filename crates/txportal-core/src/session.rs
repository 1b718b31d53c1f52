//! Per-user search state
//!
//! Holds the latest result, the filter text and the current page. Every
//! search takes a ticket; only the newest ticket may store its outcome.

use crate::error::CoreResult;
use crate::models::AccountQueryResult;
use crate::view::{self, ResultPage, DEFAULT_PAGE_SIZE};

/// Generation number of one search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Clone)]
pub struct SearchSession {
    generation: u64,
    result: Option<AccountQueryResult>,
    filter: String,
    page: usize,
    page_size: usize,
    last_error: Option<String>,
}

impl SearchSession {
    pub fn new(page_size: usize) -> Self {
        Self {
            generation: 0,
            result: None,
            filter: String::new(),
            page: 1,
            page_size: page_size.max(1),
            last_error: None,
        }
    }

    pub fn begin_search(&mut self) -> SearchTicket {
        self.generation += 1;
        SearchTicket(self.generation)
    }

    /// Store the outcome of `ticket`; returns false if a newer search started
    pub fn complete(&mut self, ticket: SearchTicket, outcome: CoreResult<AccountQueryResult>) -> bool {
        if ticket.0 != self.generation {
            log::debug!(
                target: "txportal::session",
                "Discarding stale search {} (current {})",
                ticket.0, self.generation
            );
            return false;
        }

        self.filter.clear();
        self.page = 1;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.last_error = None;
            }
            Err(e) => {
                self.result = None;
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub fn result(&self) -> Option<&AccountQueryResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the filter; a different filter goes back to page 1
    pub fn set_filter(&mut self, filter: &str) {
        if self.filter != filter {
            self.filter = filter.to_string();
            self.page = 1;
        }
    }

    /// Move to `page`, clamped to the available pages
    pub fn set_page(&mut self, page: usize) -> usize {
        let last = self.total_pages().max(1);
        self.page = page.clamp(1, last);
        self.page
    }

    pub fn total_pages(&self) -> usize {
        match &self.result {
            Some(result) => view::total_pages(
                view::filter_movements(&result.movements, &self.filter).len(),
                self.page_size,
            ),
            None => 0,
        }
    }

    pub fn view(&self) -> ResultPage {
        let movements = self.result.as_ref().map(|r| r.movements.as_slice()).unwrap_or(&[]);
        view::view(movements, &self.filter, self.page, self.page_size)
    }

    /// Forget everything, e.g. on sign-out
    pub fn clear(&mut self) {
        self.result = None;
        self.filter.clear();
        self.page = 1;
        self.last_error = None;
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::models::Movement;

    fn result(n: usize) -> AccountQueryResult {
        let movements = (0..n)
            .map(|i| Movement {
                reference: format!("R{}", i),
                amount: 10.0,
                date: "01/02/2024".to_string(),
                time: "-".to_string(),
                concept: if i < 20 { "Transferencia".to_string() } else { "Pago".to_string() },
            })
            .collect();
        AccountQueryResult::synthetic("0102", "BDV", movements)
    }

    #[test]
    fn test_complete_stores_result() {
        let mut session = SearchSession::default();
        let ticket = session.begin_search();
        assert!(session.complete(ticket, Ok(result(150))));

        let page = session.view();
        assert_eq!(page.movements.len(), 100);
        assert_eq!(page.total_pages, 2);
        assert_eq!(session.set_page(2), 2);
        assert_eq!(session.view().movements.len(), 50);
    }

    #[test]
    fn test_stale_ticket_discarded() {
        let mut session = SearchSession::default();
        let first = session.begin_search();
        let second = session.begin_search();

        assert!(session.complete(second, Ok(result(3))));
        assert!(!session.complete(first, Ok(result(9))));
        assert_eq!(session.result().unwrap().movements.len(), 3);
    }

    #[test]
    fn test_error_clears_previous_result() {
        let mut session = SearchSession::default();
        let ticket = session.begin_search();
        session.complete(ticket, Ok(result(5)));

        let ticket = session.begin_search();
        session.complete(ticket, Err(CoreError::validation("La cuenta es requerida")));
        assert!(session.result().is_none());
        assert_eq!(session.last_error(), Some("La cuenta es requerida"));
        assert!(session.view().movements.is_empty());
    }

    #[test]
    fn test_filter_resets_page() {
        let mut session = SearchSession::new(10);
        let ticket = session.begin_search();
        session.complete(ticket, Ok(result(50)));
        session.set_page(4);
        assert_eq!(session.page(), 4);

        session.set_filter("transfer");
        assert_eq!(session.page(), 1);
        assert_eq!(session.total_pages(), 2);

        // same filter keeps the page
        session.set_page(2);
        session.set_filter("transfer");
        assert_eq!(session.page(), 2);
    }

    #[test]
    fn test_page_clamped() {
        let mut session = SearchSession::new(10);
        assert_eq!(session.set_page(5), 1);

        let ticket = session.begin_search();
        session.complete(ticket, Ok(result(25)));
        assert_eq!(session.set_page(0), 1);
        assert_eq!(session.set_page(99), 3);

        session.set_filter("nothing matches");
        assert_eq!(session.set_page(2), 1);
    }

    #[test]
    fn test_clear() {
        let mut session = SearchSession::default();
        let ticket = session.begin_search();
        session.complete(ticket, Ok(result(2)));
        session.set_filter("R1");
        session.clear();
        assert!(session.result().is_none());
        assert_eq!(session.filter(), "");
        assert_eq!(session.view().total_count, 0);
    }
}
