//! Search routes

pub mod api;

pub use api::{api_search, AccountSummary, SearchResponse};
