//! Result paging and filtering routes

pub mod api;

pub use api::{api_movements, MovementsQuery};
