//! Identity and logout routes

pub mod api;

pub use api::{api_logout, api_me};
