//! Provider catalog routes

pub mod api;

pub use api::{api_providers, masked_label, AccountOption, ProviderInfo};
