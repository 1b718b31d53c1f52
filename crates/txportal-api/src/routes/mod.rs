//! Route modules for the API server
//!
//! - providers: provider list with account catalogs (public)
//! - search: run a provider search for the caller
//! - movements: filter and page the caller's current results
//! - session: caller identity and logout

pub mod movements;
pub mod providers;
pub mod search;
pub mod session;
