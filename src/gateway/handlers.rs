//! HTTP handlers
//!
//! - [`countries`] - refresh, list, lookup, delete and summary image
//! - [`status`] - country total and last refresh time
//! - [`health`] - store liveness probe

pub mod countries;
pub mod health;
pub mod status;

pub use countries::*;
pub use health::*;
pub use status::*;
