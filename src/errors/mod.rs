//! # Error Handling
//!
//! Error types for the reconciliation core, built on `thiserror`.
//!
//! The three outcomes callers care about are kept distinct:
//! configuration errors are raised before any network call, transport
//! failures come from the HTTP layer, and remote rejections carry the
//! server's response body verbatim.

pub mod types;

pub use types::{Error, Result};
