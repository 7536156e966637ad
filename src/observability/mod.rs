//! # Observability
//!
//! Structured logging through the `tracing` ecosystem. Passwords and session
//! identifiers are never recorded.

pub mod logging;

pub use logging::init_logging;
