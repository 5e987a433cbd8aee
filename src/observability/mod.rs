//! Observability module
//!
//! Structured logging for the `mobile-seg` CLI.

pub mod logging;

pub use logging::{LogFormat, init_logging, run_span};
