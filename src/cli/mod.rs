//! Command-line interface
//!
//! Argument parsing and command handlers for the `mobile-seg` binary.

pub mod args;
pub mod commands;
