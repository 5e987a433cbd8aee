//! Parameter schema for a single training run.

pub mod schema;

pub use schema::*;
