//! Parameter loading and validation
//!
//! Reads hyperparameter files into the schema types of `mobile-seg-core`,
//! rejecting unknown keys and mistyped values, then validates the result.

pub mod loader;
pub mod validation;

pub use loader::{
    ConfigLoader, LoadResult, LoadWarning, LoaderOptions, from_dict, load, suggest,
};
pub use mobile_seg_core::config::schema::*;
pub use validation::{ValidationResult, Validator};
