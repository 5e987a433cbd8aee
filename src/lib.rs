//! `mobile-seg` - hyperparameter loading for mobile segmentation training
//!
//! This library loads, validates and fans out the parameter sets that
//! drive a training run; the schema itself lives in `mobile-seg-core`.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
