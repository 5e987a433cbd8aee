//! `mobile-seg` Core — hyperparameter schema and error types
//!
//! This crate provides the immutable parameter records consumed by the
//! training pipeline and the error types shared with the `mobile-seg`
//! loader and CLI.

pub mod config;
pub mod error;
