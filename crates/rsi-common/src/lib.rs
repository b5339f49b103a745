//! Common types and utilities for the rsi response-inference engine.
//!
//! This crate provides foundational types used across all rsi crates:
//! - String interning (`Atom`, `Interner`)
//! - Inference limits and thresholds
//! - Inference options naming the well-known framework symbols
//! - Tracing subscriber setup

// String interning for symbol and attribute names
pub mod interner;
pub use interner::{Atom, Interner};

// Centralized limits and thresholds
pub mod limits;

// Well-known symbol names, loadable from JSON
pub mod options;
pub use options::InferenceOptions;

// Opt-in tracing subscriber (RSI_LOG / RSI_LOG_FORMAT)
pub mod tracing_config;

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;
