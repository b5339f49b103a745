//! Response-contract inference.
//!
//! Given the operation tree of an action method, this crate determines for
//! each return path the status code and payload type the method produces,
//! without executing it.
//!
//! - `symbol_cache` - well-known framework symbols, resolved once per session
//! - `constant_eval` - compile-time integer constants (literals, const fields, single-binding locals)
//! - `return_walker` - return statements that belong to the method itself
//! - `inspector` - status code / payload resolution for one return
//! - `aggregator` - per-method driver with cooperative cancellation

pub mod aggregator;
pub mod cancellation;
pub mod constant_eval;
pub mod error;
pub mod inspector;
pub mod metadata;
pub mod return_walker;
pub mod symbol_cache;

pub use aggregator::MetadataAggregator;
pub use cancellation::{Cancellation, CancellationToken};
pub use constant_eval::{ConstantEvaluator, LocalBindings};
pub use error::InferenceError;
pub use inspector::ReturnInspector;
pub use metadata::{ActualResponseMetadata, InferenceResult};
pub use return_walker::ReturnWalker;
pub use symbol_cache::SymbolCache;

#[cfg(test)]
#[path = "../tests/symbol_cache_tests.rs"]
mod symbol_cache_tests;
