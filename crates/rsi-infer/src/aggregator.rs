//! Per-method driver.
//!
//! Walks the returns of a method body, resolves each one and collects the
//! entries. Cancellation is polled on entry and before every return; a cancelled method
//! yields no partial result.

use crate::cancellation::Cancellation;
use crate::constant_eval::LocalBindings;
use crate::error::InferenceError;
use crate::inspector::ReturnInspector;
use crate::metadata::InferenceResult;
use crate::return_walker::ReturnWalker;
use crate::symbol_cache::SymbolCache;
use rsi_ops::{NodeIndex, OperationArena, SymbolTable};
use tracing::{debug, debug_span, trace};

pub struct MetadataAggregator<'a> {
    arena: &'a OperationArena,
    symbols: &'a SymbolTable,
    cache: &'a SymbolCache,
}

impl<'a> MetadataAggregator<'a> {
    pub fn new(arena: &'a OperationArena, symbols: &'a SymbolTable, cache: &'a SymbolCache) -> Self {
        Self {
            arena,
            symbols,
            cache,
        }
    }

    /// Infer the response of every return path of `method_body`.
    pub fn infer(
        &self,
        method_body: NodeIndex,
        cancellation: &dyn Cancellation,
    ) -> Result<InferenceResult, InferenceError> {
        let _span = debug_span!("infer_method", method_body = method_body.0).entered();
        if cancellation.is_cancelled() {
            return Err(InferenceError::Cancelled);
        }

        let bindings = LocalBindings::collect(self.arena, self.symbols, method_body);
        let inspector = ReturnInspector::new(self.arena, self.symbols, self.cache, &bindings);
        let walker = ReturnWalker::new(self.arena, method_body);

        let mut result = InferenceResult {
            entries: Vec::new(),
            all_returns_resolved: true,
        };
        for return_node in walker.returns() {
            if cancellation.is_cancelled() {
                debug!(return_node = return_node.0, "inference cancelled");
                return Err(InferenceError::Cancelled);
            }
            match inspector.inspect(return_node) {
                Some(entry) => result.entries.push(entry),
                None => {
                    trace!(return_node = return_node.0, "unresolvable return");
                    result.all_returns_resolved = false;
                }
            }
        }

        debug!(
            entries = result.entries.len(),
            all_returns_resolved = result.all_returns_resolved,
            "inferred method responses"
        );
        Ok(result)
    }

    /// Infer several method bodies of the same session. Each method is
    /// cancelled independently: once the signal is raised, the remaining
    /// methods report `Cancelled`.
    pub fn infer_many(
        &self,
        method_bodies: &[NodeIndex],
        cancellation: &dyn Cancellation,
    ) -> Vec<Result<InferenceResult, InferenceError>> {
        method_bodies
            .iter()
            .map(|&body| self.infer(body, cancellation))
            .collect()
    }
}
