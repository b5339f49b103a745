//! Return statements that belong to a method body.
//!
//! A `return` nested inside a local function or lambda returns from that
//! callable, not from the action, so it is skipped.

use rsi_common::limits::MAX_TREE_WALK_ITERATIONS;
use rsi_ops::{NodeIndex, OperationArena, OperationKind};
use tracing::trace;

pub struct ReturnWalker<'a> {
    arena: &'a OperationArena,
    method_body: NodeIndex,
}

impl<'a> ReturnWalker<'a> {
    pub fn new(arena: &'a OperationArena, method_body: NodeIndex) -> Self {
        Self { arena, method_body }
    }

    /// Returns of the method in source order. Each call walks the tree anew.
    pub fn returns(&self) -> impl Iterator<Item = NodeIndex> + 'a {
        let arena = self.arena;
        let method_body = self.method_body;
        arena
            .descendants(method_body)
            .filter(move |&idx| matches!(arena.kind(idx), Some(OperationKind::Return { .. })))
            .filter(move |&idx| belongs_to(arena, method_body, idx))
    }

    /// Whether `node` is reached from the method root without crossing a
    /// local function or lambda.
    pub fn belongs_to_method(&self, node: NodeIndex) -> bool {
        belongs_to(self.arena, self.method_body, node)
    }
}

fn belongs_to(arena: &OperationArena, method_body: NodeIndex, node: NodeIndex) -> bool {
    let mut current = node;
    let mut iterations = 0;
    while let Some(parent) = arena.parent(current) {
        iterations += 1;
        if iterations > MAX_TREE_WALK_ITERATIONS {
            trace!(node = node.0, "ancestor walk hit iteration limit");
            return false;
        }
        if parent == method_body {
            return true;
        }
        let Some(kind) = arena.kind(parent) else {
            return false;
        };
        if kind.is_function_like() {
            trace!(
                node = node.0,
                closure = parent.0,
                kind = kind.name(),
                "return belongs to nested callable"
            );
            return false;
        }
        current = parent;
    }
    false
}
