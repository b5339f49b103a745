//! Compile-time integer constants.
//!
//! A value counts as constant when, after unwrapping one conversion, it
//! carries a folded constant, references a `const` field, or references a
//! local that is provably bound to a single constant.

use rsi_ops::{
    ConstantValue, LocalId, MemberSymbol, NodeIndex, OperationArena, OperationKind, SymbolTable,
};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

// =============================================================================
// LocalBindings
// =============================================================================

/// Locals of one method body that are bound exactly once to a constant and
/// never written afterwards.
///
/// Writes are `Assignment`s targeting the local (compound assignments and
/// increments included) and passing the local to a `ref`/`out` parameter.
/// Closures count: a write inside a lambda still disqualifies the local.
#[derive(Clone, Debug, Default)]
pub struct LocalBindings {
    constants: FxHashMap<LocalId, i64>,
}

impl LocalBindings {
    /// A summary with no qualifying locals.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn collect(arena: &OperationArena, symbols: &SymbolTable, root: NodeIndex) -> Self {
        let mut binding_counts: FxHashMap<LocalId, u32> = FxHashMap::default();
        let mut initial_values: FxHashMap<LocalId, i64> = FxHashMap::default();
        let mut written: FxHashSet<LocalId> = FxHashSet::default();

        for idx in arena.descendants(root) {
            let Some(kind) = arena.kind(idx) else {
                continue;
            };
            match kind {
                OperationKind::VariableDeclarator { local, initializer } => {
                    *binding_counts.entry(*local).or_insert(0) += 1;
                    if let Some(value) = folded_int(arena, *initializer) {
                        initial_values.insert(*local, value);
                    }
                }
                OperationKind::Assignment { target, .. } => {
                    if let Some(OperationKind::LocalReference { local }) = arena.kind(*target) {
                        written.insert(*local);
                    }
                }
                OperationKind::Argument {
                    parameter: Some(parameter),
                    value,
                } => {
                    let by_ref = symbols
                        .get_parameter(*parameter)
                        .is_some_and(|info| info.by_ref);
                    if by_ref {
                        if let Some(OperationKind::LocalReference { local }) = arena.kind(*value) {
                            written.insert(*local);
                        }
                    }
                }
                _ => {}
            }
        }

        let constants = initial_values
            .into_iter()
            .filter(|(local, _)| {
                binding_counts.get(local) == Some(&1) && !written.contains(local)
            })
            .collect::<FxHashMap<_, _>>();
        trace!(
            root = root.0,
            qualifying = constants.len(),
            "collected single-binding constant locals"
        );
        Self { constants }
    }

    #[inline]
    pub fn single_constant(&self, local: LocalId) -> Option<i64> {
        self.constants.get(&local).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

/// Rules (a) and (b) only: unwrap one conversion, then the folded constant.
fn folded_int(arena: &OperationArena, idx: NodeIndex) -> Option<i64> {
    let idx = unwrap_one_conversion(arena, idx);
    arena.constant_of(idx).and_then(ConstantValue::as_int)
}

fn unwrap_one_conversion(arena: &OperationArena, idx: NodeIndex) -> NodeIndex {
    match arena.kind(idx) {
        Some(OperationKind::Conversion { operand, .. }) if operand.is_some() => *operand,
        _ => idx,
    }
}

// =============================================================================
// ConstantEvaluator
// =============================================================================

pub struct ConstantEvaluator<'a> {
    arena: &'a OperationArena,
    symbols: &'a SymbolTable,
    bindings: &'a LocalBindings,
}

impl<'a> ConstantEvaluator<'a> {
    pub fn new(
        arena: &'a OperationArena,
        symbols: &'a SymbolTable,
        bindings: &'a LocalBindings,
    ) -> Self {
        Self {
            arena,
            symbols,
            bindings,
        }
    }

    /// The integer constant `idx` denotes, if any.
    pub fn try_get_int(&self, idx: NodeIndex) -> Option<i64> {
        // Covers `int -> int?` style wrappers around the value.
        let idx = unwrap_one_conversion(self.arena, idx);

        if let Some(value) = self.arena.constant_of(idx).and_then(ConstantValue::as_int) {
            return Some(value);
        }

        match self.arena.kind(idx)? {
            OperationKind::MemberReference {
                member: MemberSymbol::Field(field),
                ..
            } => self
                .symbols
                .get_field(*field)?
                .constant_value
                .as_ref()
                .and_then(ConstantValue::as_int),
            OperationKind::LocalReference { local } => {
                let info = self.symbols.get_local(*local)?;
                if info.is_const {
                    if let Some(value) = info.constant_value.as_ref().and_then(ConstantValue::as_int)
                    {
                        return Some(value);
                    }
                }
                self.bindings.single_constant(*local)
            }
            _ => None,
        }
    }

    /// The constant as a status code; values outside `i32` are rejected.
    pub fn try_get_status_code(&self, idx: NodeIndex) -> Option<i32> {
        let value = self.try_get_int(idx)?;
        match i32::try_from(value) {
            Ok(code) => Some(code),
            Err(_) => {
                trace!(node = idx.0, value, "constant out of status-code range");
                None
            }
        }
    }
}
