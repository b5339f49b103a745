//! Operation tree: a typed, already-resolved view of a method body.
//!
//! Nodes live in an `OperationArena` and refer to each other through
//! `NodeIndex` handles. Every node records its parent, its static type and
//! (when the collaborator folded one) its constant value. The arena is built
//! bottom-up: children are added first, and adding a parent links each child
//! back to it.

use crate::symbols::{LocalId, MemberSymbol, MethodId, ParameterId, PropertyId, TypeId};
use rsi_common::limits::RETURN_WALK_STACK_CAPACITY;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// =============================================================================
// NodeIndex
// =============================================================================

/// Handle of a node in an `OperationArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for an absent child (e.g. `return;` has no value).
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

impl Default for NodeIndex {
    fn default() -> Self {
        Self::NONE
    }
}

// =============================================================================
// Constant Values
// =============================================================================

/// A compile-time constant folded by the collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ConstantValue {
    Int(i64),
    Bool(bool),
    Str(String),
    Null,
}

impl ConstantValue {
    /// The integer payload, if this is an integer constant.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

// =============================================================================
// Operation Kinds
// =============================================================================

/// The closed set of operation kinds.
///
/// The kinds inspected by response inference carry the data inference needs.
/// `Other` stands for any expression or statement without its own variant
/// (binary operators, conditionals, loops, ...); it keeps its children so
/// traversal still reaches nested returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OperationKind {
    /// Root of an analyzed method.
    MethodBody { statements: Vec<NodeIndex> },
    Block {
        statements: Vec<NodeIndex>,
    },
    /// `return value;` (`value` is `NONE` for a bare `return;`).
    Return {
        value: NodeIndex,
    },
    Conversion {
        operand: NodeIndex,
        is_implicit: bool,
    },
    /// A method call. `target` is `None` when overload resolution failed; the
    /// collaborator then lists the overloads it considered in `candidates`.
    Invocation {
        target: Option<MethodId>,
        candidates: Vec<MethodId>,
        instance: NodeIndex,
        arguments: Vec<NodeIndex>,
    },
    /// `new T(args) { initializer }`.
    Construction {
        constructor: Option<MethodId>,
        arguments: Vec<NodeIndex>,
        initializer: NodeIndex,
    },
    ObjectInitializer {
        initializers: Vec<NodeIndex>,
    },
    Argument {
        parameter: Option<ParameterId>,
        value: NodeIndex,
    },
    Assignment {
        target: NodeIndex,
        value: NodeIndex,
    },
    PropertyReference {
        property: PropertyId,
        instance: NodeIndex,
    },
    /// Reference to a non-property member (field, method group).
    MemberReference {
        member: MemberSymbol,
        instance: NodeIndex,
    },
    LocalReference {
        local: LocalId,
    },
    /// Declaration of a local, with its initializer when present.
    VariableDeclarator {
        local: LocalId,
        initializer: NodeIndex,
    },
    Literal,
    LocalFunction {
        symbol: Option<MethodId>,
        body: NodeIndex,
    },
    AnonymousFunction {
        body: NodeIndex,
    },
    /// A node the collaborator could not bind.
    Invalid {
        children: Vec<NodeIndex>,
    },
    Other {
        children: Vec<NodeIndex>,
    },
}

impl OperationKind {
    /// Child nodes in source order, skipping absent ones.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out: SmallVec<[NodeIndex; 4]> = SmallVec::new();
        let mut push = |idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        match self {
            OperationKind::MethodBody { statements } | OperationKind::Block { statements } => {
                statements.iter().copied().for_each(&mut push);
            }
            OperationKind::Return { value } => push(*value),
            OperationKind::Conversion { operand, .. } => push(*operand),
            OperationKind::Invocation {
                instance,
                arguments,
                ..
            } => {
                push(*instance);
                arguments.iter().copied().for_each(&mut push);
            }
            OperationKind::Construction {
                arguments,
                initializer,
                ..
            } => {
                arguments.iter().copied().for_each(&mut push);
                push(*initializer);
            }
            OperationKind::ObjectInitializer { initializers } => {
                initializers.iter().copied().for_each(&mut push);
            }
            OperationKind::Argument { value, .. } => push(*value),
            OperationKind::Assignment { target, value } => {
                push(*target);
                push(*value);
            }
            OperationKind::PropertyReference { instance, .. }
            | OperationKind::MemberReference { instance, .. } => push(*instance),
            OperationKind::VariableDeclarator { initializer, .. } => push(*initializer),
            OperationKind::LocalFunction { body, .. } | OperationKind::AnonymousFunction { body } => {
                push(*body)
            }
            OperationKind::Invalid { children } | OperationKind::Other { children } => {
                children.iter().copied().for_each(&mut push);
            }
            OperationKind::LocalReference { .. } | OperationKind::Literal => {}
        }
        out
    }

    /// Local functions and lambdas: their returns belong to another callable.
    #[inline]
    pub fn is_function_like(&self) -> bool {
        matches!(
            self,
            OperationKind::LocalFunction { .. } | OperationKind::AnonymousFunction { .. }
        )
    }

    /// Short label used in trace output.
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::MethodBody { .. } => "MethodBody",
            OperationKind::Block { .. } => "Block",
            OperationKind::Return { .. } => "Return",
            OperationKind::Conversion { .. } => "Conversion",
            OperationKind::Invocation { .. } => "Invocation",
            OperationKind::Construction { .. } => "Construction",
            OperationKind::ObjectInitializer { .. } => "ObjectInitializer",
            OperationKind::Argument { .. } => "Argument",
            OperationKind::Assignment { .. } => "Assignment",
            OperationKind::PropertyReference { .. } => "PropertyReference",
            OperationKind::MemberReference { .. } => "MemberReference",
            OperationKind::LocalReference { .. } => "LocalReference",
            OperationKind::VariableDeclarator { .. } => "VariableDeclarator",
            OperationKind::Literal => "Literal",
            OperationKind::LocalFunction { .. } => "LocalFunction",
            OperationKind::AnonymousFunction { .. } => "AnonymousFunction",
            OperationKind::Invalid { .. } => "Invalid",
            OperationKind::Other { .. } => "Other",
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// One node of the operation tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// Static type, when the node produces a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeId>,
    /// Constant value folded by the collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<ConstantValue>,
    /// Parent node (`NONE` for roots and for nodes not yet attached).
    #[serde(default)]
    pub parent: NodeIndex,
}

// =============================================================================
// OperationArena
// =============================================================================

/// Storage for operation trees. One arena may hold many method bodies.
///
/// Deserialization rebuilds every parent link from the child lists, so a
/// serialized arena may omit or misstate `parent`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SerializedArena")]
pub struct OperationArena {
    nodes: Vec<Operation>,
}

#[derive(Deserialize)]
struct SerializedArena {
    #[serde(default)]
    nodes: Vec<Operation>,
}

impl From<SerializedArena> for OperationArena {
    fn from(serialized: SerializedArena) -> Self {
        let mut arena = OperationArena {
            nodes: serialized.nodes,
        };
        arena.relink_parents();
        arena
    }
}

impl OperationArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Operation> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn kind(&self, idx: NodeIndex) -> Option<&OperationKind> {
        self.get(idx).map(|node| &node.kind)
    }

    /// Parent of `idx`, or None at a root.
    #[inline]
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.get(idx)
            .map(|node| node.parent)
            .filter(|parent| parent.is_some())
    }

    #[inline]
    pub fn type_of(&self, idx: NodeIndex) -> Option<TypeId> {
        self.get(idx).and_then(|node| node.ty)
    }

    #[inline]
    pub fn constant_of(&self, idx: NodeIndex) -> Option<&ConstantValue> {
        self.get(idx).and_then(|node| node.constant.as_ref())
    }

    /// Pre-order, source-order traversal of `root` and everything below it.
    ///
    /// Each call starts a fresh traversal.
    pub fn descendants(&self, root: NodeIndex) -> Descendants<'_> {
        let mut stack = Vec::with_capacity(RETURN_WALK_STACK_CAPACITY);
        if self.get(root).is_some() {
            stack.push(root);
        }
        Descendants {
            arena: self,
            stack,
            remaining: self.nodes.len(),
        }
    }

    /// Recompute every node's parent from the child lists.
    pub fn relink_parents(&mut self) {
        for node in &mut self.nodes {
            node.parent = NodeIndex::NONE;
        }
        for index in 0..self.nodes.len() {
            let parent = NodeIndex(index as u32);
            for child in self.nodes[index].kind.children() {
                if child == parent {
                    continue;
                }
                if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                    node.parent = parent;
                }
            }
        }
    }

    /// Add a node and link its children to it.
    pub fn push(
        &mut self,
        kind: OperationKind,
        ty: Option<TypeId>,
        constant: Option<ConstantValue>,
    ) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                node.parent = idx;
            }
        }
        self.nodes.push(Operation {
            kind,
            ty,
            constant,
            parent: NodeIndex::NONE,
        });
        idx
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn add_method_body(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.push(OperationKind::MethodBody { statements }, None, None)
    }

    pub fn add_block(&mut self, statements: Vec<NodeIndex>) -> NodeIndex {
        self.push(OperationKind::Block { statements }, None, None)
    }

    pub fn add_return(&mut self, value: NodeIndex) -> NodeIndex {
        self.push(OperationKind::Return { value }, None, None)
    }

    /// An implicit conversion of `operand` to `ty`.
    pub fn add_conversion(&mut self, operand: NodeIndex, ty: TypeId) -> NodeIndex {
        self.push(
            OperationKind::Conversion {
                operand,
                is_implicit: true,
            },
            Some(ty),
            None,
        )
    }

    /// An explicit cast of `operand` to `ty`.
    pub fn add_cast(&mut self, operand: NodeIndex, ty: TypeId) -> NodeIndex {
        self.push(
            OperationKind::Conversion {
                operand,
                is_implicit: false,
            },
            Some(ty),
            None,
        )
    }

    /// A call resolved to `target`, returning `ty`.
    pub fn add_invocation(
        &mut self,
        target: MethodId,
        arguments: Vec<NodeIndex>,
        ty: Option<TypeId>,
    ) -> NodeIndex {
        self.push(
            OperationKind::Invocation {
                target: Some(target),
                candidates: Vec::new(),
                instance: NodeIndex::NONE,
                arguments,
            },
            ty,
            None,
        )
    }

    /// A call the collaborator could only narrow down to `candidates`.
    pub fn add_ambiguous_invocation(
        &mut self,
        candidates: Vec<MethodId>,
        arguments: Vec<NodeIndex>,
        ty: Option<TypeId>,
    ) -> NodeIndex {
        self.push(
            OperationKind::Invocation {
                target: None,
                candidates,
                instance: NodeIndex::NONE,
                arguments,
            },
            ty,
            None,
        )
    }

    pub fn add_construction(
        &mut self,
        constructor: Option<MethodId>,
        arguments: Vec<NodeIndex>,
        initializer: NodeIndex,
        ty: TypeId,
    ) -> NodeIndex {
        self.push(
            OperationKind::Construction {
                constructor,
                arguments,
                initializer,
            },
            Some(ty),
            None,
        )
    }

    pub fn add_object_initializer(&mut self, initializers: Vec<NodeIndex>) -> NodeIndex {
        self.push(OperationKind::ObjectInitializer { initializers }, None, None)
    }

    /// An argument bound to `parameter`; takes the type of its value.
    pub fn add_argument(&mut self, parameter: Option<ParameterId>, value: NodeIndex) -> NodeIndex {
        let ty = self.type_of(value);
        self.push(OperationKind::Argument { parameter, value }, ty, None)
    }

    /// `target = value`; takes the type of its target.
    pub fn add_assignment(&mut self, target: NodeIndex, value: NodeIndex) -> NodeIndex {
        let ty = self.type_of(target);
        self.push(OperationKind::Assignment { target, value }, ty, None)
    }

    pub fn add_property_reference(
        &mut self,
        property: PropertyId,
        instance: NodeIndex,
        ty: TypeId,
    ) -> NodeIndex {
        self.push(
            OperationKind::PropertyReference { property, instance },
            Some(ty),
            None,
        )
    }

    pub fn add_member_reference(
        &mut self,
        member: MemberSymbol,
        instance: NodeIndex,
        ty: Option<TypeId>,
    ) -> NodeIndex {
        self.push(OperationKind::MemberReference { member, instance }, ty, None)
    }

    pub fn add_local_reference(&mut self, local: LocalId, ty: TypeId) -> NodeIndex {
        self.push(OperationKind::LocalReference { local }, Some(ty), None)
    }

    pub fn add_variable_declarator(&mut self, local: LocalId, initializer: NodeIndex) -> NodeIndex {
        self.push(
            OperationKind::VariableDeclarator { local, initializer },
            None,
            None,
        )
    }

    pub fn add_literal(&mut self, value: ConstantValue, ty: TypeId) -> NodeIndex {
        self.push(OperationKind::Literal, Some(ty), Some(value))
    }

    pub fn add_local_function(&mut self, symbol: Option<MethodId>, body: NodeIndex) -> NodeIndex {
        self.push(OperationKind::LocalFunction { symbol, body }, None, None)
    }

    pub fn add_anonymous_function(&mut self, body: NodeIndex, ty: Option<TypeId>) -> NodeIndex {
        self.push(OperationKind::AnonymousFunction { body }, ty, None)
    }

    pub fn add_invalid(&mut self, children: Vec<NodeIndex>, ty: Option<TypeId>) -> NodeIndex {
        self.push(OperationKind::Invalid { children }, ty, None)
    }

    pub fn add_other(&mut self, children: Vec<NodeIndex>, ty: Option<TypeId>) -> NodeIndex {
        self.push(OperationKind::Other { children }, ty, None)
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Iterator returned by [`OperationArena::descendants`].
pub struct Descendants<'a> {
    arena: &'a OperationArena,
    stack: Vec<NodeIndex>,
    /// A tree visits each node at most once; a malformed (cyclic) input stops here.
    remaining: usize,
}

impl Iterator for Descendants<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let idx = self.stack.pop()?;
        if let Some(node) = self.arena.get(idx) {
            // Reversed so the leftmost child is visited first.
            for child in node.kind.children().into_iter().rev() {
                if self.arena.get(child).is_some() {
                    self.stack.push(child);
                }
            }
        }
        Some(idx)
    }
}
