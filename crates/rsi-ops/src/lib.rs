//! Typed operation tree and symbol model for response inference.
//!
//! This crate is the boundary with the semantic-analysis collaborator that
//! produces operation trees from source code. It provides:
//! - `operations` - `OperationArena`, `NodeIndex`, the closed `OperationKind` set
//! - `symbols` - `SymbolTable` with type, member and attribute queries
//! - `session` - a serializable bundle of both plus the method bodies to analyze
//!
//! Nothing in here performs inference; the arena and table are read-only
//! inputs to `rsi-infer`.

pub mod operations;
pub use operations::{ConstantValue, NodeIndex, Operation, OperationArena, OperationKind};

pub mod symbols;
pub use symbols::{
    AttributeData, FieldId, FieldInfo, LocalId, LocalInfo, MemberSymbol, MethodId, MethodInfo,
    ParameterId, ParameterInfo, PropertyId, PropertyInfo, SymbolTable, TypeId, TypeInfo,
    TypeKind, TypedConstant, TypedConstantKind,
};

pub mod session;
pub use session::{AnalysisSession, MethodEntry};

#[cfg(test)]
#[path = "../tests/operations_tests.rs"]
mod operations_tests;
