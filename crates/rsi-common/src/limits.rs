//! Centralized limits and thresholds for response inference.
//!
//! The operation tree and symbol table come from an upstream collaborator and
//! are assumed well-formed, but every walk that follows links (parents,
//! conversions, base types) is still bounded so a malformed input degrades to
//! "unresolved" instead of looping.

// =============================================================================
// Tree Walk Limits
// =============================================================================

/// Maximum number of parent links followed when deciding whether a return
/// node belongs to the analyzed method.
///
/// A chain longer than this is treated as "does not reach the method root",
/// so the return is excluded from the method's response paths.
pub const MAX_TREE_WALK_ITERATIONS: usize = 10_000;

/// Maximum number of chained conversions unwound before a returned value is
/// classified.
///
/// # C# example
///
/// ```csharp
/// // ActionResult<T> adds an implicit conversion on top of the
/// // IActionResult conversion, so two layers are common:
/// public ActionResult<Person> Get() => NotFound();
/// ```
///
/// Real trees rarely exceed three layers. A return whose value is still a
/// conversion after this many layers are unwound is treated as unresolvable.
pub const MAX_CONVERSION_UNWIND_DEPTH: u32 = 64;

// =============================================================================
// Symbol Table Limits
// =============================================================================

/// Maximum depth when walking base-type chains and interface hierarchies
/// (assignability, inherited attributes, interface member implementation).
///
/// Guards against cyclic inheritance in a malformed symbol table.
pub const MAX_BASE_TYPE_DEPTH: u32 = 64;

// =============================================================================
// Capacity Hints
// =============================================================================

/// Initial capacity of the traversal stack used to enumerate return nodes.
pub const RETURN_WALK_STACK_CAPACITY: usize = 64;
