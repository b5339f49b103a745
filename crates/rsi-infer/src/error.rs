use thiserror::Error;

/// Errors surfaced by method-level inference.
///
/// Unresolvable returns are not errors: they are omitted from the result and
/// flip `InferenceResult::all_returns_resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("response inference was cancelled")]
    Cancelled,
}
