//! Inference results.

use rsi_ops::{NodeIndex, TypeId};
use serde::{Deserialize, Serialize};

/// What one return statement actually produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualResponseMetadata {
    /// The `Return` node this entry was read from.
    pub return_node: NodeIndex,
    /// `None` for a raw model (a value that is not a response wrapper).
    pub status_code: Option<i32>,
    pub payload_type: Option<TypeId>,
}

impl ActualResponseMetadata {
    /// A returned model object, sent with the framework's default status.
    pub fn raw_model(return_node: NodeIndex, payload_type: Option<TypeId>) -> Self {
        Self {
            return_node,
            status_code: None,
            payload_type,
        }
    }

    pub fn with_status(return_node: NodeIndex, status_code: i32, payload_type: Option<TypeId>) -> Self {
        Self {
            return_node,
            status_code: Some(status_code),
            payload_type,
        }
    }

    #[inline]
    pub fn is_default_response(&self) -> bool {
        self.status_code.is_none()
    }
}

/// Result of analyzing one method body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
    /// One entry per resolved return, in source order.
    pub entries: Vec<ActualResponseMetadata>,
    /// False when at least one return could not be resolved.
    pub all_returns_resolved: bool,
}
