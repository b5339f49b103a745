//! Serializable analysis session: one symbol table, one operation arena and
//! the method bodies a host wants analyzed.

use crate::operations::{NodeIndex, OperationArena, OperationKind};
use crate::symbols::SymbolTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A method body to analyze, by display name and root node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodEntry {
    pub name: String,
    pub body: NodeIndex,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub symbols: SymbolTable,
    pub operations: OperationArena,
    #[serde(default)]
    pub methods: Vec<MethodEntry>,
}

impl AnalysisSession {
    pub fn new(symbols: SymbolTable, operations: OperationArena) -> Self {
        Self {
            symbols,
            operations,
            methods: Vec::new(),
        }
    }

    pub fn add_method(&mut self, name: impl Into<String>, body: NodeIndex) {
        self.methods.push(MethodEntry {
            name: name.into(),
            body,
        });
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let session: AnalysisSession = serde_json::from_str(text)?;
        debug!(
            nodes = session.operations.len(),
            methods = session.methods.len(),
            "loaded analysis session"
        );
        Ok(session)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[inline]
    pub fn is_method_body(&self, node: NodeIndex) -> bool {
        matches!(
            self.operations.kind(node),
            Some(OperationKind::MethodBody { .. })
        )
    }

    /// Method entries whose body is not a `MethodBody` node of the arena.
    pub fn invalid_methods(&self) -> impl Iterator<Item = &MethodEntry> {
        self.methods
            .iter()
            .filter(|entry| !self.is_method_body(entry.body))
    }
}
