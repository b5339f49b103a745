//! Well-known framework symbols, resolved once per analysis session.
//!
//! A symbol that the session's type system does not contain stays `None`;
//! every rule that depends on it then simply finds no match.

use rsi_common::{Atom, InferenceOptions};
use rsi_ops::{PropertyId, SymbolTable, TypeId};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolCache {
    wrapper_type: Option<TypeId>,
    default_status_attribute: Option<TypeId>,
    status_code_wrapper_type: Option<TypeId>,
    status_property: Option<PropertyId>,
    status_code_role_attribute: Option<Atom>,
    object_value_role_attribute: Option<Atom>,
}

impl SymbolCache {
    pub fn new(symbols: &SymbolTable, options: &InferenceOptions) -> Self {
        let wrapper_type = resolve_type(symbols, &options.wrapper_type);
        let default_status_attribute = resolve_type(symbols, &options.default_status_attribute);
        let status_code_wrapper_type = resolve_type(symbols, &options.status_code_wrapper_type);

        let status_property = status_code_wrapper_type
            .and_then(|ty| symbols.property_by_name(ty, &options.status_property));
        if status_property.is_none() {
            debug!(
                property = %options.status_property,
                owner = %options.status_code_wrapper_type,
                "well-known status property not found"
            );
        }

        Self {
            wrapper_type,
            default_status_attribute,
            status_code_wrapper_type,
            status_property,
            status_code_role_attribute: resolve_name(symbols, &options.status_code_role_attribute),
            object_value_role_attribute: resolve_name(
                symbols,
                &options.object_value_role_attribute,
            ),
        }
    }

    /// The response-wrapper capability (`IActionResult`).
    #[inline]
    pub fn wrapper_type(&self) -> Option<TypeId> {
        self.wrapper_type
    }

    /// The default-status annotation (`DefaultStatusCodeAttribute`).
    #[inline]
    pub fn default_status_attribute(&self) -> Option<TypeId> {
        self.default_status_attribute
    }

    /// The capability that owns the status property (`IStatusCodeActionResult`).
    #[inline]
    pub fn status_code_wrapper_type(&self) -> Option<TypeId> {
        self.status_code_wrapper_type
    }

    /// `IStatusCodeActionResult.StatusCode`.
    #[inline]
    pub fn status_property(&self) -> Option<PropertyId> {
        self.status_property
    }

    #[inline]
    pub fn status_code_role_attribute(&self) -> Option<Atom> {
        self.status_code_role_attribute
    }

    #[inline]
    pub fn object_value_role_attribute(&self) -> Option<Atom> {
        self.object_value_role_attribute
    }
}

fn resolve_type(symbols: &SymbolTable, metadata_name: &str) -> Option<TypeId> {
    let resolved = symbols.type_by_metadata_name(metadata_name);
    if resolved.is_none() {
        debug!(name = %metadata_name, "well-known type not found");
    }
    resolved
}

/// Attribute names are matched by atom; a name never interned cannot match.
fn resolve_name(symbols: &SymbolTable, name: &str) -> Option<Atom> {
    let resolved = symbols.interner().lookup(name);
    if resolved.is_none() {
        debug!(name = %name, "well-known attribute name not interned");
    }
    resolved
}
