//! Symbol table: types, members, locals and their attributes.
//!
//! The collaborator registers every symbol an operation tree refers to, and
//! answers the type-system questions inference asks:
//!
//! | Query | Used for |
//! |-------|----------|
//! | `type_by_metadata_name` | resolving well-known framework types once per session |
//! | `is_assignable_to` | the response-wrapper capability check |
//! | `type_attributes(.., inherit)` | default-status annotations on result types |
//! | `find_implementation_for_interface_member` | recognizing the status property |
//!
//! All ids are plain indices; a dangling id resolves to `None`.

use crate::operations::ConstantValue;
use rsi_common::interner::{Atom, Interner};
use rsi_common::limits::MAX_BASE_TYPE_DEPTH;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

macro_rules! define_symbol_ids {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            pub struct $name(pub u32);
        )+
    };
}

define_symbol_ids!(
    /// Handle of a `TypeInfo`.
    TypeId,
    /// Handle of a `MethodInfo` (methods, constructors, local functions).
    MethodId,
    /// Handle of a `ParameterInfo`.
    ParameterId,
    /// Handle of a `PropertyInfo`.
    PropertyId,
    /// Handle of a `FieldInfo`.
    FieldId,
    /// Handle of a `LocalInfo`.
    LocalId,
);

/// Target of a `MemberReference` operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum MemberSymbol {
    Field(FieldId),
    Method(MethodId),
}

// =============================================================================
// Attributes
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypedConstantKind {
    Primitive,
    Enum,
    Type,
    Array,
    Error,
}

/// A constant attribute argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedConstant {
    pub kind: TypedConstantKind,
    pub value: ConstantValue,
}

impl TypedConstant {
    pub fn int(value: i64) -> Self {
        Self {
            kind: TypedConstantKind::Primitive,
            value: ConstantValue::Int(value),
        }
    }
}

/// An applied attribute (annotation).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeData {
    /// The attribute's class.
    pub class: TypeId,
    #[serde(default)]
    pub constructor_arguments: Vec<TypedConstant>,
}

impl AttributeData {
    /// An attribute applied without arguments.
    pub fn new(class: TypeId) -> Self {
        Self {
            class,
            constructor_arguments: Vec::new(),
        }
    }

    /// An attribute applied with a single integer argument, e.g. `[DefaultStatusCode(201)]`.
    pub fn with_int(class: TypeId, value: i64) -> Self {
        Self {
            class,
            constructor_arguments: vec![TypedConstant::int(value)],
        }
    }
}

// =============================================================================
// Symbol Infos
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
    Primitive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// Simple name (`ObjectResult`).
    pub name: Atom,
    /// Fully qualified name (`Microsoft.AspNetCore.Mvc.ObjectResult`).
    pub metadata_name: Atom,
    pub kind: TypeKind,
    #[serde(default)]
    pub base_type: Option<TypeId>,
    /// Directly implemented (or, for interfaces, extended) interfaces.
    #[serde(default)]
    pub interfaces: Vec<TypeId>,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    /// Properties declared on this type, in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: Atom,
    #[serde(default)]
    pub containing_type: Option<TypeId>,
    #[serde(default)]
    pub return_type: Option<TypeId>,
    #[serde(default)]
    pub parameters: Vec<ParameterId>,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: Atom,
    pub ty: TypeId,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    /// `ref`/`out` parameter: passing a local writes to it.
    #[serde(default)]
    pub by_ref: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: Atom,
    pub containing_type: TypeId,
    pub ty: TypeId,
    #[serde(default)]
    pub attributes: Vec<AttributeData>,
    /// Interface properties this property implements explicitly.
    #[serde(default)]
    pub explicit_implementations: Vec<PropertyId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: Atom,
    #[serde(default)]
    pub containing_type: Option<TypeId>,
    pub ty: TypeId,
    /// Set for `const` fields.
    #[serde(default)]
    pub constant_value: Option<ConstantValue>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalInfo {
    pub name: Atom,
    pub ty: TypeId,
    /// Declared `const`; `constant_value` then holds its value.
    #[serde(default)]
    pub is_const: bool,
    #[serde(default)]
    pub constant_value: Option<ConstantValue>,
}

// =============================================================================
// SymbolTable
// =============================================================================

/// All symbols of one analysis session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymbolTable {
    interner: Interner,
    #[serde(default)]
    types: Vec<TypeInfo>,
    #[serde(default)]
    methods: Vec<MethodInfo>,
    #[serde(default)]
    parameters: Vec<ParameterInfo>,
    #[serde(default)]
    properties: Vec<PropertyInfo>,
    #[serde(default)]
    fields: Vec<FieldInfo>,
    #[serde(default)]
    locals: Vec<LocalInfo>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        Self {
            interner,
            ..Self::default()
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    #[inline]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn intern(&mut self, name: &str) -> Atom {
        self.interner.intern(name)
    }

    #[inline]
    pub fn name(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[inline]
    pub fn get_type(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.0 as usize)
    }

    #[inline]
    pub fn get_method(&self, id: MethodId) -> Option<&MethodInfo> {
        self.methods.get(id.0 as usize)
    }

    #[inline]
    pub fn get_parameter(&self, id: ParameterId) -> Option<&ParameterInfo> {
        self.parameters.get(id.0 as usize)
    }

    #[inline]
    pub fn get_property(&self, id: PropertyId) -> Option<&PropertyInfo> {
        self.properties.get(id.0 as usize)
    }

    #[inline]
    pub fn get_field(&self, id: FieldId) -> Option<&FieldInfo> {
        self.fields.get(id.0 as usize)
    }

    #[inline]
    pub fn get_local(&self, id: LocalId) -> Option<&LocalInfo> {
        self.locals.get(id.0 as usize)
    }

    /// Find a type by its fully qualified name.
    ///
    /// Returns None when the name was never registered, without interning it.
    pub fn type_by_metadata_name(&self, metadata_name: &str) -> Option<TypeId> {
        let atom = self.interner.lookup(metadata_name)?;
        self.types
            .iter()
            .position(|info| info.metadata_name == atom)
            .map(|index| TypeId(index as u32))
    }

    /// Find a property declared directly on `ty` by name.
    pub fn property_by_name(&self, ty: TypeId, name: &str) -> Option<PropertyId> {
        let atom = self.interner.lookup(name)?;
        self.get_type(ty)?
            .properties
            .iter()
            .copied()
            .find(|&prop| self.get_property(prop).is_some_and(|info| info.name == atom))
    }

    /// Simple name of an attribute's class.
    #[inline]
    pub fn attribute_class_name(&self, attribute: &AttributeData) -> Option<Atom> {
        self.get_type(attribute.class).map(|info| info.name)
    }

    // =========================================================================
    // Type Relations
    // =========================================================================

    /// Base-type chain of `ty`, starting with `ty` itself.
    pub fn base_chain(&self, ty: TypeId) -> SmallVec<[TypeId; 4]> {
        let mut chain = SmallVec::new();
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(id) = current {
            if depth > MAX_BASE_TYPE_DEPTH || chain.contains(&id) {
                trace!(type_id = ty.0, "base_chain: cycle or depth limit");
                break;
            }
            let Some(info) = self.get_type(id) else {
                break;
            };
            chain.push(id);
            current = info.base_type;
            depth += 1;
        }
        chain
    }

    /// Every interface `ty` implements, directly, through a base type, or
    /// through interface inheritance.
    pub fn all_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        let mut pending: Vec<(TypeId, u32)> = self
            .base_chain(ty)
            .iter()
            .filter_map(|&id| self.get_type(id))
            .flat_map(|info| info.interfaces.iter().map(|&iface| (iface, 0)))
            .collect();
        pending.reverse();

        while let Some((iface, depth)) = pending.pop() {
            if depth > MAX_BASE_TYPE_DEPTH || !seen.insert(iface) {
                continue;
            }
            out.push(iface);
            if let Some(info) = self.get_type(iface) {
                for &parent in info.interfaces.iter().rev() {
                    pending.push((parent, depth + 1));
                }
            }
        }
        out
    }

    /// Whether a value of type `source` can be used where `target` is expected
    /// by identity, inheritance or interface implementation.
    pub fn is_assignable_to(&self, source: TypeId, target: TypeId) -> bool {
        if source == target {
            return true;
        }
        if self.base_chain(source).contains(&target) {
            return true;
        }
        self.all_interfaces(source).contains(&target)
    }

    /// Attributes applied to `ty`; with `inherit`, followed by those of its
    /// base types (most derived first).
    pub fn type_attributes(&self, ty: TypeId, inherit: bool) -> Vec<&AttributeData> {
        let chain = if inherit {
            self.base_chain(ty)
        } else {
            SmallVec::from_slice(&[ty])
        };
        chain
            .iter()
            .filter_map(|&id| self.get_type(id))
            .flat_map(|info| info.attributes.iter())
            .collect()
    }

    /// The property of `ty` (or a base type) that implements the interface
    /// property `interface_property`.
    ///
    /// At each level of the base chain an explicit implementation wins over a
    /// same-named public property.
    pub fn find_implementation_for_interface_member(
        &self,
        ty: TypeId,
        interface_property: PropertyId,
    ) -> Option<PropertyId> {
        let member = self.get_property(interface_property)?;
        if !self.is_assignable_to(ty, member.containing_type) {
            return None;
        }
        for level in self.base_chain(ty) {
            let Some(info) = self.get_type(level) else {
                continue;
            };
            let mut implicit = None;
            for &prop in &info.properties {
                let Some(candidate) = self.get_property(prop) else {
                    continue;
                };
                if candidate.explicit_implementations.contains(&interface_property) {
                    return Some(prop);
                }
                if implicit.is_none()
                    && candidate.name == member.name
                    && candidate.explicit_implementations.is_empty()
                {
                    implicit = Some(prop);
                }
            }
            if implicit.is_some() {
                return implicit;
            }
        }
        None
    }

    // =========================================================================
    // Registration
    // =========================================================================

    pub fn add_type(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(info);
        id
    }

    /// Register a type by fully qualified name; the simple name is the last
    /// dotted segment.
    pub fn declare_type(&mut self, metadata_name: &str, kind: TypeKind) -> TypeId {
        let simple = metadata_name.rsplit('.').next().unwrap_or(metadata_name);
        let name = self.intern(simple);
        let metadata_name = self.intern(metadata_name);
        self.add_type(TypeInfo {
            name,
            metadata_name,
            kind,
            base_type: None,
            interfaces: Vec::new(),
            attributes: Vec::new(),
            properties: Vec::new(),
        })
    }

    pub fn set_base_type(&mut self, ty: TypeId, base: TypeId) {
        if let Some(info) = self.types.get_mut(ty.0 as usize) {
            info.base_type = Some(base);
        }
    }

    pub fn add_interface(&mut self, ty: TypeId, interface: TypeId) {
        if let Some(info) = self.types.get_mut(ty.0 as usize) {
            info.interfaces.push(interface);
        }
    }

    pub fn add_type_attribute(&mut self, ty: TypeId, attribute: AttributeData) {
        if let Some(info) = self.types.get_mut(ty.0 as usize) {
            info.attributes.push(attribute);
        }
    }

    pub fn declare_method(
        &mut self,
        containing_type: Option<TypeId>,
        name: &str,
        return_type: Option<TypeId>,
    ) -> MethodId {
        let name = self.intern(name);
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(MethodInfo {
            name,
            containing_type,
            return_type,
            parameters: Vec::new(),
            attributes: Vec::new(),
        });
        id
    }

    pub fn add_method_attribute(&mut self, method: MethodId, attribute: AttributeData) {
        if let Some(info) = self.methods.get_mut(method.0 as usize) {
            info.attributes.push(attribute);
        }
    }

    /// Append a parameter to `method`'s signature.
    pub fn add_parameter(&mut self, method: MethodId, name: &str, ty: TypeId) -> ParameterId {
        let name = self.intern(name);
        let id = ParameterId(self.parameters.len() as u32);
        self.parameters.push(ParameterInfo {
            name,
            ty,
            attributes: Vec::new(),
            by_ref: false,
        });
        if let Some(info) = self.methods.get_mut(method.0 as usize) {
            info.parameters.push(id);
        }
        id
    }

    pub fn set_parameter_by_ref(&mut self, parameter: ParameterId) {
        if let Some(info) = self.parameters.get_mut(parameter.0 as usize) {
            info.by_ref = true;
        }
    }

    pub fn add_parameter_attribute(&mut self, parameter: ParameterId, attribute: AttributeData) {
        if let Some(info) = self.parameters.get_mut(parameter.0 as usize) {
            info.attributes.push(attribute);
        }
    }

    pub fn declare_property(&mut self, containing_type: TypeId, name: &str, ty: TypeId) -> PropertyId {
        let name = self.intern(name);
        let id = PropertyId(self.properties.len() as u32);
        self.properties.push(PropertyInfo {
            name,
            containing_type,
            ty,
            attributes: Vec::new(),
            explicit_implementations: Vec::new(),
        });
        if let Some(info) = self.types.get_mut(containing_type.0 as usize) {
            info.properties.push(id);
        }
        id
    }

    pub fn add_property_attribute(&mut self, property: PropertyId, attribute: AttributeData) {
        if let Some(info) = self.properties.get_mut(property.0 as usize) {
            info.attributes.push(attribute);
        }
    }

    /// Mark `property` as an explicit implementation of `interface_property`.
    pub fn add_explicit_implementation(&mut self, property: PropertyId, interface_property: PropertyId) {
        if let Some(info) = self.properties.get_mut(property.0 as usize) {
            info.explicit_implementations.push(interface_property);
        }
    }

    pub fn declare_field(
        &mut self,
        containing_type: Option<TypeId>,
        name: &str,
        ty: TypeId,
        constant_value: Option<ConstantValue>,
    ) -> FieldId {
        let name = self.intern(name);
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(FieldInfo {
            name,
            containing_type,
            ty,
            constant_value,
        });
        id
    }

    /// A mutable local.
    pub fn declare_local(&mut self, name: &str, ty: TypeId) -> LocalId {
        self.push_local(name, ty, false, None)
    }

    /// A `const` local with its value.
    pub fn declare_const_local(&mut self, name: &str, ty: TypeId, value: ConstantValue) -> LocalId {
        self.push_local(name, ty, true, Some(value))
    }

    fn push_local(
        &mut self,
        name: &str,
        ty: TypeId,
        is_const: bool,
        constant_value: Option<ConstantValue>,
    ) -> LocalId {
        let name = self.intern(name);
        let id = LocalId(self.locals.len() as u32);
        self.locals.push(LocalInfo {
            name,
            ty,
            is_const,
            constant_value,
        });
        id
    }
}
