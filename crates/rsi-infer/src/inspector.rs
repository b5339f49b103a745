//! Resolution of a single return statement.
//!
//! The returned value is classified first: anything that is not a response
//! wrapper is a raw model. For wrappers the status code and payload type are
//! gathered from three sources, each overriding the previous one for the
//! fields it sets:
//!
//! 1. a default-status annotation on the wrapper type (inherited), or on the
//!    invoked helper method;
//! 2. call or constructor arguments bound to role-annotated parameters;
//! 3. object-initializer assignments (`new ObjectResult(x) { StatusCode = 500 }`).
//!
//! A return with no status code from any source is unresolvable.

use crate::constant_eval::{ConstantEvaluator, LocalBindings};
use crate::metadata::ActualResponseMetadata;
use crate::symbol_cache::SymbolCache;
use rsi_common::Atom;
use rsi_common::limits::MAX_CONVERSION_UNWIND_DEPTH;
use rsi_ops::{
    AttributeData, NodeIndex, OperationArena, OperationKind, PropertyId, SymbolTable, TypeId,
    TypedConstantKind,
};
use tracing::{Level, span, trace};

/// Status code and payload type gathered from one source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Contribution {
    status_code: Option<i32>,
    payload_type: Option<TypeId>,
}

impl Contribution {
    /// Layer `higher` on top of `self`; only the fields it set win.
    fn apply(&mut self, higher: Contribution) {
        if higher.status_code.is_some() {
            self.status_code = higher.status_code;
        }
        if higher.payload_type.is_some() {
            self.payload_type = higher.payload_type;
        }
    }
}

pub struct ReturnInspector<'a> {
    arena: &'a OperationArena,
    symbols: &'a SymbolTable,
    cache: &'a SymbolCache,
    constants: ConstantEvaluator<'a>,
}

impl<'a> ReturnInspector<'a> {
    pub fn new(
        arena: &'a OperationArena,
        symbols: &'a SymbolTable,
        cache: &'a SymbolCache,
        bindings: &'a LocalBindings,
    ) -> Self {
        Self {
            arena,
            symbols,
            cache,
            constants: ConstantEvaluator::new(arena, symbols, bindings),
        }
    }

    /// Resolve `return_node`, or None when the return is unresolvable.
    pub fn inspect(&self, return_node: NodeIndex) -> Option<ActualResponseMetadata> {
        let _span = span!(Level::TRACE, "inspect_return", return_node = return_node.0).entered();

        let Some(OperationKind::Return { value }) = self.arena.kind(return_node) else {
            trace!("not a return node");
            return None;
        };
        match self.arena.kind(*value) {
            None => {
                trace!("return without a value");
                return None;
            }
            Some(OperationKind::Invalid { .. }) => {
                trace!("returned value is invalid");
                return None;
            }
            Some(_) => {}
        }

        let Some(value) = self.unwrap_conversions(*value) else {
            trace!("conversion chain exceeds unwind limit");
            return None;
        };
        let value_type = self.arena.type_of(value);

        if !self.is_response_wrapper(value_type) {
            trace!(payload_type = ?value_type, "raw model");
            return Some(ActualResponseMetadata::raw_model(return_node, value_type));
        }

        let mut resolved = Contribution {
            status_code: self.default_status_code(value, value_type),
            payload_type: None,
        };

        match self.arena.kind(value) {
            Some(OperationKind::Invocation { arguments, .. }) => {
                resolved.apply(self.inspect_arguments(arguments));
            }
            Some(OperationKind::Construction {
                arguments,
                initializer,
                ..
            }) => {
                resolved.apply(self.inspect_arguments(arguments));
                if initializer.is_some() {
                    resolved.apply(self.inspect_initializer(*initializer));
                }
            }
            _ => {}
        }

        let Some(status_code) = resolved.status_code else {
            trace!("no status code from any source");
            return None;
        };
        trace!(status_code, payload_type = ?resolved.payload_type, "resolved return");
        Some(ActualResponseMetadata::with_status(
            return_node,
            status_code,
            resolved.payload_type,
        ))
    }

    // =========================================================================
    // Classification
    // =========================================================================

    /// Strip every conversion layer (`ActionResult<T>` may add two).
    ///
    /// None when more than `MAX_CONVERSION_UNWIND_DEPTH` layers remain.
    fn unwrap_conversions(&self, mut idx: NodeIndex) -> Option<NodeIndex> {
        let mut depth = 0;
        while let Some(OperationKind::Conversion { operand, .. }) = self.arena.kind(idx) {
            if operand.is_none() {
                break;
            }
            if depth >= MAX_CONVERSION_UNWIND_DEPTH {
                return None;
            }
            idx = *operand;
            depth += 1;
        }
        Some(idx)
    }

    fn is_response_wrapper(&self, ty: Option<TypeId>) -> bool {
        match (ty, self.cache.wrapper_type()) {
            (Some(ty), Some(wrapper)) => self.symbols.is_assignable_to(ty, wrapper),
            _ => false,
        }
    }

    // =========================================================================
    // Default Status
    // =========================================================================

    /// The default status from the wrapper type, falling back to the invoked
    /// method when the type carries no annotation.
    fn default_status_code(&self, value: NodeIndex, value_type: Option<TypeId>) -> Option<i32> {
        let attribute_class = self.cache.default_status_attribute()?;

        let mut attribute = value_type.and_then(|ty| {
            self.symbols
                .type_attributes(ty, true)
                .into_iter()
                .find(|attr| self.is_default_status_class(attr, attribute_class))
        });

        if attribute.is_none() {
            if let Some(OperationKind::Invocation {
                target, candidates, ..
            }) = self.arena.kind(value)
            {
                attribute = target
                    .or_else(|| candidates.first().copied())
                    .and_then(|method| self.symbols.get_method(method))
                    .and_then(|info| {
                        info.attributes
                            .iter()
                            .find(|attr| self.is_default_status_class(attr, attribute_class))
                    });
            }
        }

        let code = attribute.and_then(default_status_from_attribute);
        trace!(default_status = ?code, "default status annotation");
        code
    }

    // =========================================================================
    // Arguments and Initializers
    // =========================================================================

    fn inspect_arguments(&self, arguments: &[NodeIndex]) -> Contribution {
        let mut contribution = Contribution::default();
        for &argument in arguments {
            let Some(OperationKind::Argument {
                parameter: Some(parameter),
                value,
            }) = self.arena.kind(argument)
            else {
                continue;
            };
            let Some(info) = self.symbols.get_parameter(*parameter) else {
                continue;
            };

            if self.has_attribute_named(&info.attributes, self.cache.status_code_role_attribute()) {
                if let Some(code) = self.constants.try_get_status_code(*value) {
                    trace!(argument = argument.0, status_code = code, "status code argument");
                    contribution.status_code = Some(code);
                }
            }

            if self.has_attribute_named(&info.attributes, self.cache.object_value_role_attribute()) {
                // `new BadRequestObjectResult((object)model)`
                let operand = match self.arena.kind(*value) {
                    Some(OperationKind::Conversion { operand, .. }) if operand.is_some() => *operand,
                    _ => *value,
                };
                contribution.payload_type = self.arena.type_of(operand);
                trace!(argument = argument.0, payload_type = ?contribution.payload_type, "object value argument");
            }
        }
        contribution
    }

    fn inspect_initializer(&self, initializer: NodeIndex) -> Contribution {
        let mut contribution = Contribution::default();
        let Some(OperationKind::ObjectInitializer { initializers }) = self.arena.kind(initializer)
        else {
            return contribution;
        };

        for &assignment in initializers {
            let Some(OperationKind::Assignment { target, value }) = self.arena.kind(assignment)
            else {
                continue;
            };
            let Some(OperationKind::PropertyReference { property, .. }) = self.arena.kind(*target)
            else {
                continue;
            };

            if self.is_status_property(*property) {
                if let Some(code) = self.constants.try_get_status_code(*value) {
                    trace!(assignment = assignment.0, status_code = code, "status property assignment");
                    contribution.status_code = Some(code);
                }
            } else if let Some(info) = self.symbols.get_property(*property).filter(|info| {
                self.has_attribute_named(&info.attributes, self.cache.object_value_role_attribute())
            }) {
                // The property's declared type, as the assignment sees it.
                contribution.payload_type = Some(info.ty);
                trace!(assignment = assignment.0, payload_type = ?contribution.payload_type, "object value assignment");
            }
        }
        contribution
    }

    /// Whether `property` implements the wrapper's own status member, either
    /// explicitly or as the type's implementation of it.
    fn is_status_property(&self, property: PropertyId) -> bool {
        let Some(status) = self.cache.status_property() else {
            return false;
        };
        let (Some(info), Some(status_info)) = (
            self.symbols.get_property(property),
            self.symbols.get_property(status),
        ) else {
            return false;
        };
        if info.name != status_info.name {
            return false;
        }
        if info.explicit_implementations.contains(&status) {
            return true;
        }
        self.symbols
            .find_implementation_for_interface_member(info.containing_type, status)
            == Some(property)
    }

    /// The default-status annotation itself or a class derived from it.
    fn is_default_status_class(&self, attribute: &AttributeData, attribute_class: TypeId) -> bool {
        self.symbols.is_assignable_to(attribute.class, attribute_class)
    }

    fn has_attribute_named(&self, attributes: &[AttributeData], name: Option<Atom>) -> bool {
        let Some(name) = name else {
            return false;
        };
        attributes
            .iter()
            .any(|attr| self.symbols.attribute_class_name(attr) == Some(name))
    }
}

/// `[DefaultStatusCode(201)]`: exactly one primitive integer argument.
fn default_status_from_attribute(attribute: &AttributeData) -> Option<i32> {
    let [argument] = attribute.constructor_arguments.as_slice() else {
        return None;
    };
    if argument.kind != TypedConstantKind::Primitive {
        return None;
    }
    argument
        .value
        .as_int()
        .and_then(|value| i32::try_from(value).ok())
}
