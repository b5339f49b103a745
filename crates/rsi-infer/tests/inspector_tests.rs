
use rsi_common::InferenceOptions;
use rsi_common::limits::MAX_CONVERSION_UNWIND_DEPTH;
use rsi_infer::{ActualResponseMetadata, LocalBindings, ReturnInspector, SymbolCache};
use rsi_ops::{
    AttributeData, NodeIndex, OperationKind, TypeKind, TypedConstant, TypedConstantKind,
};
use test_fixtures::SessionBuilder;

fn inspect(s: &SessionBuilder, body: NodeIndex, ret: NodeIndex) -> Option<ActualResponseMetadata> {
    let cache = s.cache();
    let bindings = LocalBindings::collect(&s.arena, &s.symbols, body);
    ReturnInspector::new(&s.arena, &s.symbols, &cache, &bindings).inspect(ret)
}

fn inspect_single(s: &mut SessionBuilder, value: NodeIndex) -> Option<ActualResponseMetadata> {
    let (body, ret) = s.single_return_body(value);
    inspect(s, body, ret)
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_raw_model_is_resolved_without_status() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let (body, ret) = s.single_return_body(person);

    let entry = inspect(&s, body, ret).expect("raw model resolves");
    assert_eq!(entry, ActualResponseMetadata::raw_model(ret, Some(s.person)));
    assert!(entry.is_default_response());
}

#[test]
fn test_raw_model_behind_action_result_of_t_conversion() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let converted = s.arena.add_conversion(person, s.action_result_of_t);

    let entry = inspect_single(&mut s, converted).expect("raw model resolves");
    assert_eq!(entry.status_code, None);
    assert_eq!(entry.payload_type, Some(s.person));
}

#[test]
fn test_missing_or_invalid_value_is_unresolvable() {
    let mut s = SessionBuilder::new();
    assert_eq!(inspect_single(&mut s, NodeIndex::NONE), None);

    let invalid = s.arena.add_invalid(Vec::new(), Some(s.status_code_result));
    assert_eq!(inspect_single(&mut s, invalid), None);
}

#[test]
fn test_wrapper_without_any_status_is_unresolvable() {
    let mut s = SessionBuilder::new();
    let custom = s.declare_result_type("App.CustomResult", s.action_result);
    let value = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, custom);

    assert_eq!(inspect_single(&mut s, value), None);
}

#[test]
fn test_missing_wrapper_type_treats_everything_as_raw_model() {
    let mut s = SessionBuilder::new();
    let not_found = s.new_not_found_result();
    let (body, ret) = s.single_return_body(not_found);

    let options = InferenceOptions {
        wrapper_type: "Other.Framework.IResult".to_string(),
        ..InferenceOptions::default()
    };
    let cache = SymbolCache::new(&s.symbols, &options);
    assert_eq!(cache.wrapper_type(), None);

    let bindings = LocalBindings::collect(&s.arena, &s.symbols, body);
    let entry = ReturnInspector::new(&s.arena, &s.symbols, &cache, &bindings)
        .inspect(ret)
        .expect("raw model");
    assert_eq!(entry, ActualResponseMetadata::raw_model(ret, Some(s.not_found_result)));
}

// =============================================================================
// Defaults
// =============================================================================

#[test]
fn test_type_default_status() {
    let mut s = SessionBuilder::new();
    let not_found = s.new_not_found_result();

    let entry = inspect_single(&mut s, not_found).expect("resolved");
    assert_eq!(entry.status_code, Some(404));
    assert_eq!(entry.payload_type, None);
}

#[test]
fn test_inherited_type_default_status() {
    let mut s = SessionBuilder::new();
    let custom = s.declare_result_type("App.GoneAwayResult", s.not_found_result);
    let value = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, custom);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(404));
}

#[test]
fn test_helper_call_uses_type_default() {
    let mut s = SessionBuilder::new();
    let call = s.call_not_found();
    let converted = s.arena.add_conversion(call, s.action_result_iface);

    let entry = inspect_single(&mut s, converted).expect("resolved");
    assert_eq!(entry.status_code, Some(404));
}

#[test]
fn test_helper_method_default_with_object_value_argument() {
    let mut s = SessionBuilder::new();
    let foo = s.symbols.declare_type("App.Models.Foo", TypeKind::Class);
    let created_result = s.declare_result_type("App.CreatedResult", s.object_result);
    let helper = s
        .symbols
        .declare_method(Some(s.controller), "Created", Some(created_result));
    s.symbols
        .add_method_attribute(helper, AttributeData::with_int(s.default_status_attribute, 201));
    let value_param = s.symbols.add_parameter(helper, "value", s.object);
    s.symbols
        .add_parameter_attribute(value_param, AttributeData::new(s.object_value_role));

    let foo_value = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, foo);
    let boxed = s.as_object(foo_value);
    let argument = s.arena.add_argument(Some(value_param), boxed);
    let call = s
        .arena
        .add_invocation(helper, vec![argument], Some(created_result));

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(201));
    assert_eq!(entry.payload_type, Some(foo));
}

#[test]
fn test_unresolved_invocation_uses_first_candidate_default() {
    let mut s = SessionBuilder::new();
    let accepted = s.declare_result_type("App.AcceptedResult", s.action_result);
    let first = s.symbols.declare_method(Some(s.controller), "Accepted", Some(accepted));
    s.symbols
        .add_method_attribute(first, AttributeData::with_int(s.default_status_attribute, 202));
    let second = s.symbols.declare_method(Some(s.controller), "Accepted", Some(accepted));
    s.symbols
        .add_method_attribute(second, AttributeData::with_int(s.default_status_attribute, 299));
    let call = s
        .arena
        .add_ambiguous_invocation(vec![first, second], Vec::new(), Some(accepted));

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(202));
}

#[test]
fn test_type_default_wins_over_method_default() {
    let mut s = SessionBuilder::new();
    let helper = s
        .symbols
        .declare_method(Some(s.controller), "Missing", Some(s.not_found_result));
    s.symbols
        .add_method_attribute(helper, AttributeData::with_int(s.default_status_attribute, 410));
    let call = s
        .arena
        .add_invocation(helper, Vec::new(), Some(s.not_found_result));

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(404));
}

#[test]
fn test_malformed_default_annotation_contributes_nothing() {
    let mut s = SessionBuilder::new();
    let two_args = s.declare_result_type("App.TwoArgResult", s.action_result);
    s.symbols.add_type_attribute(
        two_args,
        AttributeData {
            class: s.default_status_attribute,
            constructor_arguments: vec![TypedConstant::int(200), TypedConstant::int(201)],
        },
    );
    let enum_arg = s.declare_result_type("App.EnumArgResult", s.action_result);
    s.symbols.add_type_attribute(
        enum_arg,
        AttributeData {
            class: s.default_status_attribute,
            constructor_arguments: vec![TypedConstant {
                kind: TypedConstantKind::Enum,
                value: rsi_ops::ConstantValue::Int(200),
            }],
        },
    );

    let first = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, two_args);
    assert_eq!(inspect_single(&mut s, first), None);
    let second = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, enum_arg);
    assert_eq!(inspect_single(&mut s, second), None);
}

// =============================================================================
// Arguments and Initializers
// =============================================================================

#[test]
fn test_constructor_status_argument() {
    let mut s = SessionBuilder::new();
    let code = s.int_literal(404);
    let value = s.new_status_code_result(code, NodeIndex::NONE);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(404));
    assert_eq!(entry.payload_type, None);
}

#[test]
fn test_helper_status_argument_from_const_field() {
    let mut s = SessionBuilder::new();
    let status_codes = s
        .symbols
        .declare_type("Microsoft.AspNetCore.Http.StatusCodes", TypeKind::Class);
    let field = s.symbols.declare_field(
        Some(status_codes),
        "Status422UnprocessableEntity",
        s.int,
        Some(rsi_ops::ConstantValue::Int(422)),
    );
    let reference =
        s.arena
            .add_member_reference(rsi_ops::MemberSymbol::Field(field), NodeIndex::NONE, Some(s.int));
    let call = s.call_status_code(reference);

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(422));
}

#[test]
fn test_initializer_status_overrides_constructor_argument() {
    let mut s = SessionBuilder::new();
    let code = s.int_literal(400);
    let override_code = s.int_literal(500);
    let assignment = s.property_assignment(s.status_code_result_status, override_code);
    let initializer = s.arena.add_object_initializer(vec![assignment]);
    let value = s.new_status_code_result(code, initializer);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(500));
    assert_eq!(entry.payload_type, None);
}

#[test]
fn test_object_result_payload_and_initializer_status() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let code = s.int_literal(500);
    let assignment = s.property_assignment(s.object_result_status, code);
    let initializer = s.arena.add_object_initializer(vec![assignment]);
    let value = s.new_object_result(person, initializer);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(500));
    assert_eq!(entry.payload_type, Some(s.person));
}

#[test]
fn test_object_value_property_assignment_sets_declared_type() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let code = s.int_literal(200);
    let status = s.property_assignment(s.object_result_status, code);
    let other = s.new_person();
    let boxed = s.as_object(other);
    let value_assignment = s.property_assignment(s.object_result_value, boxed);
    let initializer = s.arena.add_object_initializer(vec![status, value_assignment]);
    let value = s.new_object_result(person, initializer);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(200));
    // The assignment's type is the property's declared type.
    assert_eq!(entry.payload_type, Some(s.object));
}

#[test]
fn test_non_constant_initializer_status_falls_back() {
    let mut s = SessionBuilder::new();
    let code = s.int_literal(400);
    let computed = s.arena.add_other(Vec::new(), Some(s.int));
    let assignment = s.property_assignment(s.status_code_result_status, computed);
    let initializer = s.arena.add_object_initializer(vec![assignment]);
    let value = s.new_status_code_result(code, initializer);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(400));
}

#[test]
fn test_all_three_tiers_initializer_wins() {
    let mut s = SessionBuilder::new();
    let tiered = s.declare_result_type("App.TieredResult", s.status_code_result);
    s.symbols
        .add_type_attribute(tiered, AttributeData::with_int(s.default_status_attribute, 200));
    let ctor = s.symbols.declare_method(Some(tiered), ".ctor", None);
    let code_param = s.symbols.add_parameter(ctor, "statusCode", s.int);
    s.symbols
        .add_parameter_attribute(code_param, AttributeData::new(s.status_code_role));

    let build = |s: &mut SessionBuilder, with_initializer: bool| {
        let code = s.int_literal(400);
        let argument = s.arena.add_argument(Some(code_param), code);
        let initializer = if with_initializer {
            let override_code = s.int_literal(500);
            let assignment = s.property_assignment(s.status_code_result_status, override_code);
            s.arena.add_object_initializer(vec![assignment])
        } else {
            NodeIndex::NONE
        };
        s.arena
            .add_construction(Some(ctor), vec![argument], initializer, tiered)
    };

    let argument_only = build(&mut s, false);
    assert_eq!(inspect_single(&mut s, argument_only).and_then(|e| e.status_code), Some(400));
    let all_tiers = build(&mut s, true);
    assert_eq!(inspect_single(&mut s, all_tiers).and_then(|e| e.status_code), Some(500));
}

#[test]
fn test_explicit_status_property_implementation() {
    let mut s = SessionBuilder::new();
    let custom = s.declare_result_type("App.ExplicitResult", s.action_result);
    s.symbols.add_interface(custom, s.status_code_iface);
    let explicit = s.symbols.declare_property(custom, "StatusCode", s.int);
    s.symbols
        .add_explicit_implementation(explicit, s.iface_status_property);

    let code = s.int_literal(307);
    let assignment = s.property_assignment(explicit, code);
    let initializer = s.arena.add_object_initializer(vec![assignment]);
    let value = s.arena.add_construction(None, Vec::new(), initializer, custom);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(307));
}

#[test]
fn test_same_named_property_of_unrelated_type_is_ignored() {
    let mut s = SessionBuilder::new();
    let dto = s.symbols.declare_type("App.Dto", TypeKind::Class);
    let dto_status = s.symbols.declare_property(dto, "StatusCode", s.int);
    let custom = s.declare_result_type("App.PlainResult", s.action_result);

    let code = s.int_literal(299);
    let assignment = s.property_assignment(dto_status, code);
    let initializer = s.arena.add_object_initializer(vec![assignment]);
    let value = s.arena.add_construction(None, Vec::new(), initializer, custom);

    assert_eq!(inspect_single(&mut s, value), None);
}

#[test]
fn test_nested_conversions_match_unwrapped_construction() {
    let mut s = SessionBuilder::new();
    let code = s.int_literal(404);
    let plain = s.new_status_code_result(code, NodeIndex::NONE);
    let plain_entry = inspect_single(&mut s, plain).expect("resolved");

    let code = s.int_literal(404);
    let wrapped_inner = s.new_status_code_result(code, NodeIndex::NONE);
    let wrapped = s.to_action_result_of_t(wrapped_inner);
    let wrapped_entry = inspect_single(&mut s, wrapped).expect("resolved");

    assert_eq!(wrapped_entry.status_code, plain_entry.status_code);
    assert_eq!(wrapped_entry.payload_type, plain_entry.payload_type);
}

#[test]
fn test_ok_helper_reports_payload_and_default() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let call = s.call_ok(person);

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(200));
    assert_eq!(entry.payload_type, Some(s.person));
}

#[test]
fn test_object_value_assignment_without_node_type_uses_property_type() {
    let mut s = SessionBuilder::new();
    let person = s.new_person();
    let code = s.int_literal(200);
    let status = s.property_assignment(s.object_result_status, code);
    let other = s.new_person();
    let boxed = s.as_object(other);
    let target = s
        .arena
        .add_property_reference(s.object_result_value, NodeIndex::NONE, s.object);
    // A collaborator that leaves the assignment itself untyped.
    let untyped_assignment = s.arena.push(
        OperationKind::Assignment {
            target,
            value: boxed,
        },
        None,
        None,
    );
    let initializer = s
        .arena
        .add_object_initializer(vec![status, untyped_assignment]);
    let value = s.new_object_result(person, initializer);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(200));
    assert_eq!(entry.payload_type, Some(s.object));
}

#[test]
fn test_conversion_chain_limit() {
    let mut s = SessionBuilder::new();
    let wrap = |s: &mut SessionBuilder, layers: u32| {
        let code = s.int_literal(404);
        let mut value = s.new_status_code_result(code, NodeIndex::NONE);
        for _ in 0..layers {
            value = s.arena.add_conversion(value, s.action_result);
        }
        value
    };

    let at_limit = wrap(&mut s, MAX_CONVERSION_UNWIND_DEPTH);
    assert_eq!(
        inspect_single(&mut s, at_limit).and_then(|entry| entry.status_code),
        Some(404)
    );

    let beyond_limit = wrap(&mut s, MAX_CONVERSION_UNWIND_DEPTH + 1);
    assert_eq!(inspect_single(&mut s, beyond_limit), None);
}

#[test]
fn test_default_status_from_derived_annotation_class() {
    let mut s = SessionBuilder::new();
    let derived_attribute =
        s.declare_result_type("App.CreatedStatusAttribute", s.default_status_attribute);
    let created = s.declare_result_type("App.CreatedAtResult", s.action_result);
    s.symbols
        .add_type_attribute(created, AttributeData::with_int(derived_attribute, 201));
    let value = s.arena.add_construction(None, Vec::new(), NodeIndex::NONE, created);

    let entry = inspect_single(&mut s, value).expect("resolved");
    assert_eq!(entry.status_code, Some(201));
}

#[test]
fn test_derived_annotation_class_on_helper_method() {
    let mut s = SessionBuilder::new();
    let derived_attribute =
        s.declare_result_type("App.AcceptedStatusAttribute", s.default_status_attribute);
    let accepted = s.declare_result_type("App.AcceptedResult", s.action_result);
    let helper = s
        .symbols
        .declare_method(Some(s.controller), "Accepted", Some(accepted));
    s.symbols
        .add_method_attribute(helper, AttributeData::with_int(derived_attribute, 202));
    let call = s.arena.add_invocation(helper, Vec::new(), Some(accepted));

    let entry = inspect_single(&mut s, call).expect("resolved");
    assert_eq!(entry.status_code, Some(202));
}
