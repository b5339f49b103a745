use rsi_ops::{AnalysisSession, ConstantValue, NodeIndex, OperationArena, SymbolTable, TypeKind};

fn sample_session() -> AnalysisSession {
    let mut symbols = SymbolTable::new();
    let int = symbols.declare_type("System.Int32", TypeKind::Primitive);

    let mut arena = OperationArena::new();
    let literal = arena.add_literal(ConstantValue::Int(7), int);
    let ret = arena.add_return(literal);
    let body = arena.add_method_body(vec![ret]);

    let mut session = AnalysisSession::new(symbols, arena);
    session.add_method("Get", body);
    session
}

#[test]
fn test_session_json_round_trip() {
    let session = sample_session();
    let json = session.to_json().expect("serialize session");
    let restored = AnalysisSession::from_json(&json).expect("deserialize session");

    assert_eq!(restored.operations, session.operations);
    assert_eq!(restored.methods, session.methods);
    assert_eq!(
        restored.symbols.type_by_metadata_name("System.Int32"),
        session.symbols.type_by_metadata_name("System.Int32")
    );
    // Parent links are part of the serialized tree.
    let body = restored.methods[0].body;
    let ret = restored.operations.descendants(body).nth(1).expect("return");
    assert_eq!(restored.operations.parent(ret), Some(body));
}

#[test]
fn test_invalid_methods_reports_non_body_roots() {
    let mut session = sample_session();
    session.add_method("Dangling", NodeIndex(999));
    session.add_method("NotABody", NodeIndex(0));

    let invalid: Vec<&str> = session
        .invalid_methods()
        .map(|entry| entry.name.as_str())
        .collect();
    assert_eq!(invalid, vec!["Dangling", "NotABody"]);
}

#[test]
fn test_methods_field_is_optional() {
    let session = sample_session();
    let mut value: serde_json::Value =
        serde_json::from_str(&session.to_json().expect("serialize")).expect("json value");
    value
        .as_object_mut()
        .expect("session object")
        .remove("methods");

    let restored = AnalysisSession::from_json(&value.to_string()).expect("deserialize");
    assert!(restored.methods.is_empty());
}

fn strip_parents(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            map.remove("parent");
            map.values_mut().for_each(strip_parents);
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(strip_parents),
        _ => {}
    }
}

#[test]
fn test_loading_rebuilds_missing_parent_links() {
    let session = sample_session();
    let mut value: serde_json::Value =
        serde_json::from_str(&session.to_json().expect("serialize")).expect("json value");
    strip_parents(&mut value);

    let restored = AnalysisSession::from_json(&value.to_string()).expect("deserialize");
    assert_eq!(restored.operations, session.operations);
    let body = restored.methods[0].body;
    let ret = restored.operations.descendants(body).nth(1).expect("return");
    assert_eq!(restored.operations.parent(ret), Some(body));
}

#[test]
fn test_loading_overrides_stale_parent_links() {
    let session = sample_session();
    let mut value: serde_json::Value =
        serde_json::from_str(&session.to_json().expect("serialize")).expect("json value");
    for node in value["operations"]["nodes"]
        .as_array_mut()
        .expect("node list")
    {
        node["parent"] = serde_json::json!(0);
    }

    let restored = AnalysisSession::from_json(&value.to_string()).expect("deserialize");
    assert_eq!(restored.operations, session.operations);
}
