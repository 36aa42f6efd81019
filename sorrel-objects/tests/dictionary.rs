use std::sync::Arc;

use sorrel_common::consts;
use sorrel_objects::{register_objects, Registry};
use sorrel_runtime::{ArgSlot, Engine, EngineConfig, MemberCache, ObjectRef, Value};

fn engine() -> Engine {
    Engine::new(Arc::new(MemberCache::new()), EngineConfig::default())
}

fn registry() -> Registry {
    let mut reg = Registry::new();
    register_objects(&mut reg);
    reg
}

fn dict() -> ObjectRef {
    registry().create("Scripting.Dictionary", &[]).expect("create")
}

fn key(s: &str) -> ArgSlot {
    ArgSlot::by_val(Value::Str(s.to_string()))
}

fn int16(v: &Value) -> i16 {
    match v {
        Value::Int(i) => *i,
        other => panic!("expected Int, got {:?}", other),
    }
}

fn long(v: &Value) -> i32 {
    match v {
        Value::Long(i) => *i,
        other => panic!("expected Long, got {:?}", other),
    }
}

#[test]
fn prog_ids_resolve_case_insensitively() {
    let reg = registry();
    assert!(reg.has_type("SCRIPTING.DICTIONARY"));
    assert!(reg.has_type("scripting.dictionary"));
    assert!(reg.create("scripting.DICTIONARY", &[]).is_ok());

    let err = reg.create("Scripting.FileSystemObject", &[]).unwrap_err();
    assert_eq!(err.number, consts::ERR_CANNOT_CREATE);
}

#[test]
fn add_exists_remove_count_round_trip() {
    let en = engine();
    let d = dict();

    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[key("name"), ArgSlot::by_val(Value::Str("alice".to_string()))],
    )
    .expect("add");

    let v = en.call(Value::Object(d.clone()), &["Count"], &[]).expect("count");
    assert_eq!(long(&v), 1);

    let v = en
        .call(Value::Object(d.clone()), &["Exists"], &[key("name")])
        .expect("exists");
    assert_eq!(int16(&v), consts::TRUE_INT);

    en.call(Value::Object(d.clone()), &["Remove"], &[key("name")])
        .expect("remove");
    let v = en.call(Value::Object(d), &["Count"], &[]).expect("count");
    assert_eq!(long(&v), 0);
}

#[test]
fn adding_a_duplicate_key_is_refused() {
    let en = engine();
    let d = dict();
    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[key("k"), ArgSlot::by_val(Value::Int(1))],
    )
    .expect("add");
    let err = en
        .call(
            Value::Object(d),
            &["Add"],
            &[key("k"), ArgSlot::by_val(Value::Int(2))],
        )
        .unwrap_err();
    assert_eq!(err.number, 457);
}

#[test]
fn item_is_the_default_member() {
    let en = engine();
    let d = dict();
    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[key("k"), ArgSlot::by_val(Value::Int(42))],
    )
    .expect("add");

    // `d("k")` — no member name, arguments applied to the object.
    let v = en.call(Value::Object(d.clone()), &[], &[key("k")]).expect("call");
    assert_eq!(int16(&v), 42);

    // `d("k") = 7` — default-member parameterized put.
    en.set(Value::Int(7), Value::Object(d.clone()), None, &[key("k")])
        .expect("set");
    let v = en.call(Value::Object(d), &["Item"], &[key("k")]).expect("item");
    assert_eq!(int16(&v), 7);
}

#[test]
fn reading_a_missing_key_adds_it_empty() {
    let en = engine();
    let d = dict();
    let v = en
        .call(Value::Object(d.clone()), &["Item"], &[key("ghost")])
        .expect("item");
    assert!(v.is_empty());

    let v = en.call(Value::Object(d), &["Count"], &[]).expect("count");
    assert_eq!(long(&v), 1);
}

#[test]
fn keys_and_items_come_back_as_arrays() {
    let en = engine();
    let d = dict();
    for (k, v) in [("a", 1i16), ("b", 2)] {
        en.call(
            Value::Object(d.clone()),
            &["Add"],
            &[key(k), ArgSlot::by_val(Value::Int(v))],
        )
        .expect("add");
    }

    let keys = en.call(Value::Object(d.clone()), &["Keys"], &[]).expect("keys");
    match keys {
        Value::Array(arr) => {
            assert_eq!(arr.len(), 2);
            match arr.get(&[0]).expect("get") {
                Value::Str(s) => assert_eq!(s, "a"),
                other => panic!("expected Str, got {:?}", other),
            }
        }
        other => panic!("expected Array, got {:?}", other),
    }

    // Enumeration walks the keys in insertion order.
    let keys = en.enumerable(Value::Object(d)).expect("enumerable");
    assert_eq!(keys.len(), 2);
}

#[test]
fn compare_mode_governs_key_matching() {
    let en = engine();
    let d = dict();

    // Text comparison must be chosen while the dictionary is empty.
    en.set(
        Value::Long(consts::VB_TEXT_COMPARE),
        Value::Object(d.clone()),
        Some("CompareMode"),
        &[],
    )
    .expect("set");

    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[key("Key"), ArgSlot::by_val(Value::Int(1))],
    )
    .expect("add");
    let v = en
        .call(Value::Object(d.clone()), &["Exists"], &[key("KEY")])
        .expect("exists");
    assert_eq!(int16(&v), consts::TRUE_INT);

    let err = en
        .set(
            Value::Long(consts::VB_BINARY_COMPARE),
            Value::Object(d),
            Some("CompareMode"),
            &[],
        )
        .unwrap_err();
    assert_eq!(err.number, consts::ERR_INVALID_CALL);
}

#[test]
fn numeric_keys_match_across_subtypes() {
    let en = engine();
    let d = dict();
    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[ArgSlot::by_val(Value::Int(3)), ArgSlot::by_val(Value::Str("three".to_string()))],
    )
    .expect("add");

    let v = en
        .call(
            Value::Object(d),
            &["Exists"],
            &[ArgSlot::by_val(Value::Num(3.0))],
        )
        .expect("exists");
    assert_eq!(int16(&v), consts::TRUE_INT);
}

#[test]
fn key_rename_requires_an_existing_element() {
    let en = engine();
    let d = dict();
    en.call(
        Value::Object(d.clone()),
        &["Add"],
        &[key("old"), ArgSlot::by_val(Value::Int(1))],
    )
    .expect("add");

    en.set(
        Value::Str("new".to_string()),
        Value::Object(d.clone()),
        Some("Key"),
        &[key("old")],
    )
    .expect("rename");
    let v = en
        .call(Value::Object(d.clone()), &["Exists"], &[key("new")])
        .expect("exists");
    assert_eq!(int16(&v), consts::TRUE_INT);

    let err = en
        .set(
            Value::Str("x".to_string()),
            Value::Object(d),
            Some("Key"),
            &[key("ghost")],
        )
        .unwrap_err();
    assert_eq!(err.number, 32811);
}
