// crates/flowmethods/tests/array_flow_test.rs

use flowmethods::codes;
use flowmethods::prelude::*;
use rstest::rstest;
use serde_json::json;
use std::cmp::Ordering;

fn values<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Value {
    Value::Array(items.into_iter().map(Into::into).collect())
}

fn numbers() -> Flow<Array> {
    FlowContext::new().array_flow(vec![1, 2, 3])
}

#[test]
fn test_rejects_non_arrays() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(Value::from(json!({ "0": 1 })));
    assert!(flow.is_error());
    assert_eq!(flow.get_error().unwrap().code(), "ARRAY_FLOW_ERROR");
    assert_eq!(flow.get_error().unwrap().message(), "Value must be an array");
}

#[test]
fn test_mutating_operations_copy() {
    let flow = numbers();
    assert_eq!(flow.push([4]).to_value(), values([1, 2, 3, 4]));
    assert_eq!(flow.pop().to_value(), values([1, 2]));
    assert_eq!(flow.shift().to_value(), values([2, 3]));
    assert_eq!(flow.unshift([0, -1]).to_value(), values([0, -1, 1, 2, 3]));
    assert_eq!(flow.reverse().to_value(), values([3, 2, 1]));
    assert_eq!(
        flow.splice(1, Some(1), [9, 8]).to_value(),
        values([1, 9, 8, 3])
    );
    assert_eq!(flow.to_value(), values([1, 2, 3]));
}

#[test]
fn test_splice_like_native() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![1, 2, 3, 4, 5]);
    assert_eq!(flow.splice(1, Some(2), [6, 7]).to_value(), values([1, 6, 7, 4, 5]));
    assert_eq!(flow.splice(-2, None, Vec::<Value>::new()).to_value(), values([1, 2, 3]));
    assert_eq!(flow.splice(9, Some(1), [0]).to_value(), values([1, 2, 3, 4, 5, 0]));
}

#[test]
fn test_join_and_string_forms() {
    let ctx = FlowContext::new();
    let flow = numbers();
    assert_eq!(flow.join("-").get().map(String::as_str), Some("1-2-3"));
    assert_eq!(flow.flow_string().get().map(String::as_str), Some("1,2,3"));
    assert_eq!(flow.flow_stringify().get().map(String::as_str), Some("[1,2,3]"));

    let mixed = ctx.array_flow(vec![Value::from(1000), Value::Null, Value::from("x")]);
    assert_eq!(mixed.join(",").get().map(String::as_str), Some("1000,,x"));
    assert_eq!(
        mixed.flow_locale_string().get().map(String::as_str),
        Some("1,000,,x")
    );
}

#[test]
fn test_stringify_rejects_bigints() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![Value::BigInt(1)]).flow_stringify();
    assert!(flow.is_error());
    assert_eq!(flow.get_error().unwrap().code(), codes::JSON_STRINGIFY_ERROR);
    assert_eq!(ctx.registry().len(), 1);
}

#[test]
fn test_callbacks_receive_element_and_index() {
    let flow = numbers();
    let doubled = flow.map(|item, _| item.as_f64().unwrap_or(0.0) * 2.0);
    assert_eq!(doubled.to_value(), values([2, 4, 6]));

    let odd_positions = flow.filter(|_, i| i % 2 == 1);
    assert_eq!(odd_positions.to_value(), values([2]));

    let sum = flow.reduce(0.0, |acc, item, _| acc + item.as_f64().unwrap_or(0.0));
    assert_eq!(sum, Some(6.0));

    let mut seen = Vec::new();
    let same = flow.for_each(|item, i| seen.push((i, item.clone())));
    assert_eq!(seen.len(), 3);
    assert_eq!(same.to_value(), flow.to_value());
}

#[test]
fn test_default_sort_compares_strings() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![10, 9, 1, 100]);
    assert_eq!(flow.sort().to_value(), values([1, 10, 100, 9]));

    let numeric = flow.sort_by(|a, b| {
        a.as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal)
    });
    assert_eq!(numeric.to_value(), values([1, 9, 10, 100]));
    assert_eq!(flow.to_value(), values([10, 9, 1, 100]));
}

#[test]
fn test_concat_spreads_one_level() {
    let flow = numbers();
    assert_eq!(flow.concat([4, 5]).to_value(), values([1, 2, 3, 4, 5]));
    let nested = flow.concat([values([4, 5]), Value::from(6)]);
    assert_eq!(nested.to_value(), values([1, 2, 3, 4, 5, 6]));
    let deep = flow.concat([values([values([4])])]);
    assert_eq!(deep.to_value(), values([Value::from(1), 2.into(), 3.into(), values([4])]));
}

#[rstest]
#[case(1, None, vec![2, 3])]
#[case(-2, None, vec![2, 3])]
#[case(0, Some(-1), vec![1, 2])]
#[case(2, Some(1), vec![])]
fn test_slice(#[case] start: i64, #[case] end: Option<i64>, #[case] expected: Vec<i32>) {
    assert_eq!(numbers().slice(start, end).to_value(), values(expected));
}

#[test]
fn test_searching() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![1, 2, 3, 2]);
    assert_eq!(flow.index_of(2, None).get(), Some(&1.0));
    assert_eq!(flow.index_of(2, Some(2)).get(), Some(&3.0));
    assert_eq!(flow.index_of(7, None).get(), Some(&-1.0));
    assert_eq!(flow.last_index_of(2).get(), Some(&3.0));
    assert_eq!(flow.includes(3, None).get(), Some(&true));
    assert_eq!(flow.includes(1, Some(-2)).get(), Some(&false));
    assert_eq!(flow.find(|item, _| item.as_f64() > Some(1.5)), Some(Value::from(2)));
    assert_eq!(flow.find(|item, _| item.is_null()), None);
    assert_eq!(flow.find_index(|item, _| *item == Value::from(3)).get(), Some(&2.0));
    assert_eq!(flow.find_last_index(|item, _| *item == Value::from(2)).get(), Some(&3.0));
    assert_eq!(flow.at(-1), Some(Value::from(2)));
}

#[test]
fn test_nan_is_found_by_includes_only() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![f64::NAN]);
    assert_eq!(flow.includes(f64::NAN, None).get(), Some(&true));
    assert_eq!(flow.index_of(f64::NAN, None).get(), Some(&-1.0));
}

#[test]
fn test_every_and_some() {
    let flow = numbers();
    assert_eq!(flow.every(|item, _| item.as_f64().is_some()).get(), Some(&true));
    assert_eq!(flow.some(|item, _| *item == Value::from(5)).get(), Some(&false));
}

#[test]
fn test_conversions() {
    let ctx = FlowContext::new();
    let flow = numbers();
    assert_eq!(flow.length().get(), Some(&3.0));
    assert_eq!(flow.flow_number().get(), Some(&3.0));
    assert_eq!(flow.flow_boolean().get(), Some(&true));
    assert_eq!(ctx.array_flow(Vec::<Value>::new()).flow_boolean().get(), Some(&false));
    assert_eq!(
        flow.flow_object().to_value(),
        Value::from(json!({ "0": 1, "1": 2, "2": 3 }))
    );
}

#[test]
fn test_object_entries() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(Value::from(json!([["a", 1], ["b", [true]]])));
    let object = flow.flow_object_entries();

    assert!(!object.is_error());
    assert_eq!(object.prop("a"), Some(Value::from(1)));
    assert_eq!(object.prop("b"), Some(values([true])));
    assert!(ctx.registry().is_empty());
}

#[test]
fn test_callbacks_never_run_on_error_flows() {
    let ctx = FlowContext::new();
    let failed = ctx.array_flow("nope");
    let mut calls = 0;

    let mapped = failed.map(|item, _| {
        calls += 1;
        item.clone()
    });
    assert!(mapped.is_error());
    assert_eq!(failed.reduce(0, |acc, _, _| acc + 1), None);
    assert_eq!(failed.find(|_, _| true), None);
    assert_eq!(failed.at(0), None);
    assert_eq!(calls, 0);
    assert_eq!(ctx.registry().len(), 1);
}

#[test]
fn test_dynamic_array_calls() {
    let ctx = FlowContext::new();
    let flow = ctx.array_flow(vec![1, 2, 3]);

    assert_eq!(
        flow.call("push", &[Value::from(4), Value::from(5)]).value(),
        Some(values([1, 2, 3, 4, 5]))
    );
    assert_eq!(
        flow.call("join", &[]).value(),
        Some(Value::from("1,2,3"))
    );
    assert_eq!(
        flow.call("splice", &[Value::from(0), Value::from(1), Value::from("x")])
            .value(),
        Some(values([Value::from("x"), 2.into(), 3.into()]))
    );
    assert_eq!(flow.call("at", &[Value::from(5)]).value(), None);
    assert!(flow.call("at", &[Value::from(5)]).is_undefined());
    assert!(!flow.has_method("map"));
}
