// crates/flowmethods/tests/string_flow_test.rs

use flowmethods::codes;
use flowmethods::prelude::*;
use rstest::rstest;
use serde_json::json;

fn text(flow: &Flow<String>) -> &str {
    flow.get().map(String::as_str).unwrap_or("<error>")
}

#[test]
fn test_wraps_and_unwraps_the_same_string() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("hello");
    assert_eq!(text(&flow), "hello");
    assert!(ctx.registry().is_empty());
}

#[test]
fn test_rejects_non_strings_without_changing_them() {
    let ctx = FlowContext::new();
    let raw = Value::from(json!({ "count": 1 }));
    let flow = ctx.string_flow(raw.clone());

    assert!(flow.is_error());
    assert_eq!(flow.to_value(), raw);
    let error = flow.get_error().unwrap();
    assert_eq!(error.message(), "Value must be a string");
    assert_eq!(error.code(), "STRING_FLOW_ERROR");
    assert_eq!(error.expected(), TypeTag::String);
}

#[test]
fn test_case_and_whitespace() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("  Mixed Case  ");
    assert_eq!(text(&flow.trim().to_lower()), "mixed case");
    assert_eq!(text(&flow.trim_start()), "Mixed Case  ");
    assert_eq!(text(&flow.trim_end()), "  Mixed Case");
    assert_eq!(text(&flow.to_upper()), "  MIXED CASE  ");
    assert_eq!(text(&flow), "  Mixed Case  ");
}

#[test]
fn test_length_and_reverse_count_characters() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("héllo");
    assert_eq!(flow.length().get(), Some(&5.0));
    assert_eq!(text(&flow.reverse()), "olléh");
    assert_eq!(flow.flow_array().get().map(Vec::len), Some(5));
}

#[test]
fn test_replacements() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("a-b-c");
    assert_eq!(text(&flow.replace("-", "+")), "a+b-c");
    assert_eq!(text(&flow.replace_all("-", "+")), "a+b+c");
    assert_eq!(text(&flow.replace_pattern(r"(\w)", "[$1]")), "[a]-[b]-[c]");

    let spaced = ctx.string_flow("Te st@Mail .com");
    assert_eq!(text(&spaced.replace_pattern(r"\s", "")), "Test@Mail.com");
}

#[test]
fn test_invalid_pattern_is_an_error_flow() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("abc").replace_pattern("(", "x");

    assert!(flow.is_error());
    let error = flow.get_error().unwrap();
    assert_eq!(error.code(), codes::PATTERN_ERROR);
    assert!(error.message().starts_with("Invalid regular expression"));
    assert_eq!(error.value(), &Value::from("abc"));
    assert_eq!(ctx.registry().len(), 1);
}

#[rstest]
#[case(3, "*", "**5")]
#[case(5, "ab", "abab5")]
#[case(1, "*", "5")]
#[case(4, "", "5")]
fn test_pad_start(#[case] target: usize, #[case] fill: &str, #[case] expected: &str) {
    let ctx = FlowContext::new();
    assert_eq!(text(&ctx.string_flow("5").pad_start(target, fill)), expected);
}

#[test]
fn test_pad_end() {
    let ctx = FlowContext::new();
    assert_eq!(text(&ctx.string_flow("5").pad_end(3, "0")), "500");
}

#[test]
fn test_oversized_padding_is_a_range_error() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("x");
    let padded = flow.pad_start(1 << 40, "ab");

    assert!(padded.is_error());
    let error = padded.get_error().unwrap();
    assert_eq!(error.code(), codes::RANGE_ERROR);
    assert_eq!(error.message(), "Invalid string length");
    assert_eq!(error.value(), &Value::from("x"));
    assert!(flow.pad_end(usize::MAX, "0").is_error());
    assert_eq!(text(&flow.pad_end(usize::MAX, "")), "x");
    assert_eq!(ctx.registry().len(), 2);
}

#[rstest]
#[case::huge(1e12)]
#[case::infinite(f64::INFINITY)]
fn test_dynamic_padding_rejects_huge_targets(#[case] target: f64) {
    let ctx = FlowContext::new();
    let out = ctx
        .string_flow("x")
        .call("pad_start", &[Value::from(target), Value::from("ab")]);

    let error = out.as_flow().and_then(AnyFlow::get_error).unwrap();
    assert_eq!(error.code(), codes::RANGE_ERROR);
    assert_eq!(ctx.registry().len(), 1);
}

#[test]
fn test_searching() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("banana");
    assert_eq!(flow.starts_with("ban").get(), Some(&true));
    assert_eq!(flow.ends_with("na").get(), Some(&true));
    assert_eq!(flow.includes("nan").get(), Some(&true));
    assert_eq!(flow.includes("xyz").get(), Some(&false));
    assert_eq!(flow.index_of("an").get(), Some(&1.0));
    assert_eq!(flow.last_index_of("an").get(), Some(&3.0));
    assert_eq!(flow.index_of("z").get(), Some(&-1.0));
}

#[test]
fn test_character_access() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("abc");
    assert_eq!(text(&flow.char_at(1)), "b");
    assert_eq!(text(&flow.char_at(9)), "");
    assert_eq!(text(&flow.char_at(-1)), "");
    assert_eq!(flow.char_code_at(0).get(), Some(&97.0));
    assert!(flow.char_code_at(3).get().unwrap().is_nan());
}

#[rstest]
#[case(1, None, "ello")]
#[case(-3, None, "llo")]
#[case(1, Some(-1), "ell")]
#[case(3, Some(1), "")]
fn test_slice(#[case] start: i64, #[case] end: Option<i64>, #[case] expected: &str) {
    let ctx = FlowContext::new();
    assert_eq!(text(&ctx.string_flow("hello").slice(start, end)), expected);
}

#[rstest]
#[case(1, Some(3), "el")]
#[case(3, Some(1), "el")]
#[case(-2, Some(2), "he")]
#[case(2, None, "llo")]
fn test_substring(#[case] start: i64, #[case] end: Option<i64>, #[case] expected: &str) {
    let ctx = FlowContext::new();
    assert_eq!(text(&ctx.string_flow("hello").substring(start, end)), expected);
}

#[test]
fn test_split_and_concat() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("a,b,,c");
    assert_eq!(
        flow.split(",").to_value(),
        Value::from(vec!["a", "b", "", "c"])
    );
    assert_eq!(
        ctx.string_flow("hi").split("").to_value(),
        Value::from(vec!["h", "i"])
    );
    assert_eq!(
        ctx.string_flow("a1b22c").split_pattern(r"\d+").to_value(),
        Value::from(vec!["a", "b", "c"])
    );
    assert_eq!(text(&ctx.string_flow("foo").concat("bar")), "foobar");
}

#[test]
fn test_equality() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("same");
    assert_eq!(flow.equals("same").get(), Some(&true));
    assert_eq!(flow.not_equal("same").get(), Some(&false));
}

#[rstest]
#[case("42", 42.0)]
#[case(" 3.5 ", 3.5)]
#[case("", 0.0)]
fn test_flow_number(#[case] input: &str, #[case] expected: f64) {
    let ctx = FlowContext::new();
    assert_eq!(ctx.string_flow(input).flow_number().get(), Some(&expected));
}

#[test]
fn test_number_conversions_yield_nan_not_errors() {
    let ctx = FlowContext::new();
    assert!(ctx.string_flow("12px").flow_number().get().unwrap().is_nan());
    assert_eq!(ctx.string_flow("12px").flow_float_number().get(), Some(&12.0));
    assert!(ctx.registry().is_empty());
}

#[test]
fn test_flow_boolean() {
    let ctx = FlowContext::new();
    assert_eq!(ctx.string_flow("x").flow_boolean().get(), Some(&true));
    assert_eq!(ctx.string_flow("").flow_boolean().get(), Some(&false));
}

#[test]
fn test_flow_object_parses_json() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow(r#"{"name":"flow","tags":["a"],"n":2}"#).flow_object();

    assert!(!flow.is_error());
    assert_eq!(flow.prop("name"), Some(Value::from("flow")));
    assert_eq!(flow.prop("n"), Some(Value::from(2)));
    assert_eq!(flow.keys().to_value(), Value::from(vec!["n", "name", "tags"]));
}

#[rstest]
#[case::not_json("{oops")]
#[case::not_an_object("[1, 2]")]
#[case::null("null")]
fn test_flow_object_failures(#[case] input: &str) {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow(input).flow_object();

    assert!(flow.is_error());
    let error = flow.get_error().unwrap();
    assert_eq!(error.code(), codes::JSON_PARSE_ERROR);
    assert_eq!(error.value(), &Value::from(input));
    assert_eq!(ctx.registry().len(), 1);
}

#[test]
fn test_dynamic_string_calls() {
    let ctx = FlowContext::new();
    let flow = ctx.string_flow("abc");

    assert_eq!(
        flow.call("pad_start", &[Value::from(5)]).value(),
        Some(Value::from("  abc"))
    );
    assert_eq!(
        flow.call("slice", &[Value::from(-2)]).value(),
        Some(Value::from("bc"))
    );
    assert_eq!(
        flow.call("concat", &[Value::from("d"), Value::from(1)]).value(),
        Some(Value::from("abcd1"))
    );
    assert_eq!(
        flow.call("index_of", &[Value::from("c")]).value(),
        Some(Value::from(2))
    );
    assert!(ctx.registry().is_empty());
}
