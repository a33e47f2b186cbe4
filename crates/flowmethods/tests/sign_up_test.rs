// crates/flowmethods/tests/sign_up_test.rs
//
// Form validation written against flows: every field is normalized through
// a chain, and the first failing rule becomes a registered error record.

use flowcore::{ErrorHandle, ErrorTemplate};
use flowmethods::prelude::*;
use rstest::rstest;

struct SignUpInput {
    email: Value,
    password: Value,
    confirm_password: Value,
    agree_to_terms: Value,
}

#[derive(Debug, PartialEq)]
struct SignUp {
    email: String,
    password: String,
    agreed: bool,
}

fn input(email: &str, password: &str, confirm: &str, agreed: bool) -> SignUpInput {
    SignUpInput {
        email: email.into(),
        password: password.into(),
        confirm_password: confirm.into(),
        agree_to_terms: agreed.into(),
    }
}

fn rejected(
    ctx: &FlowContext,
    tag: TypeTag,
    message: &str,
    value: impl Into<Value>,
) -> ErrorHandle {
    ctx.error_flow(ErrorTemplate::new(tag, message).with_value(value))
}

fn validate_sign_up(ctx: &FlowContext, input: SignUpInput) -> Result<SignUp, ErrorHandle> {
    let email = ctx
        .string_flow(input.email)
        .trim()
        .to_lower()
        .replace_pattern(r"\s", "");
    let password = ctx.string_flow(input.password).trim();
    let confirm = ctx.string_flow(input.confirm_password).trim();
    let agreed = ctx.boolean_flow(input.agree_to_terms);

    if let Some(handle) = [email.error_handle(), password.error_handle(), confirm.error_handle()]
        .into_iter()
        .flatten()
        .next()
    {
        return Err(handle.clone());
    }
    if let Some(handle) = agreed.error_handle() {
        return Err(handle.clone());
    }

    if email.includes("@").not().get() == Some(&true) {
        return Err(rejected(ctx, TypeTag::String, "Invalid email format", email.to_value()));
    }
    if password.length().less_than(8.0).get() == Some(&true) {
        return Err(rejected(ctx, TypeTag::String, "Password too short", password.to_value()));
    }
    let confirmed = confirm.get().cloned().unwrap_or_default();
    if password.not_equal(&confirmed).get() == Some(&true) {
        return Err(rejected(ctx, TypeTag::String, "Passwords do not match", confirm.to_value()));
    }
    if agreed.not().get() == Some(&true) {
        return Err(rejected(ctx, TypeTag::Boolean, "You must agree to terms", agreed.to_value()));
    }

    Ok(SignUp {
        email: email.into_result()?,
        password: password.into_result()?,
        agreed: agreed.into_result()?,
    })
}

#[test]
fn test_valid_sign_up_is_normalized() {
    let ctx = FlowContext::new();
    let result = validate_sign_up(
        &ctx,
        input("  Test@12345 .com ", " password ", "password", true),
    );

    assert_eq!(
        result.unwrap(),
        SignUp {
            email: "test@12345.com".to_string(),
            password: "password".to_string(),
            agreed: true,
        }
    );
    assert!(ctx.registry().is_empty());
}

#[rstest]
#[case::no_at_sign(input("test.example.com", "password", "password", true), "Invalid email format")]
#[case::short_password(input("a@b.c", "pass", "pass", true), "Password too short")]
#[case::mismatch(input("a@b.c", "password", "passw0rd", true), "Passwords do not match")]
#[case::terms(input("a@b.c", "password", "password", false), "You must agree to terms")]
fn test_rule_violations(#[case] form: SignUpInput, #[case] message: &str) {
    let ctx = FlowContext::new();
    let handle = validate_sign_up(&ctx, form).unwrap_err();

    assert!(is_error(&handle));
    assert_eq!(handle.get_error().message(), message);
    assert_eq!(ctx.registry().len(), 1);
    assert!(ctx
        .registry()
        .find_by_trace_id(handle.get_error().trace_id())
        .is_some());
}

#[test]
fn test_wrongly_typed_field_reports_the_construction_error() {
    let ctx = FlowContext::new();
    let mut form = input("a@b.c", "password", "password", true);
    form.password = Value::from(12345678);

    let handle = validate_sign_up(&ctx, form).unwrap_err();
    assert_eq!(handle.get_error().code(), "STRING_FLOW_ERROR");
    assert_eq!(handle.get(), &Value::from(12345678));
}

#[test]
fn test_terms_must_be_a_real_boolean() {
    let ctx = FlowContext::new();
    let mut form = input("a@b.c", "password", "password", true);
    form.agree_to_terms = Value::from("yes");

    let handle = validate_sign_up(&ctx, form).unwrap_err();
    assert_eq!(handle.get_error().code(), "BOOLEAN_FLOW_ERROR");
    assert_eq!(handle.get_error().expected(), TypeTag::Boolean);
}
