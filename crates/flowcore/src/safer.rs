use crate::errors::{ErrorHandle, ErrorTemplate};
use crate::value::ToValue;
use crate::{FlowContext, FlowKind, Value};
use std::error::Error;

/// Run `validate` on `input` without letting a failure escape.
///
/// On success the validator's result is returned untouched and nothing is
/// registered. On failure the failure's message, a captured stack (if the
/// context is configured for it) and the failure itself as `cause` are merged
/// into `template`; if the template carries no value the input is recorded.
/// The resulting record is registered and its handle returned.
pub fn safer<I, R, E, F>(
    ctx: &FlowContext,
    input: &I,
    validate: F,
    template: ErrorTemplate,
) -> Result<R, ErrorHandle>
where
    I: ToValue + ?Sized,
    F: FnOnce(&I) -> Result<R, E>,
    E: Error + Send + Sync + 'static,
{
    let failure = match validate(input) {
        Ok(value) => return Ok(value),
        Err(failure) => failure,
    };

    let mut template = template.with_message(failure.to_string());
    if template.value.is_none() {
        template.value = Some(input.to_value());
    }
    if template.stack.is_none() {
        template.stack = ctx.capture_stack();
    }
    if template.cause.is_none() {
        template = template.with_cause(failure);
    }
    Err(ctx.error_flow(template))
}

/// Validate a raw value as a payload of kind `T`
pub fn validate<T: FlowKind>(ctx: &FlowContext, raw: &Value) -> Result<T, ErrorHandle> {
    safer(ctx, raw, T::from_value, ErrorTemplate::for_kind(T::TAG))
}

/// Register a record in the process-wide context and return its handle
pub fn error_flow(template: ErrorTemplate) -> ErrorHandle {
    FlowContext::global().error_flow(template)
}
