//! Standard method library for value flows
//!
//! One module per flow kind. Each provides a typed interface trait
//! implemented for the matching [`Flow`], a built-in table for dynamic
//! [`Flow::call`] dispatch, and factories on the process-wide context.
//! [`FlowFactory`] offers the same factories on an explicit
//! [`FlowContext`].

mod array;
mod bigint;
mod boolean;
mod convert;
mod factory;
mod number;
mod object;
mod string;

pub use array::{array_flow, array_flow_with, ArrayMethods};
pub use bigint::{bigint_flow, bigint_flow_with, BigintMethods};
pub use boolean::{boolean_flow, boolean_flow_with, BooleanMethods};
pub use factory::{make_flow, FlowFactory};
pub use number::{number_flow, number_flow_with, NumberMethods};
pub use object::{object_flow, object_flow_with, ObjectMethods};
pub use string::{string_flow, string_flow_with, StringMethods};

use flowcore::{ErrorTemplate, Flow, FlowContext, FlowKind, Methods, TypeTag};
use std::sync::Arc;

/// Codes stamped on records produced by failing operations
pub mod codes {
    pub const OBJECT_ENTRIES_ERROR: &str = "OBJECT_ENTRIES_ERROR";
    pub const JSON_PARSE_ERROR: &str = "JSON_PARSE_ERROR";
    pub const JSON_STRINGIFY_ERROR: &str = "JSON_STRINGIFY_ERROR";
    pub const RANGE_ERROR: &str = "RANGE_ERROR";
    pub const PATTERN_ERROR: &str = "PATTERN_ERROR";
    pub const BIGINT_ARITHMETIC_ERROR: &str = "BIGINT_ARITHMETIC_ERROR";
}

pub mod prelude {
    pub use crate::{
        array_flow, bigint_flow, boolean_flow, make_flow, number_flow, object_flow, string_flow,
        ArrayMethods, BigintMethods, BooleanMethods, FlowFactory, NumberMethods, ObjectMethods,
        StringMethods,
    };
    pub use flowcore::{
        is_error, AnyFlow, Args, Array, BigInt, ErrorRegistry, Flow, FlowContext, FlowError,
        Methods, Object, Output, Tagged, TypeTag, Value,
    };
}

/// Template for a failing operation; the failure supplies the message
pub(crate) fn failure(expected: TypeTag, code: &str) -> ErrorTemplate {
    ErrorTemplate::new(expected, "Operation failed").with_code(code)
}

/// Same-kind successor of `flow` carrying a fallible result, keeping the
/// receiver's merged table
pub(crate) fn successor<T: FlowKind>(
    flow: &Flow<T>,
    ctx: &FlowContext,
    value: T,
    builtins: &Arc<Methods<T>>,
) -> Flow<T> {
    let methods = flow.methods().cloned().unwrap_or_else(|| Arc::clone(builtins));
    Flow::new(ctx, value, methods)
}
