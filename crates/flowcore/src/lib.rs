//! Core abstractions for fluent value flows
//!
//! This crate provides the machinery every typed flow shares: the immutable
//! [`Flow`] handle, the error record and its registry, the validation helper
//! that turns failures into error flows, and the type-tag plumbing. The
//! per-kind operations live in `flowmethods`.

mod args;
mod context;
mod error;
pub mod errors;
mod flow;
mod kind;
mod methods;
mod safer;
mod value;

pub use args::Args;
pub use context::{Clock, FlowConfig, FlowContext, SystemClock, TraceIdSource, UuidTraceIds};
pub use error::{ArgumentError, TagParseError, ValidationError};
pub use errors::{codes, is_error, ErrorHandle, ErrorRegistry, ErrorTemplate, FlowError, Inspect};
pub use flow::{make_flow, AnyFlow, Flow, Output};
pub use kind::{
    is_array_flow, is_bigint_flow, is_boolean_flow, is_error_flow, is_flow_of_type,
    is_number_flow, is_object_flow, is_string_flow, FlowKind, Tagged, TypeTag,
};
pub use methods::{MethodFn, Methods};
pub use safer::{error_flow, safer, validate};
pub use value::{
    exponent_with_sign, format_number, join_values, Array, BigInt, Object, ToValue, Value,
    MAX_SAFE_INTEGER,
};

/// Result type of dynamically dispatched methods
pub type MethodResult = anyhow::Result<Output>;
