use crate::error::{TagParseError, ValidationError};
use crate::flow::{AnyFlow, Flow};
use crate::value::{Array, BigInt, Object, ToValue, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of value categories a flow can carry, plus `Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Number,
    Boolean,
    Bigint,
    Array,
    Object,
    Error,
}

impl TypeTag {
    pub const ALL: [TypeTag; 7] = [
        TypeTag::String,
        TypeTag::Number,
        TypeTag::Boolean,
        TypeTag::Bigint,
        TypeTag::Array,
        TypeTag::Object,
        TypeTag::Error,
    ];

    /// Tags a success flow can carry
    pub const SUCCESS: [TypeTag; 6] = [
        TypeTag::String,
        TypeTag::Number,
        TypeTag::Boolean,
        TypeTag::Bigint,
        TypeTag::Array,
        TypeTag::Object,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Number => "number",
            TypeTag::Boolean => "boolean",
            TypeTag::Bigint => "bigint",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Error => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, TypeTag::Error)
    }

    /// Code stamped on records produced when a factory rejects its input
    pub fn error_code(&self) -> &'static str {
        match self {
            TypeTag::String => "STRING_FLOW_ERROR",
            TypeTag::Number => "NUMBER_FLOW_ERROR",
            TypeTag::Boolean => "BOOLEAN_FLOW_ERROR",
            TypeTag::Bigint => "BIGINT_FLOW_ERROR",
            TypeTag::Array => "ARRAY_FLOW_ERROR",
            TypeTag::Object => "OBJECT_FLOW_ERROR",
            TypeTag::Error => "FLOW_ERROR",
        }
    }

    /// Noun phrase used in "Value must be ..." messages
    pub fn expectation(&self) -> &'static str {
        match self {
            TypeTag::String => "a string",
            TypeTag::Number => "a number",
            TypeTag::Boolean => "a boolean",
            TypeTag::Bigint => "a bigint",
            TypeTag::Array => "an array",
            TypeTag::Object => "an object",
            TypeTag::Error => "an error",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeTag::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| TagParseError(s.to_string()))
    }
}

/// Anything that reports a type tag
pub trait Tagged {
    fn tag(&self) -> TypeTag;
}

pub fn is_flow_of_type<F: Tagged + ?Sized>(flow: &F, tag: TypeTag) -> bool {
    flow.tag() == tag
}

pub fn is_string_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::String)
}

pub fn is_number_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Number)
}

pub fn is_boolean_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Boolean)
}

pub fn is_bigint_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Bigint)
}

pub fn is_array_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Array)
}

pub fn is_object_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Object)
}

pub fn is_error_flow<F: Tagged + ?Sized>(flow: &F) -> bool {
    is_flow_of_type(flow, TypeTag::Error)
}

/// Payload type of a success flow.
///
/// Implemented for exactly the six success categories; `from_value` is the
/// validator every factory runs on its raw input.
pub trait FlowKind: ToValue + Clone + fmt::Debug + Send + Sync + Sized + 'static {
    const TAG: TypeTag;

    fn from_value(value: &Value) -> Result<Self, ValidationError>;

    fn wrap(flow: Flow<Self>) -> AnyFlow;

    fn unwrap_any(flow: AnyFlow) -> Option<Flow<Self>>;
}

macro_rules! flow_kind {
    ($ty:ty, $tag:ident, $pattern:pat => $extract:expr) => {
        impl FlowKind for $ty {
            const TAG: TypeTag = TypeTag::$tag;

            fn from_value(value: &Value) -> Result<Self, ValidationError> {
                match value {
                    $pattern => Ok($extract),
                    other => Err(ValidationError::mismatch(Self::TAG, other)),
                }
            }

            fn wrap(flow: Flow<Self>) -> AnyFlow {
                AnyFlow::$tag(flow)
            }

            fn unwrap_any(flow: AnyFlow) -> Option<Flow<Self>> {
                match flow {
                    AnyFlow::$tag(flow) => Some(flow),
                    _ => None,
                }
            }
        }
    };
}

flow_kind!(String, String, Value::String(s) => s.clone());
flow_kind!(f64, Number, Value::Number(n) => *n);
flow_kind!(bool, Boolean, Value::Bool(b) => *b);
flow_kind!(BigInt, Bigint, Value::BigInt(n) => *n);
flow_kind!(Array, Array, Value::Array(items) => items.clone());
flow_kind!(Object, Object, Value::Object(map) => map.clone());
