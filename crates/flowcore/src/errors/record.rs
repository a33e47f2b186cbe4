use crate::{TypeTag, Value};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Shared, type-erased underlying failure
pub type Cause = Arc<dyn Error + Send + Sync>;

/// Immutable record of a single validation failure.
///
/// Created once per failure by [`FlowContext::error_flow`](crate::FlowContext::error_flow)
/// and registered at creation; every handle that carries it afterwards shares
/// the same allocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowError {
    #[serde(rename = "type")]
    expected: TypeTag,
    #[serde(serialize_with = "serialize_lossy")]
    value: Value,
    message: String,
    code: String,
    timestamp: DateTime<Utc>,
    trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    stack: Option<String>,
    #[serde(skip)]
    cause: Option<Cause>,
}

fn serialize_lossy<S: Serializer>(value: &Value, serializer: S) -> Result<S::Ok, S::Error> {
    value.to_json_lossy().serialize(serializer)
}

impl FlowError {
    pub(crate) fn from_template(
        template: ErrorTemplate,
        timestamp: DateTime<Utc>,
        trace_id: String,
        code: String,
    ) -> Self {
        Self {
            expected: template.expected,
            value: template.value.unwrap_or(Value::Null),
            message: template.message,
            code,
            timestamp,
            trace_id,
            stack: template.stack,
            cause: template.cause,
        }
    }

    /// Category the rejected value was expected to belong to
    pub fn expected(&self) -> TypeTag {
        self.expected
    }

    /// The rejected input, preserved verbatim
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl Error for FlowError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}

/// Parameters for an error record; unset fields are stamped when the record
/// is created.
#[derive(Debug, Clone)]
pub struct ErrorTemplate {
    pub(crate) expected: TypeTag,
    pub(crate) value: Option<Value>,
    pub(crate) message: String,
    pub(crate) code: Option<String>,
    pub(crate) timestamp: Option<DateTime<Utc>>,
    pub(crate) trace_id: Option<String>,
    pub(crate) stack: Option<String>,
    pub(crate) cause: Option<Cause>,
}

impl ErrorTemplate {
    pub fn new(expected: TypeTag, message: impl Into<String>) -> Self {
        Self {
            expected,
            value: None,
            message: message.into(),
            code: None,
            timestamp: None,
            trace_id: None,
            stack: None,
            cause: None,
        }
    }

    /// Template used when a factory for `tag` rejects its input
    pub fn for_kind(tag: TypeTag) -> Self {
        Self::new(tag, format!("Value must be {}", tag.expectation())).with_code(tag.error_code())
    }

    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    pub fn with_cause(self, cause: impl Error + Send + Sync + 'static) -> Self {
        self.with_shared_cause(Arc::new(cause))
    }

    pub fn with_shared_cause(mut self, cause: Cause) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn expected(&self) -> TypeTag {
        self.expected
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}
