use crate::errors::{codes, ErrorHandle, ErrorTemplate, FlowError, Inspect};
use crate::methods::Methods;
use crate::safer::safer;
use crate::value::{Array, BigInt, Object, Value};
use crate::{FlowContext, FlowKind, Tagged, TypeTag, ValidationError};
use std::error::Error;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
enum State<T> {
    Success(T),
    Failure(ErrorHandle),
}

/// Immutable handle binding a payload (or an error record) to its method
/// table and context.
///
/// A flow is success-shaped or error-shaped, never both. Every operation
/// returns a new flow; the receiver is left untouched. Operations on an
/// error-shaped flow carry the original record forward without registering
/// it again.
#[derive(Clone)]
pub struct Flow<T: FlowKind> {
    state: State<T>,
    methods: Option<Arc<Methods<T>>>,
    ctx: FlowContext,
}

impl<T: FlowKind> Flow<T> {
    /// Wrap an already valid payload
    pub fn new(ctx: &FlowContext, value: T, methods: Arc<Methods<T>>) -> Self {
        Self {
            state: State::Success(value),
            methods: Some(methods),
            ctx: ctx.clone(),
        }
    }

    /// Error-shaped flow around an existing record
    pub fn from_error(ctx: &FlowContext, handle: ErrorHandle) -> Self {
        Self {
            state: State::Failure(handle),
            methods: None,
            ctx: ctx.clone(),
        }
    }

    /// Register a new record from `template` and wrap it
    pub fn failed(ctx: &FlowContext, template: ErrorTemplate) -> Self {
        Self::from_error(ctx, ctx.error_flow(template))
    }

    pub fn get(&self) -> Option<&T> {
        match &self.state {
            State::Success(value) => Some(value),
            State::Failure(_) => None,
        }
    }

    pub fn get_error(&self) -> Option<&FlowError> {
        self.error_handle().map(ErrorHandle::get_error)
    }

    pub fn error_handle(&self) -> Option<&ErrorHandle> {
        match &self.state {
            State::Success(_) => None,
            State::Failure(handle) => Some(handle),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.state, State::Failure(_))
    }

    /// The payload as a dynamic value; for error flows, the offending input
    pub fn to_value(&self) -> Value {
        match &self.state {
            State::Success(value) => value.to_value(),
            State::Failure(handle) => handle.get().clone(),
        }
    }

    pub fn as_result(&self) -> Result<&T, &FlowError> {
        match &self.state {
            State::Success(value) => Ok(value),
            State::Failure(handle) => Err(handle.get_error()),
        }
    }

    pub fn into_result(self) -> Result<T, ErrorHandle> {
        match self.state {
            State::Success(value) => Ok(value),
            State::Failure(handle) => Err(handle),
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    /// Merged method table; error flows have none
    pub fn methods(&self) -> Option<&Arc<Methods<T>>> {
        self.methods.as_ref()
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods
            .as_ref()
            .map_or(false, |methods| methods.contains(name))
    }

    /// Invoke an operation by name through the merged table.
    ///
    /// Error flows answer every call with [`Output::Undefined`]. Unknown
    /// names and failing methods produce error flows instead of panicking.
    pub fn call(&self, name: &str, args: &[Value]) -> Output {
        let value = match &self.state {
            State::Success(value) => value,
            State::Failure(_) => return Output::Undefined,
        };

        let Some(method) = self.methods.as_ref().and_then(|methods| methods.get(name)) else {
            tracing::warn!("Unknown method '{}' on {} flow", name, T::TAG);
            let template = ErrorTemplate::new(
                T::TAG,
                format!("{} is not a method of {} flows", name, T::TAG),
            )
            .with_code(codes::UNKNOWN_METHOD)
            .with_value(value.to_value())
            .with_cause(ValidationError::UnknownMethod(name.to_string()));
            return Output::from(Flow::<T>::failed(&self.ctx, template));
        };

        match method(self, args) {
            Ok(output) => output,
            Err(err) => {
                let cause: Box<dyn Error + Send + Sync> = err.into();
                let template = ErrorTemplate::new(T::TAG, cause.to_string())
                    .with_code(codes::METHOD_CALL_ERROR)
                    .with_value(value.to_value())
                    .with_shared_cause(Arc::from(cause));
                Output::from(Flow::<T>::failed(&self.ctx, template))
            }
        }
    }

    /// Same-kind successor sharing this flow's method table
    pub fn map_value(&self, op: impl FnOnce(&T) -> T) -> Flow<T> {
        match &self.state {
            State::Success(value) => Flow {
                state: State::Success(op(value)),
                methods: self.methods.clone(),
                ctx: self.ctx.clone(),
            },
            State::Failure(_) => self.clone(),
        }
    }

    /// Successor of any kind; errors propagate untouched
    pub fn and_then<U: FlowKind>(&self, op: impl FnOnce(&T, &FlowContext) -> Flow<U>) -> Flow<U> {
        match &self.state {
            State::Success(value) => op(value, &self.ctx),
            State::Failure(handle) => Flow::from_error(&self.ctx, handle.clone()),
        }
    }

    /// Successor computed by a fallible native operation.
    ///
    /// The operation runs through [`safer`], so a failure becomes a new
    /// registered record built from `template` instead of escaping.
    pub fn try_then<U, R, E, F, B>(&self, template: ErrorTemplate, op: F, build: B) -> Flow<U>
    where
        U: FlowKind,
        F: FnOnce(&T) -> Result<R, E>,
        E: Error + Send + Sync + 'static,
        B: FnOnce(&FlowContext, R) -> Flow<U>,
    {
        self.and_then(|value, ctx| match safer(ctx, value, op, template) {
            Ok(result) => build(ctx, result),
            Err(handle) => Flow::from_error(ctx, handle),
        })
    }

    /// Terminal query on the payload; `None` for error flows
    pub fn inspect_value<R>(&self, op: impl FnOnce(&T) -> R) -> Option<R> {
        self.get().map(op)
    }
}

/// The validating core factory.
///
/// Runs the kind's validator on `raw`; a valid payload gets `builtins`
/// merged with `custom` (custom wins on name collisions), an invalid one
/// becomes an error flow whose record is registered in `ctx`.
pub fn make_flow<T: FlowKind>(
    ctx: &FlowContext,
    raw: impl Into<Value>,
    builtins: &Arc<Methods<T>>,
    custom: Option<&Methods<T>>,
) -> Flow<T> {
    let raw = raw.into();
    match safer(ctx, &raw, T::from_value, ErrorTemplate::for_kind(T::TAG)) {
        Ok(value) => Flow::new(ctx, value, Methods::merged(builtins, custom)),
        Err(handle) => Flow::from_error(ctx, handle),
    }
}

impl<T: FlowKind> Tagged for Flow<T> {
    fn tag(&self) -> TypeTag {
        match self.state {
            State::Success(_) => T::TAG,
            State::Failure(_) => TypeTag::Error,
        }
    }
}

impl<T: FlowKind> Inspect for Flow<T> {
    fn flow_error(&self) -> Option<&FlowError> {
        self.get_error()
    }
}

impl<T: FlowKind> fmt::Debug for Flow<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Flow");
        debug.field("tag", &self.tag());
        match &self.state {
            State::Success(value) => debug.field("value", value),
            State::Failure(handle) => debug.field("error", handle.get_error()),
        };
        debug.finish()
    }
}

/// Flow of any kind, or a bare error handle
#[derive(Debug, Clone)]
pub enum AnyFlow {
    String(Flow<String>),
    Number(Flow<f64>),
    Boolean(Flow<bool>),
    Bigint(Flow<BigInt>),
    Array(Flow<Array>),
    Object(Flow<Object>),
    Error(ErrorHandle),
}

macro_rules! each_flow {
    ($any:expr, $flow:ident => $body:expr, $handle:ident => $error:expr) => {
        match $any {
            AnyFlow::String($flow) => $body,
            AnyFlow::Number($flow) => $body,
            AnyFlow::Boolean($flow) => $body,
            AnyFlow::Bigint($flow) => $body,
            AnyFlow::Array($flow) => $body,
            AnyFlow::Object($flow) => $body,
            AnyFlow::Error($handle) => $error,
        }
    };
}

impl AnyFlow {
    pub fn is_error(&self) -> bool {
        self.flow_error().is_some()
    }

    pub fn get_error(&self) -> Option<&FlowError> {
        self.flow_error()
    }

    pub fn to_value(&self) -> Value {
        each_flow!(self, flow => flow.to_value(), handle => handle.get().clone())
    }

    pub fn call(&self, name: &str, args: &[Value]) -> Output {
        each_flow!(self, flow => flow.call(name, args), _handle => Output::Undefined)
    }

    pub fn downcast<T: FlowKind>(self) -> Option<Flow<T>> {
        T::unwrap_any(self)
    }
}

impl Tagged for AnyFlow {
    fn tag(&self) -> TypeTag {
        each_flow!(self, flow => flow.tag(), handle => handle.tag())
    }
}

impl Inspect for AnyFlow {
    fn flow_error(&self) -> Option<&FlowError> {
        each_flow!(self, flow => flow.get_error(), handle => Some(handle.get_error()))
    }
}

impl<T: FlowKind> From<Flow<T>> for AnyFlow {
    fn from(flow: Flow<T>) -> Self {
        T::wrap(flow)
    }
}

impl From<ErrorHandle> for AnyFlow {
    fn from(handle: ErrorHandle) -> Self {
        AnyFlow::Error(handle)
    }
}

/// Result of a dynamically dispatched method call
#[derive(Debug, Clone)]
pub enum Output {
    Flow(AnyFlow),
    Value(Value),
    Undefined,
}

impl Output {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Output::Undefined)
    }

    pub fn as_flow(&self) -> Option<&AnyFlow> {
        match self {
            Output::Flow(flow) => Some(flow),
            _ => None,
        }
    }

    pub fn into_flow<T: FlowKind>(self) -> Option<Flow<T>> {
        match self {
            Output::Flow(flow) => flow.downcast(),
            _ => None,
        }
    }

    /// Calls `name` on a flow result. Bare values and `Undefined` have no
    /// methods, so the chain ends in `Undefined`.
    pub fn call(&self, name: &str, args: &[Value]) -> Output {
        match self {
            Output::Flow(flow) => flow.call(name, args),
            Output::Value(_) | Output::Undefined => Output::Undefined,
        }
    }

    /// Payload of the result; `None` for `Undefined`
    pub fn value(&self) -> Option<Value> {
        match self {
            Output::Flow(flow) => Some(flow.to_value()),
            Output::Value(value) => Some(value.clone()),
            Output::Undefined => None,
        }
    }
}

impl Inspect for Output {
    fn flow_error(&self) -> Option<&FlowError> {
        self.as_flow().and_then(Inspect::flow_error)
    }
}

impl<T: FlowKind> From<Flow<T>> for Output {
    fn from(flow: Flow<T>) -> Self {
        Output::Flow(T::wrap(flow))
    }
}

impl From<AnyFlow> for Output {
    fn from(flow: AnyFlow) -> Self {
        Output::Flow(flow)
    }
}

impl From<ErrorHandle> for Output {
    fn from(handle: ErrorHandle) -> Self {
        Output::Flow(AnyFlow::Error(handle))
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Output::Value(value)
    }
}

impl From<Option<Value>> for Output {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Output::Undefined, Output::Value)
    }
}
