use crate::errors::{ErrorHandle, ErrorRegistry, ErrorTemplate, FlowError};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Source of `timestamp` values for error records
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Source of correlation ids for error records
pub trait TraceIdSource: Send + Sync {
    fn next_trace_id(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTraceIds;

impl TraceIdSource for UuidTraceIds {
    fn next_trace_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<F> TraceIdSource for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_trace_id(&self) -> String {
        self()
    }
}

/// Configuration for a flow context
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Capture a backtrace into `stack` when a validation fails.
    /// Honours `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
    pub capture_stack: bool,
    /// Code for records created without one; defaults to the tag's code
    pub default_code: Option<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            capture_stack: true,
            default_code: None,
        }
    }
}

static GLOBAL: Lazy<FlowContext> = Lazy::new(FlowContext::new);

/// Everything a flow needs from its environment: where errors are logged,
/// where time and trace ids come from, and how records are stamped.
///
/// Every flow keeps the context it was built with and hands it to the
/// flows it derives, so a whole chain reports into one registry.
#[derive(Clone)]
pub struct FlowContext {
    registry: ErrorRegistry,
    clock: Arc<dyn Clock>,
    trace_ids: Arc<dyn TraceIdSource>,
    config: Arc<FlowConfig>,
}

impl FlowContext {
    /// Create a new context with its own registry and default settings
    pub fn new() -> Self {
        Self::with_config(FlowConfig::default())
    }

    pub fn with_config(config: FlowConfig) -> Self {
        Self {
            registry: ErrorRegistry::new(),
            clock: Arc::new(SystemClock),
            trace_ids: Arc::new(UuidTraceIds),
            config: Arc::new(config),
        }
    }

    /// The process-wide context used by the free factory functions
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn with_registry(mut self, registry: ErrorRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_trace_ids(mut self, trace_ids: impl TraceIdSource + 'static) -> Self {
        self.trace_ids = Arc::new(trace_ids);
        self
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn next_trace_id(&self) -> String {
        self.trace_ids.next_trace_id()
    }

    /// Stamp `template` with whatever it is missing, register the record and
    /// return a handle to it
    pub fn error_flow(&self, template: ErrorTemplate) -> ErrorHandle {
        let timestamp = template.timestamp.unwrap_or_else(|| self.now());
        let trace_id = template
            .trace_id
            .clone()
            .unwrap_or_else(|| self.next_trace_id());
        let code = template
            .code
            .clone()
            .or_else(|| self.config.default_code.clone())
            .unwrap_or_else(|| template.expected.error_code().to_string());

        let record = Arc::new(FlowError::from_template(template, timestamp, trace_id, code));
        self.registry.add(Arc::clone(&record));
        ErrorHandle::new(record)
    }

    pub(crate) fn capture_stack(&self) -> Option<String> {
        if !self.config.capture_stack {
            return None;
        }
        let backtrace = Backtrace::capture();
        match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        }
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlowContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowContext")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
