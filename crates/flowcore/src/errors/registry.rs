use super::FlowError;
use crate::FlowContext;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Append-only log of every error record produced through a context.
///
/// Clones share the same log. The process-wide instance lives in the
/// default context; tests should build their own.
#[derive(Clone, Default)]
pub struct ErrorRegistry {
    errors: Arc<RwLock<Vec<Arc<FlowError>>>>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of the process-wide default context
    pub fn global() -> Self {
        FlowContext::global().registry().clone()
    }

    pub fn add(&self, error: impl Into<Arc<FlowError>>) {
        let error = error.into();
        tracing::debug!(
            code = %error.code(),
            trace_id = %error.trace_id(),
            expected = %error.expected(),
            "Registering flow error"
        );
        self.errors.write().push(error);
    }

    /// Snapshot of the records registered so far, oldest first
    pub fn view(&self) -> Vec<Arc<FlowError>> {
        self.errors.read().clone()
    }

    pub fn clear(&self) {
        let mut errors = self.errors.write();
        tracing::debug!("Clearing {} flow errors", errors.len());
        errors.clear();
    }

    pub fn len(&self) -> usize {
        self.errors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.read().is_empty()
    }

    pub fn latest(&self) -> Option<Arc<FlowError>> {
        self.errors.read().last().cloned()
    }

    pub fn find_by_trace_id(&self, trace_id: &str) -> Option<Arc<FlowError>> {
        self.errors
            .read()
            .iter()
            .find(|error| error.trace_id() == trace_id)
            .cloned()
    }
}

impl fmt::Debug for ErrorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRegistry")
            .field("len", &self.len())
            .finish()
    }
}
