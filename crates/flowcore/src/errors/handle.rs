use super::FlowError;
use crate::{Tagged, TypeTag, Value};
use std::sync::Arc;

/// Handle to a registered error record.
///
/// `get` yields the offending input rather than a payload, `get_error` the
/// full record. Cloning shares the record.
#[derive(Debug, Clone)]
pub struct ErrorHandle {
    record: Arc<FlowError>,
}

impl ErrorHandle {
    pub(crate) fn new(record: Arc<FlowError>) -> Self {
        Self { record }
    }

    pub fn get(&self) -> &Value {
        self.record.value()
    }

    pub fn get_error(&self) -> &FlowError {
        &self.record
    }

    pub fn record(&self) -> Arc<FlowError> {
        Arc::clone(&self.record)
    }

    /// Whether both handles carry the very same record
    pub fn same_record(&self, other: &ErrorHandle) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }
}

impl Tagged for ErrorHandle {
    fn tag(&self) -> TypeTag {
        TypeTag::Error
    }
}

/// Structural access to the error side of anything flow-shaped
pub trait Inspect {
    fn flow_error(&self) -> Option<&FlowError>;
}

/// Whether `candidate` is in the error state. Never panics.
pub fn is_error<I: Inspect + ?Sized>(candidate: &I) -> bool {
    candidate.flow_error().is_some()
}

impl Inspect for ErrorHandle {
    fn flow_error(&self) -> Option<&FlowError> {
        Some(&self.record)
    }
}

impl Inspect for Value {
    fn flow_error(&self) -> Option<&FlowError> {
        None
    }
}

impl<I: Inspect> Inspect for Option<I> {
    fn flow_error(&self) -> Option<&FlowError> {
        self.as_ref().and_then(Inspect::flow_error)
    }
}

impl<R> Inspect for Result<R, ErrorHandle> {
    fn flow_error(&self) -> Option<&FlowError> {
        self.as_ref().err().map(ErrorHandle::get_error)
    }
}
