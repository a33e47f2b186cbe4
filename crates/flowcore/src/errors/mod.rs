// crates/flowcore/src/errors/mod.rs

mod handle;
mod record;
mod registry;

pub use handle::{is_error, ErrorHandle, Inspect};
pub use record::{ErrorTemplate, FlowError};
pub use registry::ErrorRegistry;

/// Machine-readable codes produced by the core itself
pub mod codes {
    pub const UNKNOWN_METHOD: &str = "UNKNOWN_METHOD";
    pub const METHOD_CALL_ERROR: &str = "METHOD_CALL_ERROR";
    pub const INVALID_FLOW_TYPE: &str = "INVALID_FLOW_TYPE";
}
