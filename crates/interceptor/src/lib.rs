//! Page log interceptor.
//!
//! Captures uncaught errors and console output of a page context into an
//! append-only buffer with three channels (`error`, `warning`, `info`) that
//! an external harness reads later. Injection is idempotent: a context whose
//! reserved namespace is already populated is left untouched.
//!
//! Console methods and the uncaught-error slot are modelled as capabilities
//! ([`ConsoleSink`], [`ErrorHandler`]) owned by a [`PageContext`]. Injection
//! decorates them, keeping the original behind the decorator.

mod buffer;
mod config;
mod context;
mod format;
mod hooks;
mod interceptor;
mod registry;
mod sink;

pub use buffer::{CaptureBuffer, SharedBuffer};
pub use config::{DelegationMode, EmptyErrorPolicy, InterceptorConfig};
pub use context::{ConsoleSink, ErrorEvent, ErrorHandler, Global, PageContext};
pub use format::{ArgValue, Serialization, format_arg, format_console_args, format_error_entry};
pub use interceptor::{InjectOutcome, Interceptor, read_logs};
pub use registry::{CaptureRegistry, ContextId};
pub use sink::TracingSink;

pub use pagelog_protocol::{CaptureSnapshot, Channel, ConsoleMethod, NAMESPACE};

/// Errors for interceptor setup operations.
///
/// Capture itself never fails; these only surface from configuration.
#[derive(Debug, thiserror::Error)]
pub enum InterceptorError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(String),
}
