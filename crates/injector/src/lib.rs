//! Harness side of pagelog.
//!
//! Ships the browser rendition of the log interceptor as an embedded script,
//! injects it into HTML responses passing through a proxy, retrieves the
//! capture buffer from a live page over the Chrome DevTools Protocol and
//! turns a retrieved buffer into validation results.

mod cdp;
mod html;
mod validator;

pub use cdp::CdpClient;
pub use html::{HtmlInjector, InjectorConfig, ResponseMeta, script_tag};
pub use validator::{ConsoleValidator, ResultLevel, ValidationResult};

/// The embedded interceptor script.
pub const ERROR_DETECTION_JS: &str = include_str!("error_detection.js");

/// Errors for harness operations.
#[derive(Debug, thiserror::Error)]
pub enum InjectorError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("JS exception: {0}")]
    Exception(String),

    #[error("timeout: {0}")]
    Timeout(String),
}
