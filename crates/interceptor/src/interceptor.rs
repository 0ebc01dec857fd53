//! Injection: idempotency guard, buffer initialization and hook installation.

use std::sync::Arc;

use pagelog_protocol::{CaptureSnapshot, ConsoleMethod, NAMESPACE};

use crate::buffer::{self, CaptureBuffer};
use crate::config::InterceptorConfig;
use crate::context::{ConsoleSink, ErrorHandler, Global, PageContext};
use crate::hooks::{CapturingErrorHandler, CapturingSink};
use crate::registry::CaptureRegistry;

/// Result of an injection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectOutcome {
    /// Buffer created and hooks installed.
    Installed,
    /// The namespace was already populated; nothing was changed.
    AlreadyInjected,
}

/// Installs the capture buffer and hooks into page contexts.
pub struct Interceptor {
    config: InterceptorConfig,
    registry: Arc<CaptureRegistry>,
}

impl Interceptor {
    /// Creates an interceptor registering buffers in the process-wide registry.
    pub fn new(config: InterceptorConfig) -> Self {
        Self::with_registry(config, CaptureRegistry::global())
    }

    /// Creates an interceptor registering buffers in `registry`.
    pub fn with_registry(config: InterceptorConfig, registry: Arc<CaptureRegistry>) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CaptureRegistry> {
        &self.registry
    }

    /// Injects the interceptor into a page context.
    ///
    /// A no-op when the reserved namespace already holds anything, including
    /// a value this interceptor did not put there. Never fails.
    pub fn inject(&self, ctx: &PageContext) -> InjectOutcome {
        let buffer = CaptureBuffer::shared();
        if !ctx.claim_global(NAMESPACE, Global::Capture(Arc::clone(&buffer))) {
            tracing::debug!(context = %ctx.id(), "namespace already populated, skipping injection");
            return InjectOutcome::AlreadyInjected;
        }
        self.registry.register(ctx.id(), &buffer);

        let policy = self.config.empty_error_policy;
        let error_buffer = Arc::clone(&buffer);
        ctx.decorate_error_handler(|previous| -> Arc<dyn ErrorHandler> {
            CapturingErrorHandler::wrap(previous, error_buffer, policy)
        });

        for method in ConsoleMethod::ALL {
            let console_buffer = Arc::clone(&buffer);
            ctx.decorate_console(method, |original| -> Arc<dyn ConsoleSink> {
                CapturingSink::wrap(method, original, console_buffer, &self.config)
            });
        }

        tracing::info!(
            context = %ctx.id(),
            delegation = ?self.config.delegation,
            "log interceptor installed"
        );
        InjectOutcome::Installed
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new(InterceptorConfig::default())
    }
}

/// Reads a context's capture buffer the way a harness would.
///
/// A foreign value in the namespace is decoded leniently; anything that is
/// not a buffer layout reads as empty.
pub fn read_logs(ctx: &PageContext) -> CaptureSnapshot {
    match ctx.global(NAMESPACE) {
        Some(Global::Capture(buf)) => buffer::lock(&buf).snapshot(),
        Some(Global::Value(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(context = %ctx.id(), error = %e, "unreadable capture namespace");
            CaptureSnapshot::default()
        }),
        None => {
            tracing::warn!(context = %ctx.id(), "no capture namespace in context");
            CaptureSnapshot::default()
        }
    }
}
