//! Capturing decorators installed over the console methods and the
//! uncaught-error handler.

use std::sync::Arc;

use pagelog_protocol::{Channel, ConsoleMethod};

use crate::buffer::{self, SharedBuffer};
use crate::config::{DelegationMode, EmptyErrorPolicy, InterceptorConfig};
use crate::context::{ConsoleSink, ErrorEvent, ErrorHandler};
use crate::format::{ArgValue, format_arg, format_console_args, format_error_entry};

/// Console decorator: records each call into its channel, then delegates.
pub(crate) struct CapturingSink {
    method: ConsoleMethod,
    original: Arc<dyn ConsoleSink>,
    buffer: SharedBuffer,
    delegation: DelegationMode,
    max_reentry_depth: usize,
    placeholder: String,
}

impl CapturingSink {
    /// Wraps `original`, keeping it for delegation.
    pub(crate) fn wrap(
        method: ConsoleMethod,
        original: Arc<dyn ConsoleSink>,
        buffer: SharedBuffer,
        config: &InterceptorConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            method,
            original,
            buffer,
            delegation: config.delegation,
            max_reentry_depth: config.max_reentry_depth,
            placeholder: config.unserializable_placeholder.clone(),
        })
    }

    fn channel(&self) -> Channel {
        self.method.channel()
    }

    /// Captures one pass of a call. `depth` counts re-entries of this call
    /// only, so concurrent callers never share a budget.
    fn call_at(&self, depth: usize, args: &[ArgValue]) {
        let entry = format_console_args(args, &self.placeholder);
        buffer::lock(&self.buffer).push(self.channel(), entry);

        match self.delegation {
            DelegationMode::Original => self.original.call(args),
            DelegationMode::Reentrant => self.reenter(depth, args),
        }
    }

    /// Legacy path: feed the formatted arguments back into this decorator.
    fn reenter(&self, depth: usize, args: &[ArgValue]) {
        let formatted: Vec<ArgValue> = args
            .iter()
            .map(|arg| ArgValue::Text(format_arg(arg, &self.placeholder)))
            .collect();

        if depth < self.max_reentry_depth {
            self.call_at(depth + 1, &formatted);
        } else {
            tracing::warn!(
                method = self.method.as_str(),
                depth,
                "console re-entry bound reached, delegating to original"
            );
            self.original.call(&formatted);
        }
    }
}

impl ConsoleSink for CapturingSink {
    fn call(&self, args: &[ArgValue]) {
        self.call_at(0, args);
    }
}

/// Uncaught-error decorator: records the error, then defers to the handler
/// that was installed before it.
pub(crate) struct CapturingErrorHandler {
    previous: Option<Arc<dyn ErrorHandler>>,
    buffer: SharedBuffer,
    policy: EmptyErrorPolicy,
}

impl CapturingErrorHandler {
    pub(crate) fn wrap(
        previous: Option<Arc<dyn ErrorHandler>>,
        buffer: SharedBuffer,
        policy: EmptyErrorPolicy,
    ) -> Arc<Self> {
        Arc::new(Self {
            previous,
            buffer,
            policy,
        })
    }
}

impl ErrorHandler for CapturingErrorHandler {
    fn handle(&self, event: &ErrorEvent) -> bool {
        let entry = format_error_entry(event, self.policy);
        buffer::lock(&self.buffer).push(Channel::Error, entry);

        // Never suppress default reporting on our own account.
        self.previous
            .as_ref()
            .is_some_and(|previous| previous.handle(event))
    }
}
