//! Page context model: the global execution context a shim is injected into.
//!
//! The console entry points and the uncaught-error slot are capabilities the
//! host provides. Decorating them swaps the slot's `Arc` while the decorator
//! keeps the previous one.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use pagelog_protocol::ConsoleMethod;

use crate::buffer::SharedBuffer;
use crate::format::ArgValue;
use crate::registry::ContextId;
use crate::sink::TracingSink;

/// A console entry point (`console.log` and friends).
pub trait ConsoleSink: Send + Sync {
    fn call(&self, args: &[ArgValue]);
}

impl<F> ConsoleSink for F
where
    F: Fn(&[ArgValue]) + Send + Sync,
{
    fn call(&self, args: &[ArgValue]) {
        self(args)
    }
}

/// Handler for the global uncaught-error signal.
///
/// Returns `true` if the error was handled and default reporting should be
/// suppressed.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, event: &ErrorEvent) -> bool;
}

impl<F> ErrorHandler for F
where
    F: Fn(&ErrorEvent) -> bool + Send + Sync,
{
    fn handle(&self, event: &ErrorEvent) -> bool {
        self(event)
    }
}

/// Arguments the platform passes to the uncaught-error handler.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub message: String,
    pub source_url: String,
    pub line: u32,
    pub column: u32,
    pub error: Option<ArgValue>,
}

/// A value stored in a global property of the page.
#[derive(Clone)]
pub enum Global {
    /// A capture buffer installed by the interceptor.
    Capture(SharedBuffer),
    /// Any other value a page script put there.
    Value(serde_json::Value),
}

/// The four console slots.
struct Console {
    log: Arc<dyn ConsoleSink>,
    info: Arc<dyn ConsoleSink>,
    warn: Arc<dyn ConsoleSink>,
    error: Arc<dyn ConsoleSink>,
}

impl Console {
    fn slot(&mut self, method: ConsoleMethod) -> &mut Arc<dyn ConsoleSink> {
        match method {
            ConsoleMethod::Log => &mut self.log,
            ConsoleMethod::Info => &mut self.info,
            ConsoleMethod::Warn => &mut self.warn,
            ConsoleMethod::Error => &mut self.error,
        }
    }

    fn get(&self, method: ConsoleMethod) -> Arc<dyn ConsoleSink> {
        let sink = match method {
            ConsoleMethod::Log => &self.log,
            ConsoleMethod::Info => &self.info,
            ConsoleMethod::Warn => &self.warn,
            ConsoleMethod::Error => &self.error,
        };
        Arc::clone(sink)
    }
}

/// A page's global execution context.
///
/// Slots are read by cloning the current `Arc` out of the lock, so a sink
/// may call back into the context without deadlocking.
pub struct PageContext {
    id: ContextId,
    globals: RwLock<HashMap<String, Global>>,
    console: RwLock<Console>,
    on_error: RwLock<Option<Arc<dyn ErrorHandler>>>,
}

impl PageContext {
    /// Creates a context whose console forwards to `tracing`.
    pub fn new() -> Self {
        Self::with_console(|method| -> Arc<dyn ConsoleSink> {
            Arc::new(TracingSink::new(method))
        })
    }

    /// Creates a context with host-provided console sinks.
    pub fn with_console<F>(mut make_sink: F) -> Self
    where
        F: FnMut(ConsoleMethod) -> Arc<dyn ConsoleSink>,
    {
        Self {
            id: ContextId::next(),
            globals: RwLock::new(HashMap::new()),
            console: RwLock::new(Console {
                log: make_sink(ConsoleMethod::Log),
                info: make_sink(ConsoleMethod::Info),
                warn: make_sink(ConsoleMethod::Warn),
                error: make_sink(ConsoleMethod::Error),
            }),
            on_error: RwLock::new(None),
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    // ---------------------------------------------------------------
    // Globals
    // ---------------------------------------------------------------

    /// Whether a global property holds any value.
    pub fn has_global(&self, name: &str) -> bool {
        self.globals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// The value of a global property.
    pub fn global(&self, name: &str) -> Option<Global> {
        self.globals
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Sets a global property to a plain value, as a page script would.
    pub fn set_global(&self, name: &str, value: serde_json::Value) {
        self.globals
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), Global::Value(value));
    }

    /// Stores `value` under `name` only if the property is unset.
    ///
    /// Returns `false` and leaves the context untouched otherwise.
    pub(crate) fn claim_global(&self, name: &str, value: Global) -> bool {
        let mut globals = self.globals.write().unwrap_or_else(PoisonError::into_inner);
        if globals.contains_key(name) {
            return false;
        }
        globals.insert(name.to_owned(), value);
        true
    }

    // ---------------------------------------------------------------
    // Console
    // ---------------------------------------------------------------

    /// The sink currently installed for a console method.
    pub fn console(&self, method: ConsoleMethod) -> Arc<dyn ConsoleSink> {
        self.console
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
    }

    /// Invokes a console method, as page code calling `console.<method>(...)`.
    pub fn console_call(&self, method: ConsoleMethod, args: &[ArgValue]) {
        self.console(method).call(args);
    }

    /// Replaces a console method with a decorator built from the current sink.
    pub fn decorate_console<F>(&self, method: ConsoleMethod, decorate: F)
    where
        F: FnOnce(Arc<dyn ConsoleSink>) -> Arc<dyn ConsoleSink>,
    {
        let mut console = self.console.write().unwrap_or_else(PoisonError::into_inner);
        let slot = console.slot(method);
        let decorated = decorate(Arc::clone(slot));
        *slot = decorated;
    }

    // ---------------------------------------------------------------
    // Uncaught errors
    // ---------------------------------------------------------------

    /// Replaces the uncaught-error handler with one built from the current one.
    pub fn decorate_error_handler<F>(&self, decorate: F)
    where
        F: FnOnce(Option<Arc<dyn ErrorHandler>>) -> Arc<dyn ErrorHandler>,
    {
        let mut slot = self.on_error.write().unwrap_or_else(PoisonError::into_inner);
        let decorated = decorate(slot.take());
        *slot = Some(decorated);
    }

    /// Delivers an uncaught error, as the platform would.
    ///
    /// Returns whether the installed handler marked it handled.
    pub fn report_error(&self, event: &ErrorEvent) -> bool {
        let handler = self
            .on_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match handler {
            Some(handler) => handler.handle(event),
            None => {
                tracing::error!(
                    target: "pagelog::console",
                    url = %event.source_url,
                    line = event.line,
                    column = event.column,
                    "uncaught error: {}",
                    event.message
                );
                false
            }
        }
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self::new()
    }
}
