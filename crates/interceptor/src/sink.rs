use pagelog_protocol::ConsoleMethod;

use crate::context::ConsoleSink;
use crate::format::{ArgValue, format_console_args};

/// Native console output: routes console calls to `tracing` events.
///
/// `log`/`info` map to INFO, `warn` to WARN and `error` to ERROR, all under
/// the `pagelog::console` target.
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    method: ConsoleMethod,
}

impl TracingSink {
    pub fn new(method: ConsoleMethod) -> Self {
        Self { method }
    }

    pub fn method(&self) -> ConsoleMethod {
        self.method
    }
}

impl ConsoleSink for TracingSink {
    fn call(&self, args: &[ArgValue]) {
        let line = format_console_args(args, "unserializable");
        match self.method {
            ConsoleMethod::Log | ConsoleMethod::Info => {
                tracing::info!(target: "pagelog::console", method = self.method.as_str(), "{line}")
            }
            ConsoleMethod::Warn => tracing::warn!(target: "pagelog::console", "{line}"),
            ConsoleMethod::Error => tracing::error!(target: "pagelog::console", "{line}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_sink_accepts_any_args() {
        for method in ConsoleMethod::ALL {
            let sink = TracingSink::new(method);
            assert_eq!(sink.method(), method);
            sink.call(&[]);
            sink.call(&["text".into(), ArgValue::from(1), ArgValue::Undefined]);
        }
    }
}
