use std::time::Duration;

/// Reserved property on the page's global context holding the capture buffer.
pub const NAMESPACE: &str = "__pagelog_logs";

/// JavaScript expression that reads the capture buffer from a live page.
pub const RETRIEVE_EXPRESSION: &str = "window.__pagelog_logs";

/// Separator between the parts of an uncaught error entry.
pub const ERROR_PART_SEPARATOR: &str = " - ";

/// Separator between formatted console arguments.
pub const ARG_SEPARATOR: &str = " ";

/// Timeout for the DevTools WebSocket handshake.
pub const CDP_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Read timeout for each DevTools WebSocket message.
pub const CDP_READ_TIMEOUT: Duration = Duration::from_secs(10);
