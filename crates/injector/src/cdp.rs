//! Chrome DevTools Protocol client for installing the interceptor into a
//! live page and reading its capture buffer back.

use futures_util::{SinkExt, StreamExt};
use pagelog_protocol::CaptureSnapshot;
use pagelog_protocol::constants::{CDP_HANDSHAKE_TIMEOUT, CDP_READ_TIMEOUT, RETRIEVE_EXPRESSION};
use serde::{Deserialize, Serialize};
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use crate::{ERROR_DETECTION_JS, InjectorError};

/// CDP message sent to the browser.
#[derive(Serialize)]
struct CdpRequest<'a> {
    id: i32,
    method: &'a str,
    params: serde_json::Value,
}

/// CDP response from the browser.
#[derive(Deserialize)]
struct CdpResponse {
    id: Option<i32>,
    result: Option<serde_json::Value>,
    error: Option<CdpErrorBody>,
}

#[derive(Deserialize)]
struct CdpErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// `Runtime.evaluate` result.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvalResult {
    result: EvalValue,
    exception_details: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct EvalValue {
    #[serde(default)]
    value: serde_json::Value,
}

/// CDP client bound to one page's WebSocket debugger URL.
///
/// Each operation opens its own connection and closes it when done.
pub struct CdpClient {
    ws_url: String,
}

impl CdpClient {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Registers the interceptor script to run before any page script on
    /// every new document. Returns the script identifier.
    pub async fn install_on_new_document(&self) -> Result<String, InjectorError> {
        let result = self
            .command(
                "Page.addScriptToEvaluateOnNewDocument",
                serde_json::json!({ "source": ERROR_DETECTION_JS }),
            )
            .await?;

        let identifier = result
            .get("identifier")
            .and_then(|v| v.as_str())
            .ok_or_else(|| InjectorError::Cdp(format!("missing script identifier in {result}")))?;
        tracing::info!(identifier, "interceptor registered for new documents");
        Ok(identifier.to_string())
    }

    /// Runs the interceptor script in the current document.
    ///
    /// Safe to repeat: the script's guard makes later runs no-ops.
    pub async fn inject_now(&self) -> Result<(), InjectorError> {
        self.evaluate(ERROR_DETECTION_JS).await?;
        Ok(())
    }

    /// Reads the page's capture buffer.
    ///
    /// A page without a buffer reads as empty.
    pub async fn fetch_logs(&self) -> Result<CaptureSnapshot, InjectorError> {
        let value = self.evaluate(RETRIEVE_EXPRESSION).await?;
        Ok(decode_logs(value))
    }

    /// Evaluates a JavaScript expression via `Runtime.evaluate`.
    ///
    /// Returns the raw JSON value of the evaluation result.
    pub async fn evaluate(&self, js_expr: &str) -> Result<serde_json::Value, InjectorError> {
        let result = self
            .command(
                "Runtime.evaluate",
                serde_json::json!({
                    "expression": js_expr,
                    "returnByValue": true,
                    "awaitPromise": true,
                }),
            )
            .await?;
        eval_value(result)
    }

    /// Sends one command and waits for the response with the same id.
    async fn command(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, InjectorError> {
        const REQUEST_ID: i32 = 1;

        let (mut ws, _) = tokio::time::timeout(
            CDP_HANDSHAKE_TIMEOUT,
            tokio_tungstenite::connect_async(self.ws_url.as_str()),
        )
        .await
        .map_err(|_| InjectorError::Timeout("CDP WebSocket handshake".into()))?
        .map_err(|e| InjectorError::Cdp(format!("failed to connect to CDP WebSocket: {e}")))?;

        let json = build_request(REQUEST_ID, method, params)?;
        ws.send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| InjectorError::Cdp(format!("failed to send CDP message: {e}")))?;

        tracing::debug!(method, "CDP command sent");

        loop {
            let frame = tokio::time::timeout(CDP_READ_TIMEOUT, ws.next())
                .await
                .map_err(|_| InjectorError::Timeout("CDP response read".into()))?
                .ok_or_else(|| InjectorError::Cdp("CDP WebSocket closed unexpectedly".into()))?
                .map_err(|e| InjectorError::Cdp(format!("failed to read CDP response: {e}")))?;

            let text = match frame {
                WsMessage::Text(t) => t,
                _ => continue,
            };

            if let Some(result) = parse_response(&text, REQUEST_ID) {
                let _ = ws.close(None).await;
                return result;
            }
        }
    }
}

fn build_request(
    id: i32,
    method: &str,
    params: serde_json::Value,
) -> Result<String, InjectorError> {
    Ok(serde_json::to_string(&CdpRequest { id, method, params })?)
}

/// Matches a frame against the pending request.
///
/// Returns `None` for events and responses to other requests.
fn parse_response(text: &str, id: i32) -> Option<Result<serde_json::Value, InjectorError>> {
    let resp: CdpResponse = serde_json::from_str(text).ok()?;
    if resp.id != Some(id) {
        return None;
    }
    if let Some(err) = resp.error {
        return Some(Err(InjectorError::Cdp(format!(
            "{} (code {})",
            err.message, err.code
        ))));
    }
    Some(
        resp.result
            .ok_or_else(|| InjectorError::Cdp("CDP response missing result".into())),
    )
}

/// Extracts the value of a `Runtime.evaluate` result.
fn eval_value(result: serde_json::Value) -> Result<serde_json::Value, InjectorError> {
    let eval: EvalResult = serde_json::from_value(result)?;
    if let Some(exception) = eval.exception_details {
        return Err(InjectorError::Exception(exception.to_string()));
    }
    Ok(eval.result.value)
}

/// Decodes a retrieved capture buffer; anything unreadable is empty.
fn decode_logs(value: serde_json::Value) -> CaptureSnapshot {
    if value.is_null() {
        tracing::warn!("no capture buffer in page");
        return CaptureSnapshot::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable capture buffer in page");
        CaptureSnapshot::default()
    })
}
