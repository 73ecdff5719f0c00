use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use serde_json::{json, Value};

pub const JSONRPC_VERSION: &str = "2.0";
/// JSON-RPC "method not found"; treated as capability absence, not failure.
pub const CODE_METHOD_NOT_FOUND: i64 = -32601;

/// One connection to an MCP server. The session only ever talks through this
/// trait, so tests can substitute a scripted fake.
#[async_trait]
pub trait McpTransport: Send {
    /// Establish the underlying connection. For SSE this opens the event
    /// stream and waits for the endpoint announcement; streamable HTTP has
    /// nothing to do before the first POST.
    async fn open(&mut self) -> Result<()>;

    /// Send one request and await its reply envelope's `result`.
    async fn request(&mut self, method: &str, params: Value) -> Result<Value>;

    /// Send a notification (no id, no reply expected).
    async fn notify(&mut self, method: &str, params: Value) -> Result<()>;

    /// Release the connection. Must tolerate being called more than once.
    async fn close(&mut self) -> Result<()>;
}

pub fn request_envelope(id: u64, method: &str, params: &Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "method": method,
        "params": params,
    })
}

pub fn notification_envelope(method: &str, params: &Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "method": method,
        "params": params,
    })
}

/// Whether a reply envelope answers the request with the given id.
pub fn matches_id(envelope: &Value, id: u64) -> bool {
    envelope.get("id") == Some(&json!(id))
}

/// Pull `result` out of a reply envelope, or surface its `error` member.
pub fn decode_reply(envelope: Value) -> Result<Value> {
    if let Some(error) = envelope.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unspecified error")
            .to_string();
        return Err(ScoutError::Rpc { code, message });
    }
    match envelope.get("result") {
        Some(result) => Ok(result.clone()),
        None => Err(ScoutError::Protocol(
            "reply envelope has neither result nor error".to_string(),
        )),
    }
}
