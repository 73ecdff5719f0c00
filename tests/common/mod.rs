#![allow(dead_code)]

use async_trait::async_trait;
use drugscout::error::{Result, ScoutError};
use drugscout::mcp::transport::{McpTransport, CODE_METHOD_NOT_FOUND};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// What the session did to the transport, for assertions.
#[derive(Debug, Default)]
pub struct TransportLog {
    pub opens: usize,
    pub closes: usize,
    pub requests: Vec<String>,
    pub notifications: Vec<String>,
}

/// Scripted in-memory transport. Replies are queued per method; unscripted
/// methods answer JSON-RPC "method not found" so capability listings
/// degrade the way a minimal server would make them.
pub struct FakeTransport {
    log: Arc<Mutex<TransportLog>>,
    replies: HashMap<String, VecDeque<Result<Value>>>,
    fail_open: Option<ScoutError>,
    hang_on: Option<String>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(TransportLog::default())),
            replies: HashMap::new(),
            fail_open: None,
            hang_on: None,
        }
    }

    /// Standard handshake reply advertising all three capabilities.
    pub fn with_handshake(self) -> Self {
        self.reply("initialize", handshake())
    }

    pub fn reply(mut self, method: &str, value: Value) -> Self {
        self.replies
            .entry(method.to_string())
            .or_default()
            .push_back(Ok(value));
        self
    }

    pub fn fail(mut self, method: &str, error: ScoutError) -> Self {
        self.replies
            .entry(method.to_string())
            .or_default()
            .push_back(Err(error));
        self
    }

    pub fn fail_open(mut self, error: ScoutError) -> Self {
        self.fail_open = Some(error);
        self
    }

    /// Never answer this method; the request stays pending forever.
    pub fn hang_on(mut self, method: &str) -> Self {
        self.hang_on = Some(method.to_string());
        self
    }

    pub fn log_handle(&self) -> Arc<Mutex<TransportLog>> {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl McpTransport for FakeTransport {
    async fn open(&mut self) -> Result<()> {
        self.log.lock().unwrap().opens += 1;
        match self.fail_open.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn request(&mut self, method: &str, _params: Value) -> Result<Value> {
        if self.hang_on.as_deref() == Some(method) {
            futures::future::pending::<()>().await;
        }
        self.log.lock().unwrap().requests.push(method.to_string());
        match self.replies.get_mut(method).and_then(VecDeque::pop_front) {
            Some(reply) => reply,
            None => Err(ScoutError::Rpc {
                code: CODE_METHOD_NOT_FOUND,
                message: format!("method not found: {}", method),
            }),
        }
    }

    async fn notify(&mut self, method: &str, _params: Value) -> Result<()> {
        self.log.lock().unwrap().notifications.push(method.to_string());
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub fn handshake() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "serverInfo": { "name": "fake-fda", "version": "1.0.0" },
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": {},
            "prompts": {},
        },
    })
}

/// Handshake advertising no capability groups at all.
pub fn bare_handshake() -> Value {
    json!({
        "protocolVersion": "2024-11-05",
        "serverInfo": { "name": "bare-server", "version": "0.1.0" },
        "capabilities": {},
    })
}

pub fn fda_tool_list() -> Value {
    json!({
        "tools": [
            {
                "name": "search_drug_labels",
                "description": "Search FDA drug label records",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "search": { "type": "string", "description": "Search expression" },
                        "limit": { "type": "integer", "description": "Max records" },
                    },
                    "required": ["search"],
                },
            },
            {
                "name": "get_drug_warnings",
                "description": "Warnings section for a drug",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "drug_name": { "type": "string" },
                        "limit": { "type": "integer" },
                    },
                    "required": ["drug_name"],
                },
            },
        ],
    })
}

pub fn canned_label_result(text: &str) -> Value {
    json!({
        "content": [ { "type": "text", "text": text } ],
    })
}
