use crate::error::{Result, ScoutError};
use reqwest::Url;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Long-lived server-to-client event stream paired with POSTed requests.
    Sse,
    /// Bidirectional JSON-RPC over a single streaming HTTP endpoint.
    StreamableHttp,
}

impl TransportKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sse" | "event-stream" => Ok(TransportKind::Sse),
            "http" | "streamable-http" | "streamablehttp" => Ok(TransportKind::StreamableHttp),
            other => Err(ScoutError::Config(format!(
                "unknown transport kind '{}' (expected 'sse' or 'http')",
                other
            ))),
        }
    }

    /// Handshake deadline used when no override is configured. The SSE
    /// endpoint answers its first event quickly; streamable HTTP servers
    /// get the longer window.
    pub fn default_connect_timeout(self) -> Duration {
        match self {
            TransportKind::Sse => Duration::from_secs(10),
            TransportKind::StreamableHttp => Duration::from_secs(30),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Sse => write!(f, "sse"),
            TransportKind::StreamableHttp => write!(f, "http"),
        }
    }
}

/// Everything needed to reach one MCP server. Validated on construction,
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub url: Url,
    pub headers: HashMap<String, String>,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl TransportConfig {
    pub fn new(
        kind: TransportKind,
        url: &str,
        headers: HashMap<String, String>,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| ScoutError::Config(format!("invalid endpoint URL '{}': {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ScoutError::Config(format!(
                "endpoint URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if connect_timeout.is_zero() {
            return Err(ScoutError::Config(
                "connect timeout must be positive".to_string(),
            ));
        }
        if read_timeout.is_zero() {
            return Err(ScoutError::Config(
                "read timeout must be positive".to_string(),
            ));
        }
        Ok(Self {
            kind,
            url,
            headers,
            connect_timeout,
            read_timeout,
        })
    }
}
