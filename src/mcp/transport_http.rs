use crate::config::TransportConfig;
use crate::error::{Result, ScoutError};
use crate::mcp::sse::SseParser;
use crate::mcp::transport::{
    decode_reply, matches_id, notification_envelope, request_envelope, McpTransport,
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

const SESSION_ID_HEADER: &str = "mcp-session-id";

/// Streamable HTTP transport: every protocol message is POSTed to a single
/// endpoint, and the reply body is either a plain JSON envelope or an
/// SSE-framed stream of envelopes.
pub struct StreamableHttpTransport {
    client: Client,
    url: Url,
    read_timeout: Duration,
    session_id: Option<String>,
    next_id: u64,
}

impl StreamableHttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(build_headers(&config.headers)?)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            read_timeout: config.read_timeout,
            session_id: None,
            next_id: 1,
        })
    }

    async fn post_envelope(&self, envelope: &Value) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .post(self.url.clone())
            .header(ACCEPT, "application/json, text/event-stream")
            .header(CONTENT_TYPE, "application/json")
            .json(envelope);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_ID_HEADER, session_id);
        }

        let response = timeout(self.read_timeout, request.send())
            .await
            .map_err(|_| {
                ScoutError::Timeout(format!(
                    "no response from {} within {}s",
                    self.url,
                    self.read_timeout.as_secs()
                ))
            })?
            .map_err(|e| ScoutError::Connection(format!("request to {} failed: {}", self.url, e)))?;

        check_status(&response.status(), &self.url)?;
        Ok(response)
    }

    /// Scan an SSE-framed reply body until the envelope answering `id` shows
    /// up. Servers may interleave notifications; those are skipped.
    async fn read_sse_reply(&self, response: reqwest::Response, id: u64) -> Result<Value> {
        let mut stream = response.bytes_stream();
        let mut parser = SseParser::new();

        loop {
            let chunk = timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| {
                    ScoutError::Timeout(format!(
                        "reply stream stalled for {}s",
                        self.read_timeout.as_secs()
                    ))
                })?;

            let chunk = match chunk {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Err(ScoutError::Connection(format!("reply stream failed: {}", e)))
                }
                None => {
                    return Err(ScoutError::Protocol(
                        "reply stream ended without an answer".to_string(),
                    ))
                }
            };

            for event in parser.push(&chunk) {
                if event.event != "message" {
                    continue;
                }
                let envelope: Value = serde_json::from_str(&event.data)?;
                if matches_id(&envelope, id) {
                    return decode_reply(envelope);
                }
            }
        }
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn open(&mut self) -> Result<()> {
        // The handshake is the first POST; there is no separate connect step.
        Ok(())
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        let envelope = request_envelope(id, method, &params);
        let response = self.post_envelope(&envelope).await?;

        // The server assigns the session on initialize and expects it echoed
        // from then on.
        if self.session_id.is_none() {
            if let Some(session_id) = response
                .headers()
                .get(SESSION_ID_HEADER)
                .and_then(|v| v.to_str().ok())
            {
                self.session_id = Some(session_id.to_string());
            }
        }

        let sse_reply = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|s| s.contains("text/event-stream"));

        if sse_reply {
            self.read_sse_reply(response, id).await
        } else {
            let envelope: Value = timeout(self.read_timeout, response.json())
                .await
                .map_err(|_| {
                    ScoutError::Timeout(format!(
                        "reply body not received within {}s",
                        self.read_timeout.as_secs()
                    ))
                })?
                .map_err(|e| ScoutError::Connection(format!("reading reply failed: {}", e)))?;
            if !matches_id(&envelope, id) {
                return Err(ScoutError::Protocol(format!(
                    "reply id does not match request id {}",
                    id
                )));
            }
            decode_reply(envelope)
        }
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        let envelope = notification_envelope(method, &params);
        let _ = self.post_envelope(&envelope).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // Best effort: tell the server to drop the session.
        if let Some(session_id) = self.session_id.take() {
            let _ = timeout(
                Duration::from_secs(5),
                self.client
                    .delete(self.url.clone())
                    .header(SESSION_ID_HEADER, &session_id)
                    .send(),
            )
            .await;
        }
        Ok(())
    }
}

pub(crate) fn build_headers(headers: &std::collections::HashMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| ScoutError::Config(format!("invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScoutError::Config(format!("invalid value for header '{}': {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

pub(crate) fn check_status(status: &StatusCode, url: &Url) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    match *status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ScoutError::Auth(format!(
            "{} answered HTTP {}; check the auth key and usercode",
            url, status
        ))),
        _ => Err(ScoutError::Connection(format!(
            "{} answered HTTP {}",
            url, status
        ))),
    }
}
