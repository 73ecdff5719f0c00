use crate::config::TransportConfig;
use crate::error::{Result, ScoutError};
use crate::mcp::sse::{SseEvent, SseParser};
use crate::mcp::transport::{
    decode_reply, matches_id, notification_envelope, request_envelope, McpTransport,
};
use crate::mcp::transport_http::{build_headers, check_status};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

/// SSE transport: a long-lived GET delivers server-to-client envelopes while
/// requests go out as POSTs to the endpoint the server announces in its
/// first event.
pub struct SseTransport {
    client: Client,
    url: Url,
    connect_timeout: Duration,
    read_timeout: Duration,
    stream: Option<BoxStream<'static, reqwest::Result<Bytes>>>,
    parser: SseParser,
    post_url: Option<Url>,
    next_id: u64,
}

impl SseTransport {
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let client = Client::builder()
            .default_headers(build_headers(&config.headers)?)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
            stream: None,
            parser: SseParser::new(),
            post_url: None,
            next_id: 1,
        })
    }

    /// Read events off the long-lived stream until `want` says stop, each
    /// chunk bounded by `deadline`.
    async fn next_matching(
        &mut self,
        deadline: Duration,
        mut want: impl FnMut(&SseEvent) -> bool,
    ) -> Result<SseEvent> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| ScoutError::Protocol("event stream is not open".to_string()))?;

        loop {
            let chunk = timeout(deadline, stream.next()).await.map_err(|_| {
                ScoutError::Timeout(format!(
                    "no event received for {}s",
                    deadline.as_secs()
                ))
            })?;

            let chunk = match chunk {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Err(ScoutError::Connection(format!("event stream failed: {}", e)))
                }
                None => {
                    return Err(ScoutError::Connection(
                        "event stream closed by the server".to_string(),
                    ))
                }
            };

            for event in self.parser.push(&chunk) {
                if want(&event) {
                    return Ok(event);
                }
            }
        }
    }

    // &mut keeps the borrow exclusive: a shared borrow held across the await
    // would need the boxed stream to be Sync, and the trait futures are Send.
    async fn post_envelope(&mut self, envelope: &Value) -> Result<()> {
        let post_url = self
            .post_url
            .clone()
            .ok_or_else(|| ScoutError::Protocol("no endpoint announced yet".to_string()))?;

        let response = timeout(
            self.read_timeout,
            self.client
                .post(post_url.clone())
                .header(CONTENT_TYPE, "application/json")
                .json(envelope)
                .send(),
        )
        .await
        .map_err(|_| {
            ScoutError::Timeout(format!(
                "posting to {} took more than {}s",
                post_url,
                self.read_timeout.as_secs()
            ))
        })?
        .map_err(|e| ScoutError::Connection(format!("posting to {} failed: {}", post_url, e)))?;

        check_status(&response.status(), &post_url)
    }
}

#[async_trait]
impl McpTransport for SseTransport {
    async fn open(&mut self) -> Result<()> {
        let response = timeout(
            self.connect_timeout,
            self.client
                .get(self.url.clone())
                .header(ACCEPT, "text/event-stream")
                .send(),
        )
        .await
        .map_err(|_| {
            ScoutError::Timeout(format!(
                "connecting to {} took more than {}s",
                self.url,
                self.connect_timeout.as_secs()
            ))
        })?
        .map_err(|e| ScoutError::Connection(format!("connecting to {} failed: {}", self.url, e)))?;

        check_status(&response.status(), &self.url)?;
        self.stream = Some(response.bytes_stream().boxed());

        // The first event names the URL to POST requests to, usually a
        // relative path carrying the session id.
        let endpoint = self
            .next_matching(self.connect_timeout, |event| event.event == "endpoint")
            .await?;
        let post_url = self.url.join(endpoint.data.trim()).map_err(|e| {
            ScoutError::Protocol(format!(
                "server announced an unusable endpoint '{}': {}",
                endpoint.data, e
            ))
        })?;
        self.post_url = Some(post_url);

        Ok(())
    }

    async fn request(&mut self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id;
        self.next_id += 1;

        self.post_envelope(&request_envelope(id, method, &params)).await?;

        // Replies arrive on the long-lived stream; skip everything that is
        // not the answer to this id.
        let mut reply = None;
        self.next_matching(self.read_timeout, |event| {
            if event.event != "message" {
                return false;
            }
            match serde_json::from_str::<Value>(&event.data) {
                Ok(envelope) if matches_id(&envelope, id) => {
                    reply = Some(envelope);
                    true
                }
                _ => false,
            }
        })
        .await?;

        match reply {
            Some(envelope) => decode_reply(envelope),
            None => Err(ScoutError::Protocol(
                "matched event vanished before decoding".to_string(),
            )),
        }
    }

    async fn notify(&mut self, method: &str, params: Value) -> Result<()> {
        self.post_envelope(&notification_envelope(method, &params)).await
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the stream tears the connection down.
        self.stream = None;
        self.post_url = None;
        Ok(())
    }
}
