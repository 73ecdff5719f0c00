/// Incremental parser for `text/event-stream` bodies. Chunks arrive at
/// arbitrary boundaries, including mid-character; events are dispatched on
/// the blank line.
#[derive(Debug, Default)]
pub struct SseParser {
    // Raw bytes; a chunk boundary may fall inside a multi-byte character,
    // so decoding happens per completed line, never per chunk.
    buffer: Vec<u8>,
    event: String,
    data: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of bytes, returning every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            line_bytes.pop();
            if line_bytes.last() == Some(&b'\r') {
                line_bytes.pop();
            }
            let line = String::from_utf8_lossy(&line_bytes);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.find(':') {
                Some(colon_pos) => {
                    let rest = &line[colon_pos + 1..];
                    (
                        &line[..colon_pos],
                        rest.strip_prefix(' ').unwrap_or(rest).to_string(),
                    )
                }
                None => (line.as_ref(), String::new()),
            };

            match field {
                "event" => self.event = value,
                "data" => self.data.push(value),
                // id and retry are irrelevant to a request/reply client
                _ => {}
            }
        }

        events
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() && self.event.is_empty() {
            return None;
        }
        let event = SseEvent {
            event: if self.event.is_empty() {
                "message".to_string()
            } else {
                std::mem::take(&mut self.event)
            },
            data: self.data.join("\n"),
        };
        self.event.clear();
        self.data.clear();
        Some(event)
    }
}
