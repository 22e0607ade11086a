use serde_json::Value;

/// Normalized event extracted from a chat-completion SSE stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatStreamEvent {
    Delta { content: String },
    Done,
    Error { message: String },
}

/// Incremental parser for SSE text streams.
///
/// Input must already be decoded text; multi-byte boundaries are the caller's
/// concern. Frames may be split across any number of `feed` calls.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: String,
}

impl SseStreamParser {
    /// Feed decoded text into the parser and drain complete events.
    pub fn feed(&mut self, text: &str) -> Vec<ChatStreamEvent> {
        self.buffer.push_str(text);
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        let mut events = Vec::new();
        while let Some(split) = self.buffer.find("\n\n") {
            let frame = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 2);
            events.extend(parse_frame(&frame));
        }

        events
    }

    /// Drain a trailing frame that was never terminated by a blank line.
    pub fn finish(&mut self) -> Vec<ChatStreamEvent> {
        let frame = std::mem::take(&mut self.buffer);
        parse_frame(frame.trim_end_matches('\n')).into_iter().collect()
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<ChatStreamEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input);
        events.extend(parser.finish());
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn parse_frame(frame: &str) -> Option<ChatStreamEvent> {
    let payload = extract_data_payload(frame)?;
    if payload == "[DONE]" {
        return Some(ChatStreamEvent::Done);
    }

    match serde_json::from_str::<Value>(&payload) {
        Ok(value) => map_event(&value),
        Err(error) => {
            tracing::debug!(%error, "skipping unparseable SSE data payload");
            None
        }
    }
}

fn extract_data_payload(frame: &str) -> Option<String> {
    let data_lines: Vec<&str> = frame
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect();

    if data_lines.is_empty() {
        None
    } else {
        Some(data_lines.join("\n"))
    }
}

fn map_event(value: &Value) -> Option<ChatStreamEvent> {
    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .map(ToString::to_string)
            .unwrap_or_else(|| error.to_string());
        return Some(ChatStreamEvent::Error { message });
    }

    let content = value
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("delta"))
        .and_then(|delta| delta.get("content"))
        .and_then(Value::as_str)
        .unwrap_or("");

    // Role-only and finish_reason frames carry no text.
    if content.is_empty() {
        None
    } else {
        Some(ChatStreamEvent::Delta {
            content: content.to_owned(),
        })
    }
}
