//! Incremental Server-Sent Events decoding for streamed completions.
//!
//! Bytes arrive in arbitrary chunks; events are separated by a blank line.
//! The decoder buffers raw bytes so a multi-byte character split across two
//! chunks is decoded intact. An event that grows past [`MAX_EVENT_BYTES`]
//! without a terminating blank line is a decode error.

use oxigate_core::{GatewayError, Result};

/// Upper bound on one buffered, unterminated event.
pub const MAX_EVENT_BYTES: usize = 4 * 1024 * 1024;

/// One decoded SSE event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SseEvent {
    /// The joined `data:` payload of an event.
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Splits an SSE byte stream into events.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Offset up to which `buffer` is known to hold no blank line.
    scanned: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of bytes; returns every event completed by it, in order.
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>> {
        self.buffer.extend(bytes.iter().filter(|b| **b != b'\r'));

        let mut events = Vec::new();
        while let Some(end) = find_blank_line(&self.buffer, self.scanned) {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            self.scanned = 0;
            if let Some(event) = parse_event(&raw[..end]) {
                events.push(event);
            }
        }
        // the last byte may be the first half of a blank line
        self.scanned = self.buffer.len().saturating_sub(1);

        if self.buffer.len() > MAX_EVENT_BYTES {
            let size = self.buffer.len();
            self.buffer.clear();
            self.scanned = 0;
            return Err(GatewayError::Decode(format!(
                "stream event exceeds {MAX_EVENT_BYTES} bytes ({size} buffered)"
            )));
        }
        Ok(events)
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let raw = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        parse_event(&raw)
    }
}

fn find_blank_line(buffer: &[u8], from: usize) -> Option<usize> {
    buffer
        .get(from..)?
        .windows(2)
        .position(|w| w == b"\n\n")
        .map(|pos| pos + from)
}

/// Parse one event block. Comments, `event:`/`id:` lines and keep-alives
/// produce nothing.
fn parse_event(raw: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(raw);
    let mut data: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data.is_empty() {
        return None;
    }

    let payload = data.join("\n");
    if payload.trim() == "[DONE]" {
        Some(SseEvent::Done)
    } else if payload.trim().is_empty() {
        None
    } else {
        Some(SseEvent::Data(payload))
    }
}
