//! Reassembly of a streamed chat completion.
//!
//! Providers in streaming mode answer with server-sent events whose `data:`
//! payloads carry `choices[0].delta.content` fragments. `LineSplitter` cuts
//! raw body bytes into lines; `StreamAssembler` turns those lines into the
//! reply text. Neither touches the network.

use serde_json::Value;

/// Prefix marking a significant line.
pub const DATA_PREFIX: &str = "data: ";

/// Payload marking the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What one line contributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a data line, no delta in the payload, or already done.
    Ignored,
    /// A delta fragment was appended.
    Delta,
    /// The payload was not valid JSON and was dropped.
    Malformed,
    /// The end-of-stream sentinel.
    Done,
}

/// Accumulates delta fragments from data lines, in arrival order.
#[derive(Debug, Default)]
pub struct StreamAssembler {
    text: String,
    done: bool,
    malformed: usize,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line.
    pub fn push_line(&mut self, line: &str) -> LineOutcome {
        if self.done {
            return LineOutcome::Ignored;
        }

        let Some(payload) = line.trim().strip_prefix(DATA_PREFIX) else {
            return LineOutcome::Ignored;
        };

        if payload.trim() == DONE_SENTINEL {
            self.done = true;
            return LineOutcome::Done;
        }

        let event: Value = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                self.malformed += 1;
                tracing::debug!(error = %e, "skipping malformed stream chunk");
                return LineOutcome::Malformed;
            }
        };

        match event
            .pointer("/choices/0/delta/content")
            .and_then(Value::as_str)
        {
            Some(delta) => {
                self.text.push_str(delta);
                LineOutcome::Delta
            }
            None => LineOutcome::Ignored,
        }
    }

    /// Whether `[DONE]` has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of data lines dropped as malformed.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Text accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// Assemble a complete reply from a finite list of lines.
pub fn assemble<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut assembler = StreamAssembler::new();
    for line in lines {
        if assembler.push_line(line.as_ref()) == LineOutcome::Done {
            break;
        }
    }
    assembler.finish()
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte
/// character; bytes are held until their line is complete.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and return every line it completed, without the `\n`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..pos]).into_owned());
        }
        lines
    }

    /// The unterminated tail, if any.
    pub fn finish(self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buffer).into_owned())
        }
    }
}
