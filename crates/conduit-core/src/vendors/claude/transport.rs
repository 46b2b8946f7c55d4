use std::collections::VecDeque;

use bytes::BytesMut;
use futures::stream;
use tokio::io::AsyncReadExt as _;
use tokio::process::ChildStdout;

use crate::client::MessageStream;
use crate::errors::ClientError;
use crate::message::AgentMessage;

use super::CLAUDE_CLIENT;

const READ_CHUNK: usize = 8 * 1024;

/// Reassembles stream-json lines out of arbitrary byte chunks.
#[derive(Default)]
pub(crate) struct JsonlDecoder {
    buf: Vec<u8>,
}

impl JsonlDecoder {
    /// Feeds one chunk and returns every complete line it finished.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|byte| *byte == b'\n') {
            let line_bytes: Vec<u8> = self.buf.drain(..=idx).collect();
            if let Some(line) = decode_line(&line_bytes[..line_bytes.len() - 1]) {
                lines.push(line);
            }
        }
        lines
    }

    /// Returns the trailing unterminated line, if any, at end of input.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        decode_line(&rest)
    }
}

fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_end_matches('\r').trim();
    if line.is_empty() {
        return None;
    }
    Some(line.to_string())
}

/// Parses one stream-json line into a message.
pub(crate) fn parse_message_line(line: &str) -> Result<AgentMessage, ClientError> {
    serde_json::from_str::<serde_json::Value>(line)
        .map(AgentMessage::from)
        .map_err(|e| {
            ClientError::protocol(CLAUDE_CLIENT, format!("invalid stream-json line: {e}"))
        })
}

/// Folds the child's stdout into a lazily produced message stream.
///
/// Each consumer demand reads at most what is needed for the next complete
/// line; EOF ends the stream normally and read failures surface as transport
/// errors.
pub(crate) fn message_stream(stdout: ChildStdout) -> MessageStream {
    struct State {
        reader: ChildStdout,
        decoder: JsonlDecoder,
        buf: BytesMut,
        pending: VecDeque<AgentMessage>,
        done: bool,
    }

    Box::pin(stream::try_unfold(
        State {
            reader: stdout,
            decoder: JsonlDecoder::default(),
            buf: BytesMut::with_capacity(READ_CHUNK),
            pending: VecDeque::new(),
            done: false,
        },
        |mut state| async move {
            loop {
                if let Some(message) = state.pending.pop_front() {
                    return Ok(Some((message, state)));
                }
                if state.done {
                    return Ok(None);
                }

                state.buf.clear();
                match state.reader.read_buf(&mut state.buf).await {
                    Ok(0) => {
                        state.done = true;
                        if let Some(line) = state.decoder.finish() {
                            state.pending.push_back(parse_message_line(&line)?);
                        }
                    }
                    Ok(_) => {
                        let lines = state.decoder.push_chunk(&state.buf);
                        for line in lines {
                            state.pending.push_back(parse_message_line(&line)?);
                        }
                    }
                    Err(e) => {
                        return Err(ClientError::transport(
                            CLAUDE_CLIENT,
                            format!("stream-json read failed: {e}"),
                        ));
                    }
                }
            }
        },
    ))
}
