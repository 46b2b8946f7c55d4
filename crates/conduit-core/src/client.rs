use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

use futures::Stream;

use crate::errors::ClientError;
use crate::message::AgentMessage;

/// Stream of messages produced by one conversation session.
///
/// Items are produced lazily, one per consumer demand. The stream ends
/// normally at end of conversation and yields `Err` on underlying failure;
/// errors are never swallowed on the way to the consumer.
pub type MessageStream =
    Pin<Box<dyn Stream<Item = Result<AgentMessage, ClientError>> + Send + 'static>>;

/// Stream of caller-produced input messages for a streaming prompt.
pub type InputStream = Pin<Box<dyn Stream<Item = AgentMessage> + Send + 'static>>;

/// Prompt half of a request descriptor: a one-shot text prompt, or a producer
/// of user messages for a long-lived conversation.
#[non_exhaustive]
pub enum Prompt {
    Text(String),
    Messages(InputStream),
}

impl Prompt {
    /// Wraps an async producer of user messages.
    pub fn messages(stream: impl Stream<Item = AgentMessage> + Send + 'static) -> Self {
        Self::Messages(Box::pin(stream))
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Messages(_) => f.write_str("Messages(..)"),
        }
    }
}

/// Options half of a request descriptor, finalized by the session factory.
#[derive(Clone, Debug, Default)]
pub struct SessionOptions {
    /// Resolved executable-path override, if any.
    pub executable_path: Option<PathBuf>,
    /// Client-specific options, passed through to the client unchanged.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Finalized request descriptor handed to an [`AgentClient`].
#[derive(Debug)]
pub struct SessionRequest {
    pub prompt: Prompt,
    pub options: SessionOptions,
}

/// The one session capability the observing wrapper intercepts.
pub trait MessageSource {
    /// Takes the session's message stream.
    fn messages(&mut self) -> MessageStream;
}

/// External conversational-agent client: accepts a request descriptor and
/// returns a streaming session object.
///
/// Anything the concrete session exposes beyond [`MessageSource`] (permission
/// mode changes, rewind, interrupt, whatever a client grows later) stays
/// reachable through the observing wrapper by deref.
#[async_trait::async_trait]
pub trait AgentClient {
    /// Concrete session type returned by this client.
    type Session: MessageSource + Send;

    /// Short client name used in logs and error labels.
    fn name(&self) -> &str;

    /// Launches a new streaming session.
    async fn start_session(&self, request: SessionRequest) -> Result<Self::Session, ClientError>;
}
