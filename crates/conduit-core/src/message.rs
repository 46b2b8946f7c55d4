use serde_json::{Value, json};

/// Type tag carried by every message a session produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageKind {
    Assistant,
    User,
    System,
    Result,
    StreamEvent,
    /// A tag this crate does not know. The message is still forwarded intact.
    Other,
}

impl MessageKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "assistant" => Self::Assistant,
            "user" => Self::User,
            "system" => Self::System,
            "result" => Self::Result,
            "stream_event" => Self::StreamEvent,
            _ => Self::Other,
        }
    }
}

/// One message produced by a streaming session.
///
/// Messages are variably shaped and owned by the external client; this crate
/// treats them as opaque JSON discriminated by the `type` tag and never
/// rewrites their contents.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AgentMessage(Value);

impl AgentMessage {
    /// Returns the raw `type` tag, if the message carries one.
    pub fn message_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    /// Returns the message kind parsed from the `type` tag.
    ///
    /// Messages without a tag map to [`MessageKind::Other`].
    pub fn kind(&self) -> MessageKind {
        self.message_type()
            .map_or(MessageKind::Other, MessageKind::from_tag)
    }

    /// Returns the `session_id` field, if present.
    pub fn session_id(&self) -> Option<&str> {
        self.0.get("session_id").and_then(Value::as_str)
    }

    /// Returns the `uuid` field, if present.
    pub fn uuid(&self) -> Option<&str> {
        self.0.get("uuid").and_then(Value::as_str)
    }

    /// Borrows the underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Unwraps the underlying JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Builds a plain-text user message in the wire shape clients expect.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self(json!({
            "type": "user",
            "message": {
                "role": "user",
                "content": text.into(),
            },
            "parent_tool_use_id": null,
            "session_id": "",
        }))
    }
}

impl From<Value> for AgentMessage {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
