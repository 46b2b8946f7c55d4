/// Errors surfaced by an agent client while launching or driving a session.
///
/// Stream-level failures travel as `Err` items inside the message stream and
/// use the same type, so consumers see one failure surface either way.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// The client process or connection could not be launched.
    #[error("spawn error ({client}): {message}")]
    Spawn { client: String, message: String },
    /// Transport or stream I/O failed mid-session.
    #[error("transport error ({client}): {message}")]
    Transport { client: String, message: String },
    /// The client produced output the wire protocol does not allow.
    #[error("protocol error ({client}): {message}")]
    Protocol { client: String, message: String },
}

impl ClientError {
    /// Creates a spawn-level error.
    pub fn spawn(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Spawn {
            client: client.into(),
            message: message.into(),
        }
    }

    /// Creates a transport-level error.
    pub fn transport(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            client: client.into(),
            message: message.into(),
        }
    }

    /// Creates a protocol-level error.
    pub fn protocol(client: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            client: client.into(),
            message: message.into(),
        }
    }

    /// Returns the client name associated with this error.
    pub fn client(&self) -> &str {
        match self {
            Self::Spawn { client, .. }
            | Self::Transport { client, .. }
            | Self::Protocol { client, .. } => client,
        }
    }

    /// Returns the human-readable message for this error.
    pub fn message(&self) -> &str {
        match self {
            Self::Spawn { message, .. }
            | Self::Transport { message, .. }
            | Self::Protocol { message, .. } => message,
        }
    }
}

/// Errors raised by the schema dereferencer.
///
/// All of these come out of the reference-resolution pass; the metadata
/// cleanup pass never runs on a partially resolved document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The reference does not use the local `#/...` pointer form.
    #[error("unsupported reference {reference:?}: only local \"#/...\" pointers are resolvable")]
    UnsupportedReference { reference: String },
    /// The pointer does not name a location in the document.
    #[error("unresolved reference: {pointer:?}")]
    UnresolvedPointer { pointer: String },
    /// Following the reference chain revisits a location.
    #[error("circular reference through {pointer:?}")]
    CircularReference { pointer: String },
}

/// Top-level error type for the public API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConduitError {
    /// Invalid configuration handed to a client or builder.
    #[error("config error: {0}")]
    Config(String),
    /// Failure originating in the external client, propagated unchanged.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Failure while dereferencing a schema document.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}
