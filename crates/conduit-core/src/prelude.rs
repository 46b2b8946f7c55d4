//! Common imports for typical usage.
//!
//! This module intentionally exports the most frequently used client/session
//! types so examples and application code need fewer import lines.
pub use crate::{
    AgentClient, AgentClientExt, AgentMessage, BoxError, ClientError, ConduitConfig, ConduitError,
    JsonLogObserver, MessageKind, MessageObserver, MessageSource, MessageStream, ObservedSession,
    Prompt, QueryBuilder, SchemaError, SessionOptions, SessionRequest, dereference,
};
