//! Thin client layer over a streaming conversational agent.
//!
//! The crate wires three pieces together: a config-merging session factory
//! ([`AgentClientExt::query`]), a transparent observing wrapper around the
//! returned session ([`ObservedSession`]), and a JSON Schema dereferencer
//! ([`schema::dereference`]) for preparing structured-output contracts.
//! Concrete clients live under `vendors::*`.
//!
//! # Builder-first usage (Claude Code CLI)
//!
//! ```no_run
//! use conduit_core::prelude::*;
//! use conduit_core::vendors::claude::ClaudeClient;
//! use futures::StreamExt as _;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), ClientError> {
//! let client = ClaudeClient::from_env();
//! let mut session = client
//!     .query("Summarize README.md in one sentence.")
//!     .log_messages(true)
//!     .start()
//!     .await?;
//!
//! let mut messages = session.messages();
//! while let Some(message) = messages.next().await {
//!     let message = message?;
//!     if message.kind() == MessageKind::Result {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// External client seam: session traits and the request descriptor.
pub mod client;
/// Process-wide configuration read from the environment.
pub mod config;
/// Public error types.
pub mod errors;
/// Opaque message values and their type tags.
pub mod message;
/// Message observers and the transparent session wrapper.
pub mod observe;
/// Common imports for typical usage.
pub mod prelude;
/// Config-merging session factory.
pub mod query;
/// JSON Schema dereferencing and metadata cleanup.
pub mod schema;
/// Concrete client integrations.
pub mod vendors;

pub use client::{
    AgentClient, InputStream, MessageSource, MessageStream, Prompt, SessionOptions, SessionRequest,
};
pub use config::ConduitConfig;
pub use errors::{ClientError, ConduitError, SchemaError};
pub use message::{AgentMessage, MessageKind};
pub use observe::{BoxError, JsonLogObserver, MessageObserver, ObservedSession};
pub use query::{AgentClientExt, QueryBuilder, QueryOptions};
pub use schema::dereference;
