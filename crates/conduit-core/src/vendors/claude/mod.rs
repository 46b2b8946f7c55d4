//! Claude Code CLI integration.
//!
//! Drives the `claude` executable over its `--output-format stream-json`
//! protocol: one JSON message per stdout line, control frames written to
//! stdin. The session stays usable for control operations (permission mode,
//! model switch, interrupt, file rewind) while the message stream is being
//! consumed.
mod adapter;
mod options;
pub(crate) mod transport;

pub use adapter::{ClaudeClient, ClaudeSession};
pub use options::{ClaudeOptions, OutputFormat, PermissionMode};

/// Client name used in logs and error labels.
pub(crate) const CLAUDE_CLIENT: &str = "claude";
