//! Start in one permission mode and switch mid-session.
//!
//! The mode switch goes through the observing wrapper untouched: the wrapper
//! only intercepts the message stream, so `set_permission_mode` lands on the
//! session itself.

use conduit_core::prelude::*;
use conduit_core::vendors::claude::{ClaudeClient, PermissionMode};
use futures::StreamExt as _;

use super::{DemoResult, result_summary};

pub async fn run() -> DemoResult {
    let client = ClaudeClient::from_env();
    let mut session = client
        .query("Help me format utils.py according to PEP 8.")
        .option("permissionMode", "default")
        .start()
        .await?;

    // Change mode dynamically before consuming the stream.
    session.set_permission_mode(PermissionMode::AcceptEdits).await?;

    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.kind() == MessageKind::Result {
            println!("{}", result_summary(&message));
        }
    }
    Ok(())
}
