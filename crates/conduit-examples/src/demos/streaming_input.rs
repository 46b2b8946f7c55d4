//! Drive the conversation from an async producer instead of a single prompt.

use std::time::Duration;

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;
use serde_json::json;

use super::{DemoResult, result_summary};

fn user_messages() -> impl futures::Stream<Item = AgentMessage> + Send {
    futures::stream::unfold(0u8, |step| async move {
        match step {
            0 => Some((
                AgentMessage::user_text("List the files in the current directory."),
                1,
            )),
            1 => {
                // Give the first turn a moment before the follow-up.
                tokio::time::sleep(Duration::from_secs(2)).await;
                Some((
                    AgentMessage::user_text("Now show the largest of those files."),
                    2,
                ))
            }
            _ => None,
        }
    })
}

pub async fn run() -> DemoResult {
    let client = ClaudeClient::from_env();
    let mut session = client
        .query(Prompt::messages(user_messages()))
        .option("maxTurns", 10)
        .option("allowedTools", json!(["Read", "Grep", "Bash"]))
        .start()
        .await?;

    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.kind() == MessageKind::Result {
            println!("{}", result_summary(&message));
        }
    }
    Ok(())
}
