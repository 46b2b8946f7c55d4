//! Simplest possible call: one text prompt, stream until the result arrives.

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;

use super::{DemoResult, assistant_text, result_summary};

pub async fn run() -> DemoResult {
    let client = ClaudeClient::from_env();
    let mut session = client
        .query("Summarize the purpose of this repository in two sentences.")
        .start()
        .await?;

    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        match message.kind() {
            MessageKind::Assistant => {
                if let Some(text) = assistant_text(&message) {
                    println!("{text}");
                }
            }
            MessageKind::Result => {
                println!("{}", result_summary(&message));
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
