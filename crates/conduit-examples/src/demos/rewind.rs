//! File checkpointing: capture a checkpoint id, then rewind in a resumed
//! session.

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;

use super::DemoResult;

pub async fn run() -> DemoResult {
    let client = ClaudeClient::from_env();

    // Step 1: run with checkpointing enabled and capture the checkpoint id
    // from the first replayed user message.
    let mut session = client
        .query("Format utils.py according to PEP 8, fixing any style issues.")
        .option("enableFileCheckpointing", true)
        .option("permissionMode", "acceptEdits")
        .start()
        .await?;

    let mut checkpoint_id: Option<String> = None;
    let mut session_id: Option<String> = None;
    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.kind() == MessageKind::User && checkpoint_id.is_none() {
            checkpoint_id = message.uuid().map(ToOwned::to_owned);
        }
        if session_id.is_none() {
            session_id = message.session_id().map(ToOwned::to_owned);
        }
    }
    drop(messages);
    drop(session);

    let (Some(checkpoint_id), Some(session_id)) = (checkpoint_id, session_id) else {
        println!("no checkpoint captured; nothing to rewind");
        return Ok(());
    };

    // Step 2: resume the session with an empty prompt and rewind the files.
    let rewind_session = client
        .query("")
        .option("enableFileCheckpointing", true)
        .option("resume", session_id)
        .start()
        .await?;
    rewind_session.rewind_files(&checkpoint_id).await?;
    println!("rewound to checkpoint {checkpoint_id}");
    Ok(())
}
