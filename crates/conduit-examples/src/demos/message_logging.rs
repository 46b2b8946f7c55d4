//! Observer wiring: the built-in JSON logger and a custom observer.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;

use super::DemoResult;

#[derive(Clone, Default)]
struct TagTally {
    inner: Arc<TallyInner>,
}

#[derive(Default)]
struct TallyInner {
    count: AtomicUsize,
    tags: Mutex<Vec<String>>,
}

impl MessageObserver for TagTally {
    fn observe(&self, message: &AgentMessage) -> Result<(), BoxError> {
        self.inner.count.fetch_add(1, Ordering::Relaxed);
        self.inner
            .tags
            .lock()
            .unwrap()
            .push(message.message_type().unwrap_or("?").to_string());
        Ok(())
    }
}

pub async fn run() -> DemoResult {
    let client = ClaudeClient::from_env();

    // Built-in logger: every message is logged as pretty-printed JSON.
    let mut session = client
        .query("Say hello in one short sentence.")
        .log_messages(true)
        .start()
        .await?;
    session.messages().for_each(|_| async {}).await;

    // Custom observer: wins over the logging flags, sees every message once.
    let tally = TagTally::default();
    let mut session = client
        .query("Say goodbye in one short sentence.")
        .observer(tally.clone())
        .start()
        .await?;
    session.messages().for_each(|_| async {}).await;

    println!(
        "observed {} messages: {:?}",
        tally.inner.count.load(Ordering::Relaxed),
        tally.inner.tags.lock().unwrap(),
    );
    Ok(())
}
