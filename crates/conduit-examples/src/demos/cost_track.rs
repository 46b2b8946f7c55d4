//! Track per-step usage through an observer and total cost off the result.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;
use serde_json::Value;

use super::DemoResult;

#[derive(Clone, Default)]
struct CostTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

#[derive(Default)]
struct TrackerInner {
    seen_ids: HashSet<String>,
    steps: Vec<(String, Value)>,
}

impl MessageObserver for CostTracker {
    fn observe(&self, message: &AgentMessage) -> Result<(), BoxError> {
        if message.kind() != MessageKind::Assistant {
            return Ok(());
        }
        let value = message.as_value();
        let Some(usage) = value.pointer("/message/usage") else {
            return Ok(());
        };
        let Some(id) = value.pointer("/message/id").and_then(Value::as_str) else {
            return Ok(());
        };

        let mut inner = self.inner.lock().unwrap();
        // Assistant messages repeat their id across content blocks; count
        // usage once per step.
        if inner.seen_ids.insert(id.to_string()) {
            inner.steps.push((id.to_string(), usage.clone()));
        }
        Ok(())
    }
}

pub async fn run() -> DemoResult {
    let tracker = CostTracker::default();
    let client = ClaudeClient::from_env();
    let mut session = client
        .query("Analyze and refactor utils.py.")
        .observer(tracker.clone())
        .start()
        .await?;

    let mut total_cost = 0.0_f64;
    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.kind() == MessageKind::Result {
            total_cost = message
                .as_value()
                .get("total_cost_usd")
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
        }
    }

    let inner = tracker.inner.lock().unwrap();
    println!("steps processed: {}", inner.steps.len());
    for (id, usage) in &inner.steps {
        println!("- {id}: {usage}");
    }
    println!("total cost: ${total_cost:.4}");
    Ok(())
}
