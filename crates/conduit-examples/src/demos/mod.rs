//! Demo scenarios, one per file.

pub mod basic_query;
pub mod cost_track;
pub mod message_logging;
pub mod permission_mode;
pub mod rewind;
pub mod streaming_input;
pub mod structured_output;

use conduit_core::AgentMessage;
use serde_json::Value;

pub(crate) type DemoResult = Result<(), Box<dyn std::error::Error>>;

/// Concatenates the text blocks of an assistant message, if any.
pub(crate) fn assistant_text(message: &AgentMessage) -> Option<String> {
    let blocks = message.as_value().pointer("/message/content")?.as_array()?;
    let mut out = String::new();
    for block in blocks {
        if block.get("type").and_then(Value::as_str) == Some("text")
            && let Some(text) = block.get("text").and_then(Value::as_str)
        {
            out.push_str(text);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Renders a short summary line for a result message.
pub(crate) fn result_summary(message: &AgentMessage) -> String {
    let value = message.as_value();
    let turns = value.get("num_turns").and_then(Value::as_u64).unwrap_or(0);
    let cost = value
        .get("total_cost_usd")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let text = value.get("result").and_then(Value::as_str).unwrap_or("");
    format!("result: {text} ({turns} turns, ${cost:.4})")
}
