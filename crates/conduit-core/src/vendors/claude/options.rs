use std::path::PathBuf;

use serde_json::{Map, Value, json};
use tracing::warn;

use crate::errors::ClientError;

use super::CLAUDE_CLIENT;

/// Permission mode for tool execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    Default,
    AcceptEdits,
    BypassPermissions,
    Plan,
}

impl PermissionMode {
    /// Returns the wire spelling of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::AcceptEdits => "acceptEdits",
            Self::BypassPermissions => "bypassPermissions",
            Self::Plan => "plan",
        }
    }
}

/// Structured-output contract attached to a session.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputFormat {
    /// Constrain the final result to the given JSON Schema.
    JsonSchema { schema: Value },
}

/// Options the Claude CLI recognizes in a request's extras map.
///
/// Keys use the wire spelling (`camelCase`); snake_case aliases are accepted
/// for Rust-side callers. Unknown keys are logged and skipped so an older
/// client keeps working against newer calling code.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClaudeOptions {
    pub model: Option<String>,
    #[serde(alias = "permission_mode")]
    pub permission_mode: Option<PermissionMode>,
    #[serde(alias = "max_turns")]
    pub max_turns: Option<u32>,
    pub cwd: Option<PathBuf>,
    pub resume: Option<String>,
    #[serde(alias = "allowed_tools")]
    pub allowed_tools: Option<Vec<String>>,
    #[serde(alias = "output_format")]
    pub output_format: Option<OutputFormat>,
    #[serde(alias = "enable_file_checkpointing")]
    pub enable_file_checkpointing: Option<bool>,
}

const KNOWN_KEYS: &[&str] = &[
    "model",
    "permissionMode",
    "permission_mode",
    "maxTurns",
    "max_turns",
    "cwd",
    "resume",
    "allowedTools",
    "allowed_tools",
    "outputFormat",
    "output_format",
    "enableFileCheckpointing",
    "enable_file_checkpointing",
];

impl ClaudeOptions {
    /// Parses the recognized options out of a request's extras map.
    pub fn from_extra(extra: &Map<String, Value>) -> Result<Self, ClientError> {
        for key in extra.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!(option = %key, "unknown claude option; skipping");
            }
        }
        serde_json::from_value(Value::Object(extra.clone())).map_err(|e| {
            ClientError::protocol(CLAUDE_CLIENT, format!("invalid claude options: {e}"))
        })
    }
}

/// Builds one `control_request` frame for the CLI's stdin channel.
pub(crate) fn control_request(request_id: &str, subtype: &str, body: Map<String, Value>) -> Value {
    let mut request = Map::with_capacity(body.len() + 1);
    request.insert("subtype".to_string(), json!(subtype));
    request.extend(body);
    json!({
        "type": "control_request",
        "request_id": request_id,
        "request": Value::Object(request),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_and_snake_spellings_both_parse() {
        let camel: Map<String, Value> = serde_json::from_value(json!({
            "model": "claude-sonnet-4-5",
            "permissionMode": "acceptEdits",
            "maxTurns": 10,
        }))
        .unwrap();
        let snake: Map<String, Value> = serde_json::from_value(json!({
            "model": "claude-sonnet-4-5",
            "permission_mode": "acceptEdits",
            "max_turns": 10,
        }))
        .unwrap();

        let from_camel = ClaudeOptions::from_extra(&camel).expect("camel");
        let from_snake = ClaudeOptions::from_extra(&snake).expect("snake");
        assert_eq!(from_camel, from_snake);
        assert_eq!(from_camel.permission_mode, Some(PermissionMode::AcceptEdits));
        assert_eq!(from_camel.max_turns, Some(10));
    }

    #[test]
    fn unknown_keys_are_skipped_not_fatal() {
        let extra: Map<String, Value> = serde_json::from_value(json!({
            "model": "claude-sonnet-4-5",
            "onMessage": "not a wire option",
        }))
        .unwrap();
        let options = ClaudeOptions::from_extra(&extra).expect("parse");
        assert_eq!(options.model.as_deref(), Some("claude-sonnet-4-5"));
    }

    #[test]
    fn invalid_option_values_are_protocol_errors() {
        let extra: Map<String, Value> =
            serde_json::from_value(json!({ "maxTurns": "ten" })).unwrap();
        let error = ClaudeOptions::from_extra(&extra).expect_err("must fail");
        assert!(matches!(error, ClientError::Protocol { .. }));
    }

    #[test]
    fn output_format_round_trips_through_the_extras_map() {
        let extra: Map<String, Value> = serde_json::from_value(json!({
            "outputFormat": {
                "type": "json_schema",
                "schema": { "type": "object" },
            },
        }))
        .unwrap();
        let options = ClaudeOptions::from_extra(&extra).expect("parse");
        assert_eq!(
            options.output_format,
            Some(OutputFormat::JsonSchema {
                schema: json!({ "type": "object" }),
            }),
        );
    }

    #[test]
    fn permission_modes_use_the_wire_spelling() {
        assert_eq!(PermissionMode::AcceptEdits.as_str(), "acceptEdits");
        assert_eq!(
            serde_json::to_value(PermissionMode::BypassPermissions).unwrap(),
            json!("bypassPermissions"),
        );
    }

    #[test]
    fn control_request_frames_have_the_expected_shape() {
        let mut body = Map::new();
        body.insert("mode".to_string(), json!("plan"));
        let frame = control_request("req_1", "set_permission_mode", body);
        assert_eq!(frame["type"], json!("control_request"));
        assert_eq!(frame["request_id"], json!("req_1"));
        assert_eq!(frame["request"]["subtype"], json!("set_permission_mode"));
        assert_eq!(frame["request"]["mode"], json!("plan"));
    }
}
