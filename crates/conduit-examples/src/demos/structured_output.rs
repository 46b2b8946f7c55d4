//! Structured output: derive a schema, dereference it, send it as the
//! output contract, and read the validated result.

use conduit_core::prelude::*;
use conduit_core::vendors::claude::ClaudeClient;
use futures::StreamExt as _;
use schemars::JsonSchema;
use serde_json::json;

use super::DemoResult;

#[derive(Debug, serde::Deserialize, JsonSchema)]
#[allow(dead_code)]
struct CompanyProfile {
    company_name: String,
    founded_year: Option<u32>,
    headquarters: Option<String>,
}

pub async fn run() -> DemoResult {
    // Generated schemas carry $defs indirection and a $schema marker; the
    // contract sent over the wire must be self-contained.
    let raw = serde_json::to_value(schemars::schema_for!(CompanyProfile))?;
    let schema = dereference(&raw)?;

    let client = ClaudeClient::from_env();
    let mut session = client
        .query("Research Anthropic and provide key company information.")
        .option("allowedTools", json!(["WebFetch"]))
        .option(
            "outputFormat",
            json!({ "type": "json_schema", "schema": schema }),
        )
        .start()
        .await?;

    let mut messages = session.messages();
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.kind() == MessageKind::Result
            && let Some(output) = message.as_value().get("structured_output")
        {
            let profile: CompanyProfile = serde_json::from_value(output.clone())?;
            println!("{profile:#?}");
        }
    }
    Ok(())
}
