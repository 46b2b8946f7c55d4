//! Run demo scenarios against a local Claude Code install (one per file).

mod demos;

use clap::{Parser, Subcommand};
use conduit_core::ConduitConfig;

#[derive(Parser)]
#[command(name = "conduit-examples", about = "Demo scenarios for the conduit client wrapper")]
struct Cli {
    #[command(subcommand)]
    demo: Demo,
}

#[derive(Subcommand)]
enum Demo {
    /// One-shot text prompt, printed assistant output and result summary.
    BasicQuery,
    /// Feed the conversation from an async user-message producer.
    StreamingInput,
    /// Built-in and custom message observers.
    MessageLogging,
    /// Flip the permission mode mid-session through the wrapper.
    PermissionMode,
    /// Capture a file checkpoint and rewind to it in a resumed session.
    Rewind,
    /// Derive a JSON schema, dereference it, and request structured output.
    StructuredOutput,
    /// Accumulate per-step usage and total cost from the message stream.
    CostTrack,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    ConduitConfig::global().log_summary();

    match Cli::parse().demo {
        Demo::BasicQuery => demos::basic_query::run().await,
        Demo::StreamingInput => demos::streaming_input::run().await,
        Demo::MessageLogging => demos::message_logging::run().await,
        Demo::PermissionMode => demos::permission_mode::run().await,
        Demo::Rewind => demos::rewind::run().await,
        Demo::StructuredOutput => demos::structured_output::run().await,
        Demo::CostTrack => demos::cost_track::run().await,
    }
}
