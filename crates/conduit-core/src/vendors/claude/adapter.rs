use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use futures::{StreamExt as _, stream};
use serde_json::{Map, json};
use tokio::io::AsyncWriteExt as _;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;
use tracing::debug;

use crate::client::{AgentClient, MessageSource, MessageStream, Prompt, SessionRequest};
use crate::config::ConduitConfig;
use crate::errors::ClientError;

use super::options::{ClaudeOptions, OutputFormat, PermissionMode, control_request};
use super::transport::message_stream;
use super::CLAUDE_CLIENT;

/// Client that launches the Claude Code CLI as a subprocess.
///
/// The base URL, auth token, and custom headers from [`ConduitConfig`] are
/// exported into the child's environment; the executable path comes from the
/// finalized request descriptor, falling back to `claude` on `PATH`.
pub struct ClaudeClient {
    config: ConduitConfig,
}

impl ClaudeClient {
    /// Client backed by the process-wide configuration.
    pub fn from_env() -> Self {
        Self::new(ConduitConfig::global().clone())
    }

    /// Client with explicit configuration.
    pub fn new(config: ConduitConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl AgentClient for ClaudeClient {
    type Session = ClaudeSession;

    fn name(&self) -> &str {
        CLAUDE_CLIENT
    }

    async fn start_session(&self, request: SessionRequest) -> Result<ClaudeSession, ClientError> {
        let options = ClaudeOptions::from_extra(&request.options.extra)?;
        let argv = build_args(&request.prompt, &options);
        let executable = request
            .options
            .executable_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(CLAUDE_CLIENT));

        let mut command = Command::new(&executable);
        command
            .args(&argv)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }
        apply_env(&mut command, &self.config, &options);

        debug!(executable = %executable.display(), ?argv, "spawning claude session");
        let mut child = command.spawn().map_err(|e| {
            ClientError::spawn(
                CLAUDE_CLIENT,
                format!("failed to launch {}: {e}", executable.display()),
            )
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            ClientError::spawn(CLAUDE_CLIENT, "child stdout was not captured")
        })?;
        let stdin = Arc::new(Mutex::new(child.stdin.take()));

        if let Prompt::Messages(input) = request.prompt {
            spawn_input_feeder(input, Arc::clone(&stdin));
        }

        Ok(ClaudeSession {
            child,
            stdin,
            stdout: Some(stdout),
        })
    }
}

/// One live conversation with the Claude CLI.
///
/// The message stream comes from [`MessageSource::messages`]; everything else
/// here is a control operation multiplexed onto the child's stdin. Dropping
/// the session kills the child process.
pub struct ClaudeSession {
    child: Child,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
    stdout: Option<tokio::process::ChildStdout>,
}

impl ClaudeSession {
    /// Switches the permission mode mid-session.
    pub async fn set_permission_mode(&self, mode: PermissionMode) -> Result<(), ClientError> {
        let mut body = Map::new();
        body.insert("mode".to_string(), json!(mode.as_str()));
        self.send_control("set_permission_mode", body).await
    }

    /// Switches the model mid-session.
    pub async fn set_model(&self, model: impl Into<String>) -> Result<(), ClientError> {
        let mut body = Map::new();
        body.insert("model".to_string(), json!(model.into()));
        self.send_control("set_model", body).await
    }

    /// Interrupts the current turn.
    pub async fn interrupt(&self) -> Result<(), ClientError> {
        self.send_control("interrupt", Map::new()).await
    }

    /// Rewinds tracked file state to the checkpoint captured at the given
    /// user message.
    pub async fn rewind_files(&self, user_message_id: impl Into<String>) -> Result<(), ClientError> {
        let mut body = Map::new();
        body.insert("user_message_id".to_string(), json!(user_message_id.into()));
        self.send_control("rewind_files", body).await
    }

    /// Waits for the child process to exit.
    pub async fn wait(&mut self) -> Result<std::process::ExitStatus, ClientError> {
        self.child.wait().await.map_err(|e| {
            ClientError::transport(CLAUDE_CLIENT, format!("waiting on child failed: {e}"))
        })
    }

    async fn send_control(
        &self,
        subtype: &str,
        body: Map<String, serde_json::Value>,
    ) -> Result<(), ClientError> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().simple());
        let frame = control_request(&request_id, subtype, body);
        debug!(%request_id, subtype, "sending control request");
        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or_else(|| {
            ClientError::transport(CLAUDE_CLIENT, "session stdin is closed")
        })?;
        write_frame(stdin, &frame).await
    }
}

impl MessageSource for ClaudeSession {
    fn messages(&mut self) -> MessageStream {
        match self.stdout.take() {
            Some(stdout) => message_stream(stdout),
            // The stream can only be taken once; a second take is a caller bug
            // surfaced as a protocol error rather than a panic.
            None => Box::pin(stream::once(async {
                Err(ClientError::protocol(
                    CLAUDE_CLIENT,
                    "message stream already taken",
                ))
            })),
        }
    }
}

fn spawn_input_feeder(
    mut input: crate::client::InputStream,
    stdin: Arc<Mutex<Option<ChildStdin>>>,
) {
    tokio::spawn(async move {
        while let Some(message) = input.next().await {
            let mut guard = stdin.lock().await;
            let Some(writer) = guard.as_mut() else {
                break;
            };
            if write_frame(writer, message.as_value()).await.is_err() {
                break;
            }
            // stdin stays open after the producer ends: control frames still
            // travel over it for the rest of the session.
        }
    });
}

async fn write_frame(
    stdin: &mut ChildStdin,
    frame: &serde_json::Value,
) -> Result<(), ClientError> {
    let mut line = serde_json::to_string(frame).map_err(|e| {
        ClientError::protocol(CLAUDE_CLIENT, format!("failed to encode frame: {e}"))
    })?;
    line.push('\n');
    stdin
        .write_all(line.as_bytes())
        .await
        .map_err(|e| ClientError::transport(CLAUDE_CLIENT, format!("stdin write failed: {e}")))?;
    stdin
        .flush()
        .await
        .map_err(|e| ClientError::transport(CLAUDE_CLIENT, format!("stdin flush failed: {e}")))
}

fn build_args(prompt: &Prompt, options: &ClaudeOptions) -> Vec<String> {
    let mut argv = vec![
        "--print".to_string(),
        "--verbose".to_string(),
        "--output-format".to_string(),
        "stream-json".to_string(),
    ];
    if matches!(prompt, Prompt::Messages(_)) {
        argv.push("--input-format".to_string());
        argv.push("stream-json".to_string());
    }
    if let Some(model) = &options.model {
        argv.push("--model".to_string());
        argv.push(model.clone());
    }
    if let Some(mode) = options.permission_mode {
        argv.push("--permission-mode".to_string());
        argv.push(mode.as_str().to_string());
    }
    if let Some(turns) = options.max_turns {
        argv.push("--max-turns".to_string());
        argv.push(turns.to_string());
    }
    if let Some(resume) = &options.resume {
        argv.push("--resume".to_string());
        argv.push(resume.clone());
    }
    if let Some(tools) = options.allowed_tools.as_deref().filter(|t| !t.is_empty()) {
        argv.push("--allowed-tools".to_string());
        argv.push(tools.join(","));
    }
    if let Some(OutputFormat::JsonSchema { schema }) = &options.output_format {
        argv.push("--json-schema".to_string());
        argv.push(schema.to_string());
    }
    if options.enable_file_checkpointing == Some(true) {
        argv.push("--replay-user-messages".to_string());
    }
    if let Prompt::Text(text) = prompt {
        argv.push(text.clone());
    }
    argv
}

fn apply_env(command: &mut Command, config: &ConduitConfig, options: &ClaudeOptions) {
    if let Some(base_url) = &config.base_url {
        command.env("ANTHROPIC_BASE_URL", base_url);
    }
    if let Some(token) = &config.auth_token {
        command.env("ANTHROPIC_AUTH_TOKEN", token);
    }
    if let Some(headers) = &config.custom_headers {
        command.env("ANTHROPIC_CUSTOM_HEADERS", headers);
    }
    if options.enable_file_checkpointing == Some(true) {
        command.env("CLAUDE_CODE_ENABLE_SDK_FILE_CHECKPOINTING", "1");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn text_prompt(text: &str) -> Prompt {
        Prompt::Text(text.to_string())
    }

    #[test]
    fn text_prompts_become_a_positional_argument() {
        let argv = build_args(&text_prompt("hello there"), &ClaudeOptions::default());
        assert_eq!(
            argv,
            vec![
                "--print",
                "--verbose",
                "--output-format",
                "stream-json",
                "hello there",
            ],
        );
    }

    #[test]
    fn streaming_prompts_switch_the_input_format() {
        let prompt = Prompt::messages(stream::empty());
        let argv = build_args(&prompt, &ClaudeOptions::default());
        assert!(argv.contains(&"--input-format".to_string()));
        assert_eq!(argv.last(), Some(&"stream-json".to_string()));
    }

    #[test]
    fn recognized_options_map_to_their_flags() {
        let options = ClaudeOptions {
            model: Some("claude-sonnet-4-5".to_string()),
            permission_mode: Some(PermissionMode::AcceptEdits),
            max_turns: Some(10),
            resume: Some("sess-1".to_string()),
            allowed_tools: Some(vec!["Read".to_string(), "Grep".to_string()]),
            ..ClaudeOptions::default()
        };
        let argv = build_args(&text_prompt("hi"), &options);
        let joined = argv.join(" ");
        assert!(joined.contains("--model claude-sonnet-4-5"));
        assert!(joined.contains("--permission-mode acceptEdits"));
        assert!(joined.contains("--max-turns 10"));
        assert!(joined.contains("--resume sess-1"));
        assert!(joined.contains("--allowed-tools Read,Grep"));
        assert_eq!(argv.last(), Some(&"hi".to_string()));
    }

    #[test]
    fn structured_output_serializes_the_schema_inline() {
        let options = ClaudeOptions {
            output_format: Some(OutputFormat::JsonSchema {
                schema: serde_json::json!({ "type": "object" }),
            }),
            ..ClaudeOptions::default()
        };
        let argv = build_args(&text_prompt("hi"), &options);
        let idx = argv
            .iter()
            .position(|arg| arg == "--json-schema")
            .expect("schema flag");
        assert_eq!(argv[idx + 1], "{\"type\":\"object\"}");
    }

    #[test]
    fn checkpointing_adds_replay_and_env() {
        let options = ClaudeOptions {
            enable_file_checkpointing: Some(true),
            ..ClaudeOptions::default()
        };
        let argv = build_args(&text_prompt("hi"), &options);
        assert!(argv.contains(&"--replay-user-messages".to_string()));

        let mut command = Command::new("claude");
        apply_env(&mut command, &ConduitConfig::default(), &options);
        let has_flag = command.as_std().get_envs().any(|(key, value)| {
            key.to_str() == Some("CLAUDE_CODE_ENABLE_SDK_FILE_CHECKPOINTING")
                && value.and_then(|v| v.to_str()) == Some("1")
        });
        assert!(has_flag);
    }

    #[test]
    fn configured_endpoint_and_token_reach_the_child_env() {
        let config = ConduitConfig {
            base_url: Some("https://proxy.internal".to_string()),
            auth_token: Some("sk-ant-test".to_string()),
            ..ConduitConfig::default()
        };
        let mut command = Command::new("claude");
        apply_env(&mut command, &config, &ClaudeOptions::default());

        let envs: Vec<(String, String)> = command
            .as_std()
            .get_envs()
            .filter_map(|(key, value)| {
                Some((
                    key.to_str()?.to_string(),
                    value.and_then(|v| v.to_str())?.to_string(),
                ))
            })
            .collect();
        assert!(envs.contains(&(
            "ANTHROPIC_BASE_URL".to_string(),
            "https://proxy.internal".to_string(),
        )));
        assert!(envs.contains(&(
            "ANTHROPIC_AUTH_TOKEN".to_string(),
            "sk-ant-test".to_string(),
        )));
    }
}
