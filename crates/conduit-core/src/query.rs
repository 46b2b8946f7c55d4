use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::client::{AgentClient, Prompt, SessionOptions, SessionRequest};
use crate::config::ConduitConfig;
use crate::errors::ClientError;
use crate::observe::{JsonLogObserver, MessageObserver, ObservedSession};

/// Per-call options collected by [`QueryBuilder`].
#[derive(Default)]
pub struct QueryOptions {
    /// Executable-path default baked into the calling code.
    pub executable_path: Option<PathBuf>,
    /// Per-call override for the built-in message logger.
    pub log_messages: Option<bool>,
    /// Explicit message observer; wins over both logging flags.
    pub observer: Option<Arc<dyn MessageObserver>>,
    /// Client-specific options, passed through unchanged.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Entry point for starting sessions: `client.query(prompt)`.
pub trait AgentClientExt: AgentClient + Sized {
    /// Starts building a session request for the given prompt.
    fn query(&self, prompt: impl Into<Prompt>) -> QueryBuilder<'_, Self> {
        QueryBuilder {
            client: self,
            prompt: prompt.into(),
            options: QueryOptions::default(),
            config: None,
        }
    }
}

impl<C: AgentClient + Sized> AgentClientExt for C {}

/// Builder for one session: collects per-call options, merges the
/// process-wide configuration, and starts the session on the client.
pub struct QueryBuilder<'a, C: AgentClient> {
    client: &'a C,
    prompt: Prompt,
    options: QueryOptions,
    config: Option<ConduitConfig>,
}

impl<'a, C: AgentClient> QueryBuilder<'a, C> {
    /// Sets a default executable path for the client.
    ///
    /// Process-wide configuration (`CLAUDE_EXECUTABLE_PATH`) takes precedence
    /// over this value when both are set: a centrally configured environment
    /// overrides a default baked into calling code, but never overrides
    /// nothing. This inverts the usual explicit-argument-wins rule on
    /// purpose; callers surprised by it should unset the env var.
    pub fn executable_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options.executable_path = Some(path.into());
        self
    }

    /// Enables (`true`) or disables (`false`) the built-in message logger for
    /// this call, overriding the `MESSAGE_LOGS` env flag.
    pub fn log_messages(mut self, enabled: bool) -> Self {
        self.options.log_messages = Some(enabled);
        self
    }

    /// Installs a custom message observer for this call.
    ///
    /// Wins over `log_messages` and the `MESSAGE_LOGS` env flag.
    pub fn observer(mut self, observer: impl MessageObserver + 'static) -> Self {
        self.options.observer = Some(Arc::new(observer));
        self
    }

    /// Adds a client-specific option, passed through to the client unchanged.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.extra.insert(key.into(), value.into());
        self
    }

    /// Overrides the process-wide configuration for this call.
    pub fn config(mut self, config: ConduitConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Finalizes the request descriptor and starts the session.
    ///
    /// The factory itself does not fail; any error originates in the client
    /// and is propagated unchanged.
    pub async fn start(self) -> Result<ObservedSession<C::Session>, ClientError> {
        let config = match self.config.as_ref() {
            Some(config) => config,
            None => ConduitConfig::global(),
        };
        let executable_path = resolve_executable_path(
            config.executable_path.as_deref(),
            self.options.executable_path,
        );
        let observer = resolve_observer(
            self.options.observer,
            self.options.log_messages,
            config.log_messages,
        );
        debug!(
            client = self.client.name(),
            observed = observer.is_some(),
            "starting session"
        );

        let request = SessionRequest {
            prompt: self.prompt,
            options: SessionOptions {
                executable_path,
                extra: self.options.extra,
            },
        };
        let session = self.client.start_session(request).await?;
        Ok(ObservedSession::new(session, observer))
    }
}

/// Precedence law for the executable path: the configured value wins if
/// present, otherwise the caller-supplied value, otherwise absent.
fn resolve_executable_path(
    configured: Option<&Path>,
    requested: Option<PathBuf>,
) -> Option<PathBuf> {
    configured.map(Path::to_path_buf).or(requested)
}

/// Observer resolution: explicit observer, then the per-call flag, then the
/// process-wide flag. No observer at all means pure pass-through.
fn resolve_observer(
    explicit: Option<Arc<dyn MessageObserver>>,
    per_call_flag: Option<bool>,
    env_flag: bool,
) -> Option<Arc<dyn MessageObserver>> {
    if let Some(observer) = explicit {
        return Some(observer);
    }
    match per_call_flag {
        Some(true) => Some(Arc::new(JsonLogObserver)),
        Some(false) => None,
        None if env_flag => Some(Arc::new(JsonLogObserver)),
        None => None,
    }
}
