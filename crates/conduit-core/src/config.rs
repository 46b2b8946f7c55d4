use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing::info;

static GLOBAL: OnceCell<ConduitConfig> = OnceCell::new();
static SUMMARY: OnceCell<()> = OnceCell::new();

/// Process-wide configuration, read from the environment exactly once and
/// immutable afterwards.
///
/// Absent values are a legal state; nothing here is validated. Clients decide
/// what an absent value means for them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConduitConfig {
    /// `ANTHROPIC_BASE_URL`: base endpoint override passed to the client.
    pub base_url: Option<String>,
    /// `ANTHROPIC_AUTH_TOKEN`: auth token passed to the client.
    pub auth_token: Option<String>,
    /// `ANTHROPIC_CUSTOM_HEADERS`: custom header block. The literal token
    /// `$PWD` is substituted with the current working directory.
    pub custom_headers: Option<String>,
    /// `CLAUDE_EXECUTABLE_PATH`: executable-path override consumed by the
    /// session factory. Takes precedence over per-call values.
    pub executable_path: Option<PathBuf>,
    /// `MESSAGE_LOGS`: turns on the built-in message observer for every
    /// session that does not configure logging itself.
    pub log_messages: bool,
}

impl ConduitConfig {
    /// Reads the configuration from the current process environment.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        Self {
            base_url: read_env("ANTHROPIC_BASE_URL"),
            auth_token: read_env("ANTHROPIC_AUTH_TOKEN"),
            custom_headers: read_env("ANTHROPIC_CUSTOM_HEADERS")
                .map(|raw| substitute_pwd(&raw, &cwd)),
            executable_path: read_env("CLAUDE_EXECUTABLE_PATH").map(PathBuf::from),
            log_messages: read_env("MESSAGE_LOGS")
                .as_deref()
                .and_then(parse_bool_env)
                .unwrap_or(false),
        }
    }

    /// Returns the process-wide configuration, reading the environment on
    /// first use.
    pub fn global() -> &'static ConduitConfig {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Logs a one-time summary of the resolved configuration at info level.
    ///
    /// Gated by `SHOW_CONFIG` (default on). The auth token is truncated to
    /// its first characters.
    pub fn log_summary(&self) {
        let enabled = read_env("SHOW_CONFIG")
            .as_deref()
            .and_then(parse_bool_env)
            .unwrap_or(true);
        if !enabled {
            return;
        }
        SUMMARY.get_or_init(|| {
            info!("using API configuration:");
            info!("- base URL: {}", display_or_unset(self.base_url.as_deref()));
            info!(
                "- token: {}",
                self.auth_token
                    .as_deref()
                    .map_or_else(|| "(unset)".to_string(), truncate_token)
            );
            info!(
                "- custom headers: {}",
                display_or_unset(self.custom_headers.as_deref())
            );
            info!(
                "- working dir: {}",
                std::env::current_dir()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default()
            );
            info!(
                "- executable path: {}",
                self.executable_path
                    .as_deref()
                    .map_or_else(|| "(unset)".to_string(), |p| p.display().to_string())
            );
        });
    }
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

pub(crate) fn parse_bool_env(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn substitute_pwd(raw: &str, cwd: &str) -> String {
    raw.replace("$PWD", cwd)
}

fn truncate_token(token: &str) -> String {
    let head: String = token.chars().take(8).collect();
    format!("{head}...")
}

fn display_or_unset(value: Option<&str>) -> String {
    value.map_or_else(|| "(unset)".to_string(), ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_env_accepts_common_spellings() {
        for value in ["1", "true", "YES", " on ", "Enabled"] {
            assert_eq!(parse_bool_env(value), Some(true), "value {value:?}");
        }
        for value in ["0", "false", "No", "off", "DISABLED"] {
            assert_eq!(parse_bool_env(value), Some(false), "value {value:?}");
        }
        assert_eq!(parse_bool_env("maybe"), None);
        assert_eq!(parse_bool_env(""), None);
    }

    #[test]
    fn pwd_token_is_substituted_into_headers() {
        let substituted = substitute_pwd("X-Workspace: $PWD", "/work/repo");
        assert_eq!(substituted, "X-Workspace: /work/repo");
        assert_eq!(substitute_pwd("no token", "/work"), "no token");
    }

    #[test]
    fn token_is_truncated_for_the_summary() {
        assert_eq!(truncate_token("sk-ant-abcdef123456"), "sk-ant-a...");
        assert_eq!(truncate_token("abc"), "abc...");
    }

    #[test]
    fn default_config_is_fully_unset() {
        let config = ConduitConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.executable_path, None);
        assert!(!config.log_messages);
    }
}
