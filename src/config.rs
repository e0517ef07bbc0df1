use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const CONFIG_FILE: &str = "scape-console.toml";
pub const BACKEND_URL_ENV: &str = "SCAPE_BACKEND_URL";
pub const TRANSPORT_ENV: &str = "SCAPE_TRANSPORT";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8080";

/// How topic feeds reach the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// One long-lived websocket per topic.
    Push,
    /// Periodic HTTP request per topic.
    Pull,
}

impl TransportMode {
    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Push => "push",
            TransportMode::Pull => "pull",
        }
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "push" | "ws" | "websocket" => Ok(TransportMode::Push),
            "pull" | "poll" | "http" => Ok(TransportMode::Pull),
            other => Err(ConfigError::InvalidValue {
                key: "transport".to_owned(),
                detail: format!("`{other}` (expected push or pull)"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollCadence {
    pub logs: Duration,
    pub progress: Duration,
    pub state: Duration,
}

impl Default for PollCadence {
    fn default() -> Self {
        Self {
            logs: Duration::from_millis(600),
            progress: Duration::from_millis(5000),
            state: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub backend_url: String,
    pub transport: TransportMode,
    pub reconnect_delay: Duration,
    pub poll: PollCadence,
    pub slider_debounce: Duration,
    pub log_retention_lines: usize,
    pub near_bottom_rows: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_owned(),
            transport: TransportMode::Push,
            reconnect_delay: Duration::from_millis(2000),
            poll: PollCadence::default(),
            slider_debounce: Duration::from_millis(150),
            log_retention_lines: 2000,
            near_bottom_rows: 5,
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    backend_url: Option<String>,
    #[serde(default)]
    transport: Option<TransportMode>,
    #[serde(default)]
    reconnect_delay_ms: Option<u64>,
    #[serde(default)]
    poll: Option<PollFile>,
    #[serde(default)]
    slider_debounce_ms: Option<u64>,
    #[serde(default)]
    log_retention_lines: Option<usize>,
    #[serde(default)]
    near_bottom_rows: Option<usize>,
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct PollFile {
    #[serde(default)]
    logs_ms: Option<u64>,
    #[serde(default)]
    progress_ms: Option<u64>,
    #[serde(default)]
    state_ms: Option<u64>,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub backend_url: Option<String>,
    pub transport: Option<TransportMode>,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    Parse {
        path: PathBuf,
        error: toml::de::Error,
    },
    InvalidValue {
        key: String,
        detail: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, error } => {
                write!(f, "failed to read config {}: {error}", path.display())
            }
            ConfigError::Parse { path, error } => {
                write!(f, "failed to parse config {}: {error}", path.display())
            }
            ConfigError::InvalidValue { key, detail } => {
                write!(f, "invalid value for `{key}`: {detail}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConsoleConfig {
    /// Resolves configuration in order: defaults, config file, environment,
    /// command-line overrides. A missing default config file is not an error;
    /// a missing explicit `--config` path is.
    pub fn resolve(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = match overrides.config_path.as_deref() {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml_str(&raw).map_err(|error| match error {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file = toml::from_str::<ConfigFile>(raw).map_err(|error| ConfigError::Parse {
            path: PathBuf::from(CONFIG_FILE),
            error,
        })?;
        let mut config = Self::default();
        config.apply_file(file);
        config.validate()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(url) = file.backend_url {
            self.backend_url = url;
        }
        if let Some(transport) = file.transport {
            self.transport = transport;
        }
        if let Some(ms) = file.reconnect_delay_ms {
            self.reconnect_delay = Duration::from_millis(ms);
        }
        if let Some(poll) = file.poll {
            if let Some(ms) = poll.logs_ms {
                self.poll.logs = Duration::from_millis(ms);
            }
            if let Some(ms) = poll.progress_ms {
                self.poll.progress = Duration::from_millis(ms);
            }
            if let Some(ms) = poll.state_ms {
                self.poll.state = Duration::from_millis(ms);
            }
        }
        if let Some(ms) = file.slider_debounce_ms {
            self.slider_debounce = Duration::from_millis(ms);
        }
        if let Some(lines) = file.log_retention_lines {
            self.log_retention_lines = lines;
        }
        if let Some(rows) = file.near_bottom_rows {
            self.near_bottom_rows = rows;
        }
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|value| !value.trim().is_empty()) {
            self.backend_url = url.trim().to_owned();
        }
        if let Some(raw) = lookup(TRANSPORT_ENV).filter(|value| !value.trim().is_empty()) {
            self.transport = raw.parse()?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.backend_url {
            self.backend_url = url.clone();
        }
        if let Some(transport) = overrides.transport {
            self.transport = transport;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let zero_checks = [
            ("reconnect_delay_ms", self.reconnect_delay),
            ("poll.logs_ms", self.poll.logs),
            ("poll.progress_ms", self.poll.progress),
            ("poll.state_ms", self.poll.state),
        ];
        for (key, value) in zero_checks {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_owned(),
                    detail: "must be greater than zero".to_owned(),
                });
            }
        }
        if self.log_retention_lines == 0 {
            return Err(ConfigError::InvalidValue {
                key: "log_retention_lines".to_owned(),
                detail: "must be greater than zero".to_owned(),
            });
        }
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "backend_url".to_owned(),
                detail: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
