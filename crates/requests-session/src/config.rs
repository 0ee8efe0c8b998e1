//! Session and per-call client configuration.

use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default session timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Environment variable names.
pub mod vars {
    pub const REQUESTS_TIMEOUT: &str = "REQUESTS_TIMEOUT";
    pub const REQUESTS_USER_AGENT: &str = "REQUESTS_USER_AGENT";
    pub const REQUESTS_COOKIES: &str = "REQUESTS_COOKIES";
}

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    #[error("invalid timeout {0}: expected -1, 0 or a positive number of seconds")]
    InvalidTimeout(i64),

    #[error("invalid timeout {0}: expected -1, 0 or a positive number of seconds")]
    InvalidFractionalTimeout(f64),
}

/// Request timeout setting.
///
/// In seconds form, `-1` disables the timeout and `0` leaves the current
/// setting unchanged. Durations with a fractional part serialize as
/// fractional seconds (`0.5`), whole ones as integers. A zero duration has no
/// seconds form of its own and serializes as `0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Seconds", try_from = "Seconds")]
pub enum Timeout {
    #[default]
    Unchanged,
    Never,
    After(Duration),
}

impl Timeout {
    /// Parse the seconds form.
    pub fn from_secs(secs: i64) -> Result<Self, ConfigError> {
        match secs {
            -1 => Ok(Timeout::Never),
            0 => Ok(Timeout::Unchanged),
            n if n > 0 => Ok(Timeout::After(Duration::from_secs(n as u64))),
            n => Err(ConfigError::InvalidTimeout(n)),
        }
    }

    /// The duration to hand to the client, `None` meaning no limit.
    pub fn duration(self) -> Option<Duration> {
        match self {
            Timeout::After(d) => Some(d),
            Timeout::Never | Timeout::Unchanged => None,
        }
    }
}

/// Serialized seconds form of a [`Timeout`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(i64),
    Fractional(f64),
}

impl From<Timeout> for Seconds {
    fn from(t: Timeout) -> Self {
        match t {
            Timeout::Unchanged => Seconds::Whole(0),
            Timeout::Never => Seconds::Whole(-1),
            Timeout::After(d) if d.subsec_nanos() == 0 => {
                Seconds::Whole(i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            }
            Timeout::After(d) => Seconds::Fractional(d.as_secs_f64()),
        }
    }
}

impl TryFrom<Seconds> for Timeout {
    type Error = ConfigError;

    fn try_from(secs: Seconds) -> Result<Self, Self::Error> {
        match secs {
            Seconds::Whole(n) => Timeout::from_secs(n),
            Seconds::Fractional(f) if f == -1.0 => Ok(Timeout::Never),
            Seconds::Fractional(f) if f == 0.0 => Ok(Timeout::Unchanged),
            Seconds::Fractional(f) if f > 0.0 => Duration::try_from_secs_f64(f)
                .map(Timeout::After)
                .map_err(|_| ConfigError::InvalidFractionalTimeout(f)),
            Seconds::Fractional(f) => Err(ConfigError::InvalidFractionalTimeout(f)),
        }
    }
}

/// Client settings that can be set on a session or overridden per call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub timeout: Timeout,
}

impl ClientConfig {
    /// Config with only a timeout set.
    pub fn with_timeout(timeout: Timeout) -> Self {
        Self { timeout }
    }

    /// Apply the fields of `update` that are not `Unchanged`.
    pub fn update(&mut self, update: ClientConfig) {
        if update.timeout != Timeout::Unchanged {
            self.timeout = update.timeout;
        }
    }

    /// Resolve the timeout for a single call against these defaults.
    pub fn effective_timeout(&self, call: Option<&ClientConfig>) -> Option<Duration> {
        let mut resolved = *self;
        if let Some(call) = call {
            resolved.update(*call);
        }
        resolved.timeout.duration()
    }
}

/// Session construction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Default timeout in seconds (`-1` for none).
    pub timeout_secs: i64,
    /// Overrides the default `User-Agent`.
    pub user_agent: Option<String>,
    /// Keep a cookie jar across requests.
    pub cookie_store: bool,
    /// Headers sent with every request unless overridden per call.
    pub default_headers: IndexMap<String, String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: None,
            cookie_store: true,
            default_headers: IndexMap::new(),
        }
    }
}

impl SessionConfig {
    /// Parse a YAML document, expanding `${VAR}` and `${VAR:-default}`.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content)?;
        let config: SessionConfig =
            serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    /// Defaults overridden by `REQUESTS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(v) = std::env::var(vars::REQUESTS_TIMEOUT) {
            config.timeout_secs = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: vars::REQUESTS_TIMEOUT.to_string(),
                message: "expected integer".to_string(),
            })?;
        }

        if let Ok(v) = std::env::var(vars::REQUESTS_USER_AGENT) {
            config.user_agent = Some(v);
        }

        if let Ok(v) = std::env::var(vars::REQUESTS_COOKIES) {
            config.cookie_store = matches!(v.to_lowercase().as_str(), "true" | "1" | "yes");
        }

        config.validate()?;
        Ok(config)
    }

    /// Session default client config.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let timeout = match Timeout::from_secs(self.timeout_secs)? {
            // A zero session default has nothing to leave unchanged.
            Timeout::Unchanged => Timeout::After(Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64)),
            t => t,
        };
        Ok(ClientConfig { timeout })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        Timeout::from_secs(self.timeout_secs).map(|_| ())
    }
}

fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut result = content.to_string();
    let re = regex::Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").map_err(|e| {
        ConfigError::ParseError {
            line: None,
            message: e.to_string(),
        }
    })?;

    for cap in re.captures_iter(content) {
        let full_match = &cap[0];
        let var_name = &cap[1];
        let default = cap.get(2).map(|m| m.as_str());

        let value = match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => match default {
                Some(d) => d.to_string(),
                None => {
                    return Err(ConfigError::EnvVarNotFound {
                        var: var_name.to_string(),
                    })
                }
            },
        };

        result = result.replace(full_match, &value);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_from_secs() {
        assert_eq!(Timeout::from_secs(-1).unwrap(), Timeout::Never);
        assert_eq!(Timeout::from_secs(0).unwrap(), Timeout::Unchanged);
        assert_eq!(
            Timeout::from_secs(5).unwrap(),
            Timeout::After(Duration::from_secs(5))
        );
        assert!(matches!(
            Timeout::from_secs(-2),
            Err(ConfigError::InvalidTimeout(-2))
        ));
    }

    #[test]
    fn test_update_leaves_unchanged_alone() {
        let mut config = ClientConfig::with_timeout(Timeout::After(Duration::from_secs(10)));
        config.update(ClientConfig::default());
        assert_eq!(config.timeout, Timeout::After(Duration::from_secs(10)));

        config.update(ClientConfig::with_timeout(Timeout::Never));
        assert_eq!(config.timeout, Timeout::Never);
    }

    #[test]
    fn test_effective_timeout() {
        let session = ClientConfig::with_timeout(Timeout::After(Duration::from_secs(10)));
        assert_eq!(session.effective_timeout(None), Some(Duration::from_secs(10)));

        let call = ClientConfig::with_timeout(Timeout::After(Duration::from_secs(2)));
        assert_eq!(session.effective_timeout(Some(&call)), Some(Duration::from_secs(2)));

        let never = ClientConfig::with_timeout(Timeout::Never);
        assert_eq!(session.effective_timeout(Some(&never)), None);

        let unchanged = ClientConfig::default();
        assert_eq!(
            session.effective_timeout(Some(&unchanged)),
            Some(Duration::from_secs(10))
        );
        // The session defaults are not touched by resolution.
        assert_eq!(session.timeout, Timeout::After(Duration::from_secs(10)));
    }

    #[test]
    fn test_default_session_config() {
        let config = SessionConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert!(config.cookie_store);
        assert!(config.user_agent.is_none());
        assert_eq!(
            config.client_config().unwrap().timeout,
            Timeout::After(Duration::from_secs(10))
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = SessionConfig::from_yaml_str("timeout_secs: -1\n").unwrap();
        assert_eq!(config.timeout_secs, -1);
        assert!(config.cookie_store);
        assert_eq!(config.client_config().unwrap().timeout, Timeout::Never);
    }

    #[test]
    fn test_yaml_env_expansion_default() {
        let yaml = "user_agent: ${REQUESTS_TEST_UNSET_AGENT:-tester/1.0}\n";
        let config = SessionConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.user_agent.as_deref(), Some("tester/1.0"));
    }

    #[test]
    fn test_yaml_missing_env_var() {
        let yaml = "user_agent: ${REQUESTS_TEST_UNSET_AGENT_NO_DEFAULT}\n";
        let err = SessionConfig::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_yaml_rejects_bad_timeout() {
        let err = SessionConfig::from_yaml_str("timeout_secs: -5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(-5)));
    }

    #[test]
    fn test_sub_second_timeout_round_trips() {
        for millis in [500, 1500, 1] {
            let config =
                ClientConfig::with_timeout(Timeout::After(Duration::from_millis(millis)));
            let yaml = serde_yaml::to_string(&config).unwrap();
            assert_ne!(yaml.trim(), "timeout: 0");
            let parsed: ClientConfig = serde_yaml::from_str(&yaml).unwrap();
            assert_eq!(parsed, config, "round trip of {millis} ms via {yaml:?}");
        }

        let half = ClientConfig::with_timeout(Timeout::After(Duration::from_millis(500)));
        assert_eq!(serde_yaml::to_string(&half).unwrap().trim(), "timeout: 0.5");
    }

    #[test]
    fn test_fractional_timeout_parsing() {
        let parsed: ClientConfig = serde_yaml::from_str("timeout: 0.25").unwrap();
        assert_eq!(parsed.timeout, Timeout::After(Duration::from_millis(250)));
        let parsed: ClientConfig = serde_yaml::from_str("timeout: -1.0").unwrap();
        assert_eq!(parsed.timeout, Timeout::Never);
        assert!(serde_yaml::from_str::<ClientConfig>("timeout: -0.5").is_err());
    }

    #[test]
    fn test_client_config_serializes_seconds() {
        let config = ClientConfig::with_timeout(Timeout::After(Duration::from_secs(3)));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert_eq!(yaml.trim(), "timeout: 3");
        let parsed: ClientConfig = serde_yaml::from_str("timeout: -1").unwrap();
        assert_eq!(parsed.timeout, Timeout::Never);
        assert_eq!(serde_yaml::from_str::<ClientConfig>(&yaml).unwrap(), config);
    }
}
