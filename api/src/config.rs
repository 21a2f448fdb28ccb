use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use inboxcal_core::contacts::ContactDirectory;
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_COMPLETION_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SCHEDULE_BURST: u32 = 10;
const DEFAULT_SCHEDULE_REPLENISH_SECS: u64 = 6;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
    #[error("{var} is not a valid URL ('{value}'): {reason}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to load contacts from {path}: {reason}")]
    ContactsFile { path: PathBuf, reason: String },
}

/// Everything the server reads from the environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub completion: CompletionConfig,
    pub contacts_file: Option<PathBuf>,
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
    /// `None` disables rate limiting on scheduling.
    pub schedule_rate_limit: Option<RateLimitSettings>,
}

/// Settings for the outbound completion call.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_url: Url,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Token bucket per client IP: `burst` requests, one more every `replenish`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub burst: u32,
    pub replenish: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = parse_number(get("PORT"), "PORT", DEFAULT_PORT as u64)?;
        let port = u16::try_from(port).map_err(|_| ConfigError::InvalidNumber {
            var: "PORT",
            value: port.to_string(),
        })?;

        let api_url_raw =
            get("COMPLETION_API_URL").unwrap_or_else(|| DEFAULT_COMPLETION_URL.to_string());
        let api_url = Url::parse(&api_url_raw).map_err(|e| ConfigError::InvalidUrl {
            var: "COMPLETION_API_URL",
            value: api_url_raw.clone(),
            reason: e.to_string(),
        })?;

        let timeout_secs = parse_number(
            get("COMPLETION_TIMEOUT_SECS"),
            "COMPLETION_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidNumber {
                var: "COMPLETION_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }

        let completion = CompletionConfig {
            api_url,
            api_key: get("OPENAI_API_KEY"),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let cors_origins = get("CORS_ORIGINS").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let burst = parse_number(
            get("SCHEDULE_RATE_LIMIT_BURST"),
            "SCHEDULE_RATE_LIMIT_BURST",
            DEFAULT_SCHEDULE_BURST as u64,
        )?;
        let replenish_secs = parse_number(
            get("SCHEDULE_RATE_LIMIT_REPLENISH_SECS"),
            "SCHEDULE_RATE_LIMIT_REPLENISH_SECS",
            DEFAULT_SCHEDULE_REPLENISH_SECS,
        )?;
        let schedule_rate_limit = if burst == 0 || replenish_secs == 0 {
            None
        } else {
            Some(RateLimitSettings {
                burst: u32::try_from(burst).unwrap_or(u32::MAX),
                replenish: Duration::from_secs(replenish_secs),
            })
        };

        Ok(Self {
            port,
            completion,
            contacts_file: get("CONTACTS_FILE").map(PathBuf::from),
            cors_origins,
            schedule_rate_limit,
        })
    }

    /// Built-in contacts, overlaid with `CONTACTS_FILE` when configured.
    pub fn load_contacts(&self) -> Result<ContactDirectory, ConfigError> {
        let directory = ContactDirectory::builtin();
        let Some(path) = &self.contacts_file else {
            return Ok(directory);
        };

        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::ContactsFile {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let overrides =
            ContactDirectory::from_json(&source).map_err(|e| ConfigError::ContactsFile {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        Ok(directory.with_overrides(overrides))
    }
}

fn parse_number(raw: Option<String>, var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_from(&[]).expect("defaults are valid");
        assert_eq!(config.port, 3000);
        assert_eq!(config.completion.api_url.as_str(), DEFAULT_COMPLETION_URL);
        assert_eq!(config.completion.model, "gpt-4");
        assert_eq!(config.completion.api_key, None);
        assert_eq!(config.completion.timeout, Duration::from_secs(30));
        assert!(config.cors_origins.is_none());
        assert!(config.contacts_file.is_none());
        assert_eq!(
            config.schedule_rate_limit,
            Some(RateLimitSettings {
                burst: 10,
                replenish: Duration::from_secs(6),
            })
        );
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("COMPLETION_API_URL", "http://127.0.0.1:9999/v1/chat/completions"),
            ("COMPLETION_TIMEOUT_SECS", "5"),
            ("CORS_ORIGINS", "https://a.example, ,https://b.example"),
            ("SCHEDULE_RATE_LIMIT_BURST", "0"),
        ])
        .expect("valid overrides");

        assert_eq!(config.port, 8080);
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.completion.model, "gpt-4o-mini");
        assert_eq!(config.completion.timeout, Duration::from_secs(5));
        assert_eq!(
            config.cors_origins,
            Some(vec![
                "https://a.example".to_string(),
                "https://b.example".to_string()
            ])
        );
        assert!(config.schedule_rate_limit.is_none());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("OPENAI_API_KEY", "   ")]).expect("valid");
        assert_eq!(config.completion.api_key, None);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidNumber { var: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("PORT", "70000")]),
            Err(ConfigError::InvalidNumber { var: "PORT", .. })
        ));
        assert!(matches!(
            config_from(&[("COMPLETION_API_URL", "not a url")]),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            config_from(&[("COMPLETION_TIMEOUT_SECS", "0")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = config_from(&[("OPENAI_API_KEY", "sk-secret-value")]).expect("valid");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn missing_contacts_file_is_reported() {
        let config = config_from(&[("CONTACTS_FILE", "/definitely/not/here.json")])
            .expect("path is only read on load");
        assert!(matches!(
            config.load_contacts(),
            Err(ConfigError::ContactsFile { .. })
        ));
    }

    #[test]
    fn contacts_default_to_builtins() {
        let config = config_from(&[]).expect("valid");
        let contacts = config.load_contacts().expect("builtins");
        assert_eq!(contacts.resolve("Alex"), Ok("alex@company.com"));
    }
}
