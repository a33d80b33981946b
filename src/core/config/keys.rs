//! Named keys accepted by `agentchat set` / `agentchat unset`.

use std::fmt;
use std::str::FromStr;

use crate::core::config::data::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Endpoint,
    RequestTimeout,
    Title,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigKeyError {
    UnknownKey(String),
    InvalidValue { key: ConfigKey, value: String },
}

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKeyError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {key} (expected one of: {})",
                ConfigKey::ALL
                    .iter()
                    .map(|key| key.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            ConfigKeyError::InvalidValue { key, value } => {
                write!(f, "Invalid value for {}: {value}", key.as_str())
            }
        }
    }
}

impl std::error::Error for ConfigKeyError {}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::Endpoint,
        ConfigKey::RequestTimeout,
        ConfigKey::Title,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Endpoint => "endpoint",
            ConfigKey::RequestTimeout => "request-timeout",
            ConfigKey::Title => "title",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl Config {
    pub fn set_key(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let invalid = || ConfigKeyError::InvalidValue {
            key,
            value: value.to_string(),
        };

        match key {
            ConfigKey::Endpoint => {
                let url = reqwest::Url::parse(value).map_err(|_| invalid())?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(invalid());
                }
                self.endpoint = Some(value.to_string());
            }
            ConfigKey::RequestTimeout => {
                let secs: u64 = value.parse().map_err(|_| invalid())?;
                self.request_timeout_secs = Some(secs);
            }
            ConfigKey::Title => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.title = Some(value.to_string());
            }
        }
        Ok(())
    }

    pub fn unset_key(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::Endpoint => self.endpoint = None,
            ConfigKey::RequestTimeout => self.request_timeout_secs = None,
            ConfigKey::Title => self.title = None,
        }
    }
}
