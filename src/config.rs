//! Configuration supplied by the environment, optionally via a `.env` file.

use crate::slack::{ChannelId, SlackAccessToken, API_BASE};
use std::{env, fmt};

pub const TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
pub const CHANNEL_VAR: &str = "SLACK_CHANNEL_ID";
pub const API_BASE_VAR: &str = "SLACK_API_BASE";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: SlackAccessToken,
    /// Where messages go unless told otherwise.
    pub default_channel: ChannelId,
    pub api_base: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(f, "No ${} environment variable found", var),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Read configuration from the process environment. Values aren't
    /// validated here; Slack will reject bad credentials soon enough.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |k: &'static str| {
            lookup(k)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(k))
        };

        Ok(Config {
            bot_token: SlackAccessToken(required(TOKEN_VAR)?),
            default_channel: ChannelId(required(CHANNEL_VAR)?),
            api_base: lookup(API_BASE_VAR).unwrap_or_else(|| API_BASE.to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (TOKEN_VAR, "xoxb-foo"),
            (CHANNEL_VAR, "C123"),
        ]))
        .unwrap();

        assert_eq!(config.bot_token, SlackAccessToken("xoxb-foo".into()));
        assert_eq!(config.default_channel, ChannelId::from("C123"));
        assert_eq!(config.api_base, API_BASE);
    }

    #[test]
    fn test_api_base_override() {
        let config = Config::from_lookup(lookup(&[
            (TOKEN_VAR, "xoxb-foo"),
            (CHANNEL_VAR, "C123"),
            (API_BASE_VAR, "http://localhost:1234"),
        ]))
        .unwrap();

        assert_eq!(config.api_base, "http://localhost:1234");
    }

    #[test]
    fn test_missing() {
        assert_eq!(
            Config::from_lookup(lookup(&[(CHANNEL_VAR, "C123")])).unwrap_err(),
            ConfigError::Missing(TOKEN_VAR)
        );
        assert_eq!(
            Config::from_lookup(lookup(&[(TOKEN_VAR, "xoxb-foo"), (CHANNEL_VAR, " ")]))
                .unwrap_err(),
            ConfigError::Missing(CHANNEL_VAR)
        );
    }
}
