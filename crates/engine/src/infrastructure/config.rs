//! Engine configuration resolved from environment variables.

use std::fmt::Display;
use std::str::FromStr;

use crate::infrastructure::ollama::{
    DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL, DEFAULT_TIMEOUT_SECS,
};

pub const DEFAULT_DATABASE_URL: &str = "sqlite:questionspark.db?mode=rwc";
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub llm: LlmConfig,
    /// Comma-separated origins, or `*`. CORS is off when unset.
    pub cors_allowed_origins: Option<String>,
}

/// Settings for the OpenAI-compatible story generator backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Bounds both the HTTP request and the whole generation call.
    pub timeout_secs: u64,
}

impl EngineConfig {
    /// Read the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |keys: &[&str]| {
            keys.iter()
                .filter_map(|&key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        Self {
            database_url: get(&["DATABASE_URL"]).unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            server_host: get(&["SERVER_HOST"]).unwrap_or_else(|| DEFAULT_SERVER_HOST.into()),
            server_port: parse_or(
                "SERVER_PORT",
                get(&["SERVER_PORT", "PORT"]),
                DEFAULT_SERVER_PORT,
            ),
            llm: LlmConfig {
                base_url: get(&["LLM_BASE_URL", "OLLAMA_BASE_URL"])
                    .unwrap_or_else(|| DEFAULT_OLLAMA_BASE_URL.into()),
                model: get(&["LLM_MODEL", "OLLAMA_MODEL"])
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
                api_key: get(&["LLM_API_KEY"]),
                temperature: parse_or(
                    "LLM_TEMPERATURE",
                    get(&["LLM_TEMPERATURE"]),
                    DEFAULT_TEMPERATURE,
                ),
                max_tokens: parse_where(
                    "LLM_MAX_TOKENS",
                    get(&["LLM_MAX_TOKENS"]),
                    DEFAULT_MAX_TOKENS,
                    |&tokens| tokens > 0,
                ),
                timeout_secs: parse_where(
                    "LLM_TIMEOUT_SECS",
                    get(&["LLM_TIMEOUT_SECS"]),
                    DEFAULT_TIMEOUT_SECS,
                    |&secs| secs > 0,
                ),
            },
            cors_allowed_origins: get(&["CORS_ALLOWED_ORIGINS"]),
        }
    }

    /// Host and port for the listener. The host may be a name (`localhost`) or an IPv4/IPv6
    /// address, so it is resolved at bind time rather than parsed here.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.server_host.as_str(), self.server_port)
    }
}

fn parse_or<T: FromStr + Copy + Display>(key: &str, raw: Option<String>, default: T) -> T {
    parse_where(key, raw, default, |_| true)
}

/// Parse `raw`, falling back to `default` when it does not parse or `accept` rejects it.
fn parse_where<T: FromStr + Copy + Display>(
    key: &str,
    raw: Option<String>,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse::<T>() {
        Ok(value) if accept(&value) => value,
        _ => {
            tracing::warn!(
                key,
                value = %raw,
                fallback = %default,
                "Unusable setting, using default"
            );
            default
        }
    }
}
