//! Environment-driven configuration.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default listen port when `PORT` is not set.
const DEFAULT_PORT: u16 = 8080;

/// Bot configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token.
    pub bot_token: SecretString,
    /// Externally reachable base URL; the webhook is registered at
    /// `{webhook_base_url}/webhook`.
    pub webhook_base_url: String,
    /// Listen port for the webhook server.
    pub port: u16,
    /// Whether stale prompt/reply messages are deleted before each new prompt.
    pub cleanup_enabled: bool,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// `BOT_TOKEN` and `WEBHOOK_URL` are required; their absence is fatal.
    /// `PORT` defaults to 8080, `INTAKE_CLEANUP_PROMPTS` defaults to true.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = std::env::var("BOT_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("BOT_TOKEN".into()))?;

        let webhook_base_url = std::env::var("WEBHOOK_URL")
            .map_err(|_| ConfigError::MissingEnvVar("WEBHOOK_URL".into()))?
            .trim_end_matches('/')
            .to_string();

        let port = match std::env::var("PORT") {
            Ok(raw) => parse_port(&raw)?,
            Err(_) => DEFAULT_PORT,
        };

        let cleanup_enabled = match std::env::var("INTAKE_CLEANUP_PROMPTS") {
            Ok(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "INTAKE_CLEANUP_PROMPTS".into(),
                message: format!("expected true/false, got {raw:?}"),
            })?,
            Err(_) => true,
        };

        Ok(Self {
            bot_token: SecretString::from(bot_token),
            webhook_base_url,
            port,
            cleanup_enabled,
        })
    }

    /// Full webhook URL registered with the messaging platform.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.webhook_base_url)
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: "PORT".into(),
            message: format!("expected a port number, got {raw:?}"),
        })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
