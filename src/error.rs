//! Error types for intake-bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Messaging gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to send message to chat {chat_id}: {reason}")]
    SendFailed { chat_id: i64, reason: String },

    #[error("Failed to delete message {message_id} in chat {chat_id}: {reason}")]
    DeleteFailed {
        chat_id: i64,
        message_id: i64,
        reason: String,
    },

    #[error("Webhook registration failed: {reason}")]
    WebhookSetup { reason: String },

    #[error("Gateway health check failed: {reason}")]
    HealthCheckFailed { reason: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Dispatch-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Malformed transport payload: {0}")]
    MalformedPayload(String),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
