//! Messaging gateway — outbound side of the Telegram Bot API.
//!
//! The dispatcher talks to the gateway through the `MessagingGateway` trait;
//! `TelegramGateway` is the production implementation over HTTPS.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::GatewayError;

/// Reply-keyboard hint attached to an outbound message. A hint only — the
/// user can always type free text instead of tapping a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Si/No one-row reply keyboard.
    YesNo,
    /// Remove any previously shown reply keyboard.
    Remove,
    /// No markup.
    None,
}

impl Keyboard {
    /// The `reply_markup` JSON for this hint, if any.
    fn reply_markup(&self) -> Option<serde_json::Value> {
        match self {
            Keyboard::YesNo => Some(serde_json::json!({
                "keyboard": [[{"text": "Si"}, {"text": "No"}]],
                "resize_keyboard": true,
            })),
            Keyboard::Remove => Some(serde_json::json!({"remove_keyboard": true})),
            Keyboard::None => None,
        }
    }
}

/// Outbound messaging operations the dispatcher depends on.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a text message, returning the gateway-assigned message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<i64, GatewayError>;

    /// Delete a previously sent message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), GatewayError>;
}

/// Telegram Bot API gateway.
pub struct TelegramGateway {
    bot_token: SecretString,
    client: reqwest::Client,
}

impl TelegramGateway {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "https://api.telegram.org/bot{}/{method}",
            self.bot_token.expose_secret()
        )
    }

    /// POST a Bot API method, returning the decoded response body.
    async fn call(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        if !status.is_success() || data.get("ok").and_then(serde_json::Value::as_bool) != Some(true)
        {
            let description = data
                .get("description")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("no description");
            return Err(GatewayError::Http(format!(
                "{method} returned {status}: {description}"
            )));
        }

        Ok(data)
    }

    /// Register the webhook URL with the Bot API.
    pub async fn set_webhook(&self, url: &str) -> Result<(), GatewayError> {
        self.call("setWebhook", &serde_json::json!({ "url": url }))
            .await
            .map_err(|e| GatewayError::WebhookSetup {
                reason: e.to_string(),
            })?;
        tracing::info!(url, "Webhook registered");
        Ok(())
    }

    /// Deregister the webhook.
    pub async fn delete_webhook(&self) -> Result<(), GatewayError> {
        self.call("deleteWebhook", &serde_json::json!({}))
            .await
            .map_err(|e| GatewayError::WebhookSetup {
                reason: e.to_string(),
            })?;
        tracing::info!("Webhook deregistered");
        Ok(())
    }

    /// Verify the token against the Bot API via `getMe`.
    pub async fn health_check(&self) -> Result<(), GatewayError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| GatewayError::HealthCheckFailed {
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::HealthCheckFailed {
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Keyboard,
    ) -> Result<i64, GatewayError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(markup) = keyboard.reply_markup() {
            body["reply_markup"] = markup;
        }

        let data = self
            .call("sendMessage", &body)
            .await
            .map_err(|e| GatewayError::SendFailed {
                chat_id,
                reason: e.to_string(),
            })?;

        data.get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| GatewayError::SendFailed {
                chat_id,
                reason: "sendMessage response missing result.message_id".into(),
            })
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<(), GatewayError> {
        self.call(
            "deleteMessage",
            &serde_json::json!({
                "chat_id": chat_id,
                "message_id": message_id,
            }),
        )
        .await
        .map_err(|e| GatewayError::DeleteFailed {
            chat_id,
            message_id,
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_embeds_token_and_method() {
        let gw = TelegramGateway::new(SecretString::from("123:ABC"));
        assert_eq!(
            gw.api_url("sendMessage"),
            "https://api.telegram.org/bot123:ABC/sendMessage"
        );
        assert_eq!(gw.api_url("getMe"), "https://api.telegram.org/bot123:ABC/getMe");
    }

    #[test]
    fn yes_no_keyboard_markup() {
        let markup = Keyboard::YesNo.reply_markup().unwrap();
        assert_eq!(markup["resize_keyboard"], true);
        assert_eq!(markup["keyboard"][0][0]["text"], "Si");
        assert_eq!(markup["keyboard"][0][1]["text"], "No");
    }

    #[test]
    fn remove_keyboard_markup() {
        let markup = Keyboard::Remove.reply_markup().unwrap();
        assert_eq!(markup["remove_keyboard"], true);
    }

    #[test]
    fn no_keyboard_has_no_markup() {
        assert!(Keyboard::None.reply_markup().is_none());
    }
}
