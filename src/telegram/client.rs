use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use super::messenger::Messenger;
use super::types::{ApiResponse, OutgoingMessage, Update, User};

const API_BASE: &str = "https://api.telegram.org";

/// Seconds the server holds a `getUpdates` request open
pub const LONG_POLL_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },
}

/// Blocking Bot API client
pub struct BotClient {
    client: Client,
    base_url: String,
}

impl BotClient {
    pub fn new(token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(API_BASE, token)
    }

    /// Client for a self-hosted Bot API server
    pub fn with_base_url(api_base: &str, token: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent("catch-character-bot")
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()?
            .json()?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(ApiError::Api {
                code: response.error_code.unwrap_or(0),
                description: response
                    .description
                    .unwrap_or_else(|| format!("{} returned no result", method)),
            }),
        }
    }

    /// Fetch the bot's own account, which also validates the token
    pub fn get_me(&self) -> Result<User, ApiError> {
        self.call("getMe", &json!({}))
    }

    /// Long-poll for updates with id >= `offset`
    pub fn get_updates(&self, offset: i64) -> Result<Vec<Update>, ApiError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": LONG_POLL_SECS,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
    }
}

impl Messenger for BotClient {
    fn send_message(&self, message: &OutgoingMessage) -> Result<(), ApiError> {
        let _: serde_json::Value = self.call("sendMessage", message)?;
        Ok(())
    }

    fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), ApiError> {
        let mut body = json!({ "callback_query_id": callback_query_id, "show_alert": show_alert });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        let _: bool = self.call("answerCallbackQuery", &body)?;
        Ok(())
    }

    fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<(), ApiError> {
        let _: serde_json::Value = self.call(
            "editMessageText",
            &json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        let client = BotClient::with_base_url("http://localhost:8081/", "123:abc").unwrap();
        assert_eq!(client.base_url, "http://localhost:8081/bot123:abc");
    }

    #[test]
    fn test_error_envelope() {
        let response: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok": false, "error_code": 400, "description": "Bad Request: query is too old"}"#,
        )
        .unwrap();
        assert!(!response.ok);
        assert_eq!(response.error_code, Some(400));
        assert!(response.result.is_none());
    }
}
