use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::config::SmsConfig;
use crate::core::error::AppError;

/// Vendor acknowledgement of an accepted message
#[derive(Debug, Clone)]
pub struct SmsReceipt {
    pub message_id: String,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    #[error("Failed to reach SMS provider: {0}")]
    Transport(String),

    #[error("SMS provider rejected message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse SMS provider response: {0}")]
    ParseError(String),
}

impl From<SmsError> for AppError {
    fn from(err: SmsError) -> Self {
        AppError::ExternalServiceError(err.to_string())
    }
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError>;
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

/// Twilio-style REST client (form-encoded, basic auth)
pub struct SmsClient {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsClient {
    pub fn new(config: SmsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for SmsClient {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to),
                ("From", self.config.from_number.as_str()),
                ("Body", body),
            ])
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.message)
                .unwrap_or(text);
            return Err(SmsError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let message: MessageResponse = response
            .json()
            .await
            .map_err(|e| SmsError::ParseError(e.to_string()))?;

        tracing::debug!("SMS accepted by provider: sid={}", message.sid);

        Ok(SmsReceipt {
            message_id: message.sid,
            status: message.status,
        })
    }
}

/// Sender used when SMS is disabled; writes the message to the log
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send(&self, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        tracing::info!("SMS disabled, would send to {}: {}", to, body);

        Ok(SmsReceipt {
            message_id: format!("log-{}", Uuid::now_v7()),
            status: "logged".to_string(),
        })
    }
}

pub fn build_sender(config: &SmsConfig) -> Arc<dyn SmsSender> {
    if config.enabled {
        Arc::new(SmsClient::new(config.clone()))
    } else {
        Arc::new(LogSmsSender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(enabled: bool) -> SmsConfig {
        SmsConfig {
            enabled,
            api_base_url: "https://sms.example.test/2010-04-01/".to_string(),
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+15550000000".to_string(),
        }
    }

    #[test]
    fn test_messages_url() {
        let client = SmsClient::new(config(true));
        assert_eq!(
            client.messages_url(),
            "https://sms.example.test/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_log_sender_always_accepts() {
        let sender = build_sender(&config(false));
        let receipt = sender.send("+14155550123", "hello").await.unwrap();

        assert_eq!(receipt.status, "logged");
        assert!(receipt.message_id.starts_with("log-"));
    }

    #[test]
    fn test_error_maps_to_bad_gateway() {
        let err: AppError = SmsError::Rejected {
            status: 400,
            message: "invalid To".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_GATEWAY);
    }
}
