use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use arrivo_domain::{DispatchErrorKind, NotificationPayload, PushError, PushProvider};
use async_trait::async_trait;
use gcp_auth::TokenProvider;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::FcmConfig;
use crate::message::{FcmErrorResponse, FcmMessage, SendMessageRequest, SendMessageResponse};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];

/// FCM HTTP v1 implementation of [`PushProvider`].
///
/// Authenticates with a GCP token provider discovered from the environment
/// and classifies every provider-level failure into a [`PushError`].
pub struct FcmPushProvider {
    config: FcmConfig,
    token_provider: Arc<dyn TokenProvider>,
    client: reqwest::Client,
}

// Manual Debug implementation since TokenProvider doesn't implement Debug
impl fmt::Debug for FcmPushProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmPushProvider")
            .field("config", &self.config)
            .field("token_provider", &"<TokenProvider>")
            .field("client", &self.client)
            .finish()
    }
}

impl FcmPushProvider {
    /// Creates a new provider, discovering GCP credentials from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or GCP authentication
    /// cannot be initialized.
    pub async fn new(config: FcmConfig) -> Result<Self> {
        if config.project_id.is_empty() {
            anyhow::bail!("fcm project_id cannot be empty");
        }
        if config.request_timeout.is_zero() {
            anyhow::bail!("fcm request_timeout must be greater than zero");
        }

        let token_provider = gcp_auth::provider()
            .await
            .map_err(|e| anyhow::anyhow!("failed to initialize GCP auth: {e}"))?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            config,
            token_provider,
            client,
        })
    }

    async fn access_token(&self) -> Result<String, PushError> {
        let token = self.token_provider.token(FCM_SCOPES).await.map_err(|e| {
            PushError::new(
                DispatchErrorKind::ProviderUnavailable,
                format!("failed to obtain access token: {e}"),
            )
        })?;

        Ok(token.as_str().to_string())
    }

    /// Classify a Google error `status` string, falling back to the HTTP code.
    fn classify(status: &str, http_status: StatusCode) -> DispatchErrorKind {
        match status {
            "UNREGISTERED" | "SENDER_ID_MISMATCH" | "INVALID_ARGUMENT" => {
                DispatchErrorKind::InvalidToken
            }
            "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => DispatchErrorKind::QuotaExceeded,
            "UNAVAILABLE" | "INTERNAL" | "DEADLINE_EXCEEDED" => {
                DispatchErrorKind::ProviderUnavailable
            }
            _ => Self::classify_http(http_status),
        }
    }

    fn classify_http(status: StatusCode) -> DispatchErrorKind {
        if status == StatusCode::TOO_MANY_REQUESTS {
            DispatchErrorKind::QuotaExceeded
        } else if status.is_server_error() {
            DispatchErrorKind::ProviderUnavailable
        } else {
            DispatchErrorKind::Unknown
        }
    }
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    async fn send_notification(&self, payload: &NotificationPayload) -> Result<String, PushError> {
        let request = SendMessageRequest {
            message: FcmMessage::from_payload(payload),
        };

        let access_token = self.access_token().await?;
        let url = self.config.send_url();

        debug!(project_id = %self.config.project_id, "sending FCM message");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                PushError::new(
                    DispatchErrorKind::ProviderUnavailable,
                    format!("FCM request failed: {e}"),
                )
            })?;

        let http_status = response.status();

        if http_status.is_success() {
            let success: SendMessageResponse = response.json().await.map_err(|e| {
                PushError::new(
                    DispatchErrorKind::Unknown,
                    format!("failed to parse FCM response: {e}"),
                )
            })?;

            debug!(provider_message_id = %success.name, "FCM message accepted");
            return Ok(success.name);
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if let Ok(parsed) = serde_json::from_str::<FcmErrorResponse>(&error_body) {
            Err(PushError::new(
                Self::classify(&parsed.error.status, http_status),
                format!("{} ({})", parsed.error.message, parsed.error.status),
            ))
        } else {
            Err(PushError::new(
                Self::classify_http(http_status),
                format!("FCM error: {http_status} - {error_body}"),
            ))
        }
    }
}
