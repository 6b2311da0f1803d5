use async_trait::async_trait;
use thiserror::Error;

use crate::arrival::{DispatchErrorKind, NotificationPayload};

/// Error returned by a push-provider implementation, already classified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Push provider error ({kind}): {detail}")]
pub struct PushError {
    pub kind: DispatchErrorKind,
    pub detail: String,
}

impl PushError {
    pub fn new(kind: DispatchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Port to the external push-notification provider.
/// Infrastructure layer (arrivo-fcm) implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Deliver a composed payload to its target token.
    ///
    /// Returns the provider-assigned message identifier on success. Any
    /// provider-level failure (invalid token, quota, outage, malformed
    /// payload) comes back as a classified [`PushError`].
    async fn send_notification(&self, payload: &NotificationPayload) -> Result<String, PushError>;
}
