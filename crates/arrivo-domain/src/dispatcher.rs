use std::sync::Arc;

use tracing::{debug, warn};

use crate::arrival::{DispatchOutcome, NotificationPayload};
use crate::push_provider::PushProvider;

/// Sends composed payloads through the push provider and normalizes the result.
///
/// Dispatch never raises past this boundary: every provider error becomes
/// [`DispatchOutcome::Failed`], so the orchestrator decides what to persist.
/// No retry here; a push token is single-use-sensitive and a blind retry can
/// duplicate user-visible notifications.
pub struct NotificationDispatcher {
    provider: Arc<dyn PushProvider>,
}

impl NotificationDispatcher {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    /// Perform exactly one dispatch attempt for the payload.
    pub async fn dispatch(&self, payload: &NotificationPayload) -> DispatchOutcome {
        debug!(target_suffix = %token_suffix(&payload.target), "dispatching notification");

        match self.provider.send_notification(payload).await {
            Ok(message_id) => {
                debug!(provider_message_id = %message_id, "notification dispatched");
                DispatchOutcome::Sent {
                    provider_message_id: message_id,
                }
            }
            Err(err) => {
                warn!(kind = %err.kind, detail = %err.detail, "notification dispatch failed");
                DispatchOutcome::Failed {
                    kind: err.kind,
                    detail: err.detail,
                }
            }
        }
    }
}

/// Last characters of a token, safe to log.
fn token_suffix(token: &str) -> &str {
    let start = token
        .char_indices()
        .rev()
        .nth(5)
        .map_or(0, |(index, _)| index);
    &token[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrival::DispatchErrorKind;
    use crate::push_provider::{MockPushProvider, PushError};
    use std::collections::HashMap;

    fn payload() -> NotificationPayload {
        NotificationPayload {
            title: "🚌 Bus Arrived!".to_string(),
            body: "Your bus has reached Gate. Please get ready!".to_string(),
            data: HashMap::new(),
            target: "tok-123".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_wraps_provider_message_id() {
        let mut mock_provider = MockPushProvider::new();
        mock_provider
            .expect_send_notification()
            .withf(|payload: &NotificationPayload| payload.target == "tok-123")
            .times(1)
            .returning(|_| Ok("projects/demo/messages/msg-1".to_string()));

        let dispatcher = NotificationDispatcher::new(Arc::new(mock_provider));

        let outcome = dispatcher.dispatch(&payload()).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Sent {
                provider_message_id: "projects/demo/messages/msg-1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_normalizes_provider_failure() {
        let mut mock_provider = MockPushProvider::new();
        mock_provider
            .expect_send_notification()
            .times(1)
            .returning(|_| {
                Err(PushError::new(
                    DispatchErrorKind::InvalidToken,
                    "Requested entity was not found (UNREGISTERED)",
                ))
            });

        let dispatcher = NotificationDispatcher::new(Arc::new(mock_provider));

        let outcome = dispatcher.dispatch(&payload()).await;

        assert_eq!(
            outcome,
            DispatchOutcome::Failed {
                kind: DispatchErrorKind::InvalidToken,
                detail: "Requested entity was not found (UNREGISTERED)".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_preserves_each_error_kind() {
        for kind in [
            DispatchErrorKind::InvalidToken,
            DispatchErrorKind::ProviderUnavailable,
            DispatchErrorKind::QuotaExceeded,
            DispatchErrorKind::Unknown,
        ] {
            let mut mock_provider = MockPushProvider::new();
            mock_provider
                .expect_send_notification()
                .times(1)
                .returning(move |_| Err(PushError::new(kind, "boom")));

            let dispatcher = NotificationDispatcher::new(Arc::new(mock_provider));

            match dispatcher.dispatch(&payload()).await {
                DispatchOutcome::Failed { kind: got, .. } => assert_eq!(got, kind),
                other => panic!("expected failure, got {:?}", other),
            }
        }
    }
}
