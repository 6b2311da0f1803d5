use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::arrival::{
    DispatchOutcome, HistoryPage, NewArrivalRecord, RecentArrivalsInput, ReportArrivalOutput,
};
use crate::dispatcher::NotificationDispatcher;
use crate::error::DomainResult;
use crate::notification::NotificationComposer;
use crate::push_provider::PushProvider;
use crate::repository::ArrivalRepository;
use crate::validator::validate_report;

/// Upper bound on one history page.
pub const MAX_HISTORY_LIMIT: u32 = 50;

/// Domain service orchestrating the arrival pipeline
///
/// Write path: validate → compose → dispatch → record. Validation
/// short-circuits before any external call. Dispatch runs before the write
/// because the persisted status depends on the outcome; a failed dispatch is
/// still recorded, so arrival reports are never silently dropped. A storage
/// failure after a successful dispatch fails the request overall: the
/// passenger was notified but the event is unrecorded, and the caller must be
/// able to tell those apart.
pub struct ArrivalService {
    dispatcher: NotificationDispatcher,
    repository: Arc<dyn ArrivalRepository>,
}

impl ArrivalService {
    pub fn new(provider: Arc<dyn PushProvider>, repository: Arc<dyn ArrivalRepository>) -> Self {
        Self {
            dispatcher: NotificationDispatcher::new(provider),
            repository,
        }
    }

    /// Run the full pipeline for one raw arrival report.
    ///
    /// Performs exactly one dispatch attempt and exactly one persistence
    /// attempt; the two are sequential, not transactional.
    #[instrument(skip(self, raw))]
    pub async fn report_arrival(&self, raw: &Value) -> DomainResult<ReportArrivalOutput> {
        let report = validate_report(raw)?;

        debug!(
            place_name = %report.place_name,
            latitude = report.latitude,
            longitude = report.longitude,
            "processing arrival report"
        );

        let payload = NotificationComposer::compose(&report);
        let outcome = self.dispatcher.dispatch(&payload).await;

        let record = self
            .repository
            .insert_arrival(NewArrivalRecord::from_outcome(&report, &outcome))
            .await?;

        match &outcome {
            DispatchOutcome::Sent {
                provider_message_id,
            } => {
                info!(
                    record_id = %record.id,
                    provider_message_id = %provider_message_id,
                    "arrival recorded, notification sent"
                );
            }
            DispatchOutcome::Failed { kind, .. } => {
                warn!(
                    record_id = %record.id,
                    kind = %kind,
                    "arrival recorded, notification dispatch failed"
                );
            }
        }

        Ok(ReportArrivalOutput {
            success: outcome.is_sent(),
            record,
            dispatch: outcome,
        })
    }

    /// Most recent arrivals, newest first, bounded to [`MAX_HISTORY_LIMIT`].
    #[instrument(skip(self))]
    pub async fn recent_arrivals(&self, input: RecentArrivalsInput) -> DomainResult<HistoryPage> {
        let limit = input
            .limit
            .unwrap_or(MAX_HISTORY_LIMIT)
            .min(MAX_HISTORY_LIMIT);

        let records = self.repository.list_recent_arrivals(limit).await?;

        debug!(count = records.len(), "listed recent arrivals");
        Ok(HistoryPage::from_records(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrival::{ArrivalRecord, DispatchErrorKind, DispatchStatus};
    use crate::error::DomainError;
    use crate::push_provider::{MockPushProvider, PushError};
    use crate::repository::MockArrivalRepository;
    use chrono::Utc;
    use serde_json::json;

    fn valid_raw() -> Value {
        json!({
            "latitude": 10.081642,
            "longitude": 78.746657,
            "pushToken": "tok-123",
            "placeName": "Test School Gate"
        })
    }

    fn stored(record: NewArrivalRecord, id: &str) -> ArrivalRecord {
        ArrivalRecord {
            id: id.to_string(),
            place_name: record.place_name,
            latitude: record.latitude,
            longitude: record.longitude,
            push_token: record.push_token,
            status: record.status,
            provider_message_id: record.provider_message_id,
            failure_detail: record.failure_detail,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_report_arrival_success() {
        // Arrange
        let mut mock_provider = MockPushProvider::new();
        mock_provider
            .expect_send_notification()
            .withf(|payload| {
                payload.target == "tok-123" && payload.data["placeName"] == "Test School Gate"
            })
            .times(1)
            .returning(|_| Ok("msg-1".to_string()));

        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_insert_arrival()
            .withf(|record: &NewArrivalRecord| {
                record.status == DispatchStatus::Sent
                    && record.provider_message_id.as_deref() == Some("msg-1")
            })
            .times(1)
            .returning(|record| Ok(stored(record, "arr-1")));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        // Act
        let output = service.report_arrival(&valid_raw()).await.unwrap();

        // Assert
        assert!(output.success);
        assert_eq!(output.record.status, DispatchStatus::Sent);
        assert_eq!(output.record.provider_message_id.as_deref(), Some("msg-1"));
        assert_eq!(output.record.place_name, "Test School Gate");
        assert_eq!(output.dispatch.provider_message_id(), Some("msg-1"));
    }

    #[tokio::test]
    async fn test_validation_failure_short_circuits() {
        // Neither mock gets an expectation; any call would panic.
        let mock_provider = MockPushProvider::new();
        let mock_repo = MockArrivalRepository::new();

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        let raw = json!({
            "latitude": "invalid",
            "longitude": 78.746657,
            "pushToken": "tok-123",
            "placeName": "Gate"
        });

        let result = service.report_arrival(&raw).await;

        match result {
            Err(DomainError::ValidationError { field, .. }) => assert_eq!(field, "latitude"),
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_dispatch_is_still_recorded() {
        // Arrange
        let mut mock_provider = MockPushProvider::new();
        mock_provider
            .expect_send_notification()
            .times(1)
            .returning(|_| {
                Err(PushError::new(
                    DispatchErrorKind::InvalidToken,
                    "UNREGISTERED",
                ))
            });

        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_insert_arrival()
            .withf(|record: &NewArrivalRecord| {
                record.status == DispatchStatus::Failed
                    && record.provider_message_id.is_none()
                    && record.failure_detail.as_deref() == Some("UNREGISTERED")
            })
            .times(1)
            .returning(|record| Ok(stored(record, "arr-2")));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        // Act
        let output = service.report_arrival(&valid_raw()).await.unwrap();

        // Assert
        assert!(!output.success);
        assert_eq!(output.record.status, DispatchStatus::Failed);
        match output.dispatch {
            DispatchOutcome::Failed { kind, .. } => {
                assert_eq!(kind, DispatchErrorKind::InvalidToken);
            }
            other => panic!("expected failed dispatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_storage_failure_after_dispatch_surfaces_storage_error() {
        // Arrange
        let mut mock_provider = MockPushProvider::new();
        mock_provider
            .expect_send_notification()
            .times(1)
            .returning(|_| Ok("msg-1".to_string()));

        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_insert_arrival()
            .times(1)
            .returning(|_| Err(DomainError::StorageError(anyhow::anyhow!("connection lost"))));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        // Act
        let result = service.report_arrival(&valid_raw()).await;

        // Assert
        assert!(matches!(result, Err(DomainError::StorageError(_))));
    }

    #[tokio::test]
    async fn test_recent_arrivals_defaults_to_max_limit() {
        let mock_provider = MockPushProvider::new();
        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_list_recent_arrivals()
            .withf(|limit: &u32| *limit == MAX_HISTORY_LIMIT)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        let page = service
            .recent_arrivals(RecentArrivalsInput::default())
            .await
            .unwrap();

        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn test_recent_arrivals_clamps_oversized_limit() {
        let mock_provider = MockPushProvider::new();
        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_list_recent_arrivals()
            .withf(|limit: &u32| *limit == MAX_HISTORY_LIMIT)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        let page = service
            .recent_arrivals(RecentArrivalsInput { limit: Some(500) })
            .await
            .unwrap();

        assert_eq!(page.count, 0);
    }

    #[tokio::test]
    async fn test_recent_arrivals_passes_small_limit_through() {
        let mock_provider = MockPushProvider::new();
        let mut mock_repo = MockArrivalRepository::new();
        mock_repo
            .expect_list_recent_arrivals()
            .withf(|limit: &u32| *limit == 5)
            .times(1)
            .returning(|_| Ok(Vec::new()));

        let service = ArrivalService::new(Arc::new(mock_provider), Arc::new(mock_repo));

        service
            .recent_arrivals(RecentArrivalsInput { limit: Some(5) })
            .await
            .unwrap();
    }
}
