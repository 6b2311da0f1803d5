use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use arrivo_domain::repository::ArrivalRepository;
use arrivo_domain::{ArrivalRecord, DispatchStatus, DomainError, DomainResult, NewArrivalRecord};

use crate::client::PostgresClient;

/// PostgreSQL implementation of the ArrivalRepository trait.
///
/// The store layer assigns `id` (xid, time-prefixed and therefore sortable in
/// creation order) and `created_at` at write time, so history ordering by
/// `created_at DESC, id DESC` is consistent for the reader.
#[derive(Clone)]
pub struct PostgresArrivalRepository {
    client: PostgresClient,
}

impl PostgresArrivalRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArrivalRepository for PostgresArrivalRepository {
    async fn insert_arrival(&self, record: NewArrivalRecord) -> DomainResult<ArrivalRecord> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::StorageError)?;

        let id = xid::new().to_string();
        let now = Utc::now();
        let status = record.status.as_str();

        conn.execute(
            "INSERT INTO arrivals (id, place_name, latitude, longitude, push_token,
                                   status, provider_message_id, failure_detail, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                &id,
                &record.place_name,
                &record.latitude,
                &record.longitude,
                &record.push_token,
                &status,
                &record.provider_message_id,
                &record.failure_detail,
                &now,
            ],
        )
        .await
        .map_err(|e| DomainError::StorageError(e.into()))?;

        debug!(arrival_id = %id, status = %status, "arrival recorded in database");

        Ok(ArrivalRecord {
            id,
            place_name: record.place_name,
            latitude: record.latitude,
            longitude: record.longitude,
            push_token: record.push_token,
            status: record.status,
            provider_message_id: record.provider_message_id,
            failure_detail: record.failure_detail,
            created_at: now,
        })
    }

    async fn list_recent_arrivals(&self, limit: u32) -> DomainResult<Vec<ArrivalRecord>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::StorageError)?;

        debug!(limit, "fetching recent arrivals from database");

        let rows = conn
            .query(
                "SELECT id, place_name, latitude, longitude, push_token,
                        status, provider_message_id, failure_detail, created_at
                 FROM arrivals
                 ORDER BY created_at DESC, id DESC
                 LIMIT $1",
                &[&i64::from(limit)],
            )
            .await
            .map_err(|e| DomainError::StorageError(e.into()))?;

        rows.into_iter()
            .map(|row| {
                let status_raw: String = row.get("status");
                let status = DispatchStatus::parse(&status_raw).ok_or_else(|| {
                    DomainError::StorageError(anyhow::anyhow!(
                        "unknown arrival status in store: {status_raw}"
                    ))
                })?;

                Ok(ArrivalRecord {
                    id: row.get("id"),
                    place_name: row.get("place_name"),
                    latitude: row.get("latitude"),
                    longitude: row.get("longitude"),
                    push_token: row.get("push_token"),
                    status,
                    provider_message_id: row.get("provider_message_id"),
                    failure_detail: row.get("failure_detail"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }
}
