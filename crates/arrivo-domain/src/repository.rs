use async_trait::async_trait;

use crate::arrival::{ArrivalRecord, NewArrivalRecord};
use crate::error::DomainResult;

/// Repository trait for arrival record storage.
/// Infrastructure layer (arrivo-postgres) implements this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArrivalRepository: Send + Sync {
    /// Persist exactly one arrival event.
    ///
    /// The store assigns `id` and `created_at`; the returned record is the
    /// persisted one. Records are never mutated or deleted afterwards.
    async fn insert_arrival(&self, record: NewArrivalRecord) -> DomainResult<ArrivalRecord>;

    /// Most recent arrivals ordered by `created_at` descending, ties broken
    /// by `id` descending. Read-only.
    async fn list_recent_arrivals(&self, limit: u32) -> DomainResult<Vec<ArrivalRecord>>;
}
