use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};

/// Caller-submitted claim that a tracked vehicle reached a named location.
///
/// Built by the request validator; never persisted verbatim.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ArrivalReport {
    #[garde(custom(finite_coordinate))]
    pub latitude: f64,
    #[garde(custom(finite_coordinate))]
    pub longitude: f64,
    #[garde(length(min = 1))]
    pub push_token: String,
    #[garde(length(min = 1))]
    pub place_name: String,
}

fn finite_coordinate(value: &f64, _context: &()) -> garde::Result {
    if value.is_finite() {
        Ok(())
    } else {
        Err(garde::Error::new("must be a finite number"))
    }
}

/// Provider-agnostic notification payload, built fresh per dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    /// Delivery target (the device push token).
    pub target: String,
}

/// Terminal state of one recorded arrival event.
///
/// `Arrived` is reserved for records persisted before any dispatch attempt;
/// the current pipeline always dispatches first and never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Arrived,
    Sent,
    Failed,
}

impl DispatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arrived => "arrived",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "arrived" => Some(Self::Arrived),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized class of a push-provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchErrorKind {
    InvalidToken,
    ProviderUnavailable,
    QuotaExceeded,
    Unknown,
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidToken => "invalid_token",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Result of exactly one dispatch attempt. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    Sent {
        provider_message_id: String,
    },
    Failed {
        kind: DispatchErrorKind,
        detail: String,
    },
}

impl DispatchOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn status(&self) -> DispatchStatus {
        match self {
            Self::Sent { .. } => DispatchStatus::Sent,
            Self::Failed { .. } => DispatchStatus::Failed,
        }
    }

    pub fn provider_message_id(&self) -> Option<&str> {
        match self {
            Self::Sent {
                provider_message_id,
            } => Some(provider_message_id),
            Self::Failed { .. } => None,
        }
    }

    pub fn failure_detail(&self) -> Option<&str> {
        match self {
            Self::Sent { .. } => None,
            Self::Failed { detail, .. } => Some(detail),
        }
    }
}

/// Arrival event as the store returns it. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalRecord {
    /// Store-assigned, unique and immutable.
    pub id: String,
    pub place_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub push_token: String,
    pub status: DispatchStatus,
    pub provider_message_id: Option<String>,
    pub failure_detail: Option<String>,
    /// Store-assigned at write time, non-decreasing as observed by the store.
    pub created_at: DateTime<Utc>,
}

/// Arrival event before the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArrivalRecord {
    pub place_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub push_token: String,
    pub status: DispatchStatus,
    pub provider_message_id: Option<String>,
    pub failure_detail: Option<String>,
}

impl NewArrivalRecord {
    /// Derive the record for one pipeline run, embedding the dispatch outcome.
    pub fn from_outcome(report: &ArrivalReport, outcome: &DispatchOutcome) -> Self {
        Self {
            place_name: report.place_name.clone(),
            latitude: report.latitude,
            longitude: report.longitude,
            push_token: report.push_token.clone(),
            status: outcome.status(),
            provider_message_id: outcome.provider_message_id().map(str::to_string),
            failure_detail: outcome.failure_detail().map(str::to_string),
        }
    }
}

/// Input for the history read path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentArrivalsInput {
    /// Requested page size; clamped to [`crate::arrival_service::MAX_HISTORY_LIMIT`].
    pub limit: Option<u32>,
}

/// Bounded page of recent arrivals, newest first. Rebuilt per request.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub records: Vec<ArrivalRecord>,
    pub count: usize,
}

impl HistoryPage {
    pub fn from_records(records: Vec<ArrivalRecord>) -> Self {
        let count = records.len();
        Self { records, count }
    }
}

/// Combined result of one arrival pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArrivalOutput {
    /// True only when the notification was dispatched successfully.
    pub success: bool,
    pub record: ArrivalRecord,
    pub dispatch: DispatchOutcome,
}
