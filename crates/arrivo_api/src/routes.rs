use std::sync::Arc;

use arrivo_domain::{
    ArrivalRecord, ArrivalService, DispatchOutcome, DispatchStatus, RecentArrivalsInput,
};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::server::CorsConfig;

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<ArrivalService>,
}

/// Builds the service router with CORS and request tracing layers.
pub fn arrivo_router(state: ApiState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/check-location", post(check_location))
        .route("/arrivals", get(recent_arrivals))
        .route("/health", get(health))
        .route("/", get(root))
        .layer(cors.to_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wire view of one recorded arrival. The push token stays server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArrivalRecordDto {
    id: String,
    place_name: String,
    latitude: f64,
    longitude: f64,
    status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ArrivalRecord> for ArrivalRecordDto {
    fn from(record: ArrivalRecord) -> Self {
        Self {
            id: record.id,
            place_name: record.place_name,
            latitude: record.latitude,
            longitude: record.longitude,
            status: record.status,
            provider_message_id: record.provider_message_id,
            failure_detail: record.failure_detail,
            created_at: record.created_at,
        }
    }
}

async fn check_location(
    State(state): State<ApiState>,
    Json(raw): Json<Value>,
) -> Result<Response, ApiError> {
    let output = state.service.report_arrival(&raw).await?;

    let response = match &output.dispatch {
        DispatchOutcome::Sent {
            provider_message_id,
        } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Notification sent successfully",
                "recordId": output.record.id,
                "providerMessageId": provider_message_id,
                "location": {
                    "placeName": output.record.place_name,
                    "coordinates": {
                        "latitude": output.record.latitude,
                        "longitude": output.record.longitude,
                    },
                },
            })),
        )
            .into_response(),
        DispatchOutcome::Failed { kind, detail } => (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "success": false,
                "error": "Failed to send notification",
                "errorKind": kind.to_string(),
                "details": detail,
                // The arrival is still recorded; only delivery failed.
                "recordId": output.record.id,
            })),
        )
            .into_response(),
    };

    Ok(response)
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<u32>,
}

async fn recent_arrivals(
    State(state): State<ApiState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let page = state
        .service
        .recent_arrivals(RecentArrivalsInput { limit: query.limit })
        .await?;

    let arrivals: Vec<ArrivalRecordDto> = page.records.into_iter().map(Into::into).collect();

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "count": page.count,
            "arrivals": arrivals,
        })),
    )
        .into_response())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "arrivo",
    }))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Arrivo bus arrival notification API",
        "endpoints": {
            "POST /check-location": "Send bus arrival notification",
            "GET /arrivals": "Recent recorded arrivals",
            "GET /health": "Health check",
        },
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
