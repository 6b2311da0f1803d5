//! Request and response shapes for the FCM HTTP v1 `messages:send` call.

use std::collections::HashMap;

use arrivo_domain::NotificationPayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Serialize)]
pub(crate) struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,
    pub data: HashMap<String, String>,
    pub android: AndroidConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct FcmNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AndroidConfig {
    pub priority: String,
    pub notification: AndroidNotification,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AndroidNotification {
    pub default_sound: bool,
    pub default_vibrate_timings: bool,
    pub notification_priority: String,
}

impl FcmMessage {
    /// Build the wire message for one composed payload.
    pub fn from_payload(payload: &NotificationPayload) -> Self {
        Self {
            token: payload.target.clone(),
            notification: FcmNotification {
                title: payload.title.clone(),
                body: payload.body.clone(),
            },
            data: payload.data.clone(),
            android: AndroidConfig {
                priority: "HIGH".to_string(),
                notification: AndroidNotification {
                    default_sound: true,
                    default_vibrate_timings: true,
                    notification_priority: "PRIORITY_HIGH".to_string(),
                },
            },
        }
    }
}

/// Success response: `name` is the provider-assigned message identifier,
/// `projects/{project}/messages/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageResponse {
    pub name: String,
}

/// Google API error envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct FcmErrorResponse {
    pub error: FcmErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FcmErrorBody {
    #[allow(dead_code)]
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub status: String,
}
