use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://fcm.googleapis.com";

/// Configuration for the FCM HTTP v1 client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FcmConfig {
    /// Firebase project id the messages are sent under.
    pub project_id: String,
    /// API endpoint; overridable for test doubles.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-request timeout (default: 30 seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

impl FcmConfig {
    /// Creates a new config for a Firebase project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            endpoint: default_endpoint(),
            request_timeout: default_request_timeout(),
        }
    }

    /// Overrides the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Full URL of the `messages:send` endpoint for this project.
    #[must_use]
    pub fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint.trim_end_matches('/'),
            self.project_id
        )
    }
}
