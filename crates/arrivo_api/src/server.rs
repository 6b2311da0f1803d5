use anyhow::Result;
use axum::http::HeaderValue;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;

use crate::routes::{arrivo_router, ApiState};

/// Settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

/// Allowed CORS origins; `*` opens the surface to any origin.
#[derive(Debug, Clone)]
pub struct CorsConfig {
    allowed_origins: Vec<String>,
}

impl CorsConfig {
    pub fn from_comma_separated(origins: &str) -> Self {
        Self {
            allowed_origins: origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub(crate) fn to_layer(&self) -> CorsLayer {
        if self.allowed_origins.iter().any(|origin| origin == "*") {
            return CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
        }

        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Serves the API until the cancellation token fires, then drains in-flight
/// requests.
pub async fn run_http_server(
    config: HttpServerConfig,
    state: ApiState,
    shutdown: CancellationToken,
) -> Result<()> {
    let router = arrivo_router(state, &config.cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("HTTP server shutting down");
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_config_from_comma_separated() {
        let cors = CorsConfig::from_comma_separated("http://localhost:5173, https://app.example");

        assert_eq!(
            cors.allowed_origins,
            vec!["http://localhost:5173", "https://app.example"]
        );
    }

    #[test]
    fn test_cors_config_skips_empty_entries() {
        let cors = CorsConfig::from_comma_separated("*,,");

        assert_eq!(cors.allowed_origins, vec!["*"]);
    }
}
