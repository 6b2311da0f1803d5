mod config;
mod migrate;
mod telemetry;

use std::sync::Arc;
use std::time::Duration;

use arrivo_api::{ApiState, CorsConfig, HttpServerConfig, run_http_server};
use arrivo_domain::ArrivalService;
use arrivo_fcm::{FcmConfig, FcmPushProvider};
use arrivo_postgres::{PostgresArrivalRepository, PostgresClient, PostgresConfig};
use config::ServiceConfig;
use migrate::MigrationRunner;
use telemetry::{TelemetryConfig, init_telemetry};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
    });

    info!(
        http_host = %config.http_host,
        http_port = config.http_port,
        "Starting arrivo service"
    );
    debug!("Configuration: {:?}", config);

    // Initialize shared dependencies
    let (repository, push_provider) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize the domain service
    let arrival_service = Arc::new(ArrivalService::new(push_provider, repository));

    let server_config = HttpServerConfig {
        host: config.http_host.clone(),
        port: config.http_port,
        cors: CorsConfig::from_comma_separated(&config.cors_allowed_origins),
    };

    // Shutdown token cancelled by SIGTERM/ctrl-c
    let shutdown_token = CancellationToken::new();
    spawn_signal_handler(shutdown_token.clone());

    let result = run_http_server(
        server_config,
        ApiState {
            service: arrival_service,
        },
        shutdown_token,
    )
    .await;

    match result {
        Ok(()) => {
            info!("Application exiting normally");
        }
        Err(e) => {
            error!("HTTP server error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(Arc<PostgresArrivalRepository>, Arc<FcmPushProvider>)> {
    // PostgreSQL initialization
    info!("Initializing PostgreSQL...");
    let runner = MigrationRunner::new(
        config.goose_binary_path.clone(),
        config.postgres_migrations_dir.clone(),
        config.postgres_dsn(),
    );
    runner.run_migrations()?;

    let postgres_client = PostgresClient::new(&PostgresConfig {
        host: config.postgres_host.clone(),
        port: config.postgres_port,
        database: config.postgres_database.clone(),
        username: config.postgres_username.clone(),
        password: config.postgres_password.clone(),
        max_pool_size: config.postgres_max_pool_size,
    })?;
    postgres_client.ping().await?;

    let repository = Arc::new(PostgresArrivalRepository::new(postgres_client));

    // FCM initialization
    info!("Initializing FCM...");
    let fcm_config = FcmConfig::new(config.fcm_project_id.clone())
        .with_endpoint(config.fcm_endpoint.clone())
        .with_request_timeout(Duration::from_secs(config.fcm_request_timeout_secs));
    let push_provider = Arc::new(FcmPushProvider::new(fcm_config).await?);

    Ok((repository, push_provider))
}

fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        token.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to set up SIGTERM handler");

    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Received shutdown signal"),
            Err(err) => error!("Error setting up signal handler: {}", err),
        },
        _ = sigterm.recv() => info!("Received SIGTERM signal"),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(err) => error!("Error setting up signal handler: {}", err),
    }
}
