//! Neurika Server - Main entry point

use anyhow::Result;
use neurika_analysis::ResponseFormatter;
use neurika_common::logging::{init_logging, LogConfig};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tracing::info;

use neurika_server::{
    api,
    auth::IdentityClient,
    config::Config,
    db::{self, DbConfig},
    features::{FeatureSettings, FeatureState},
    llm::OpenAiClient,
    mail::Mailer,
    storage::{config::StorageConfig, Storage},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables take precedence over these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("neurika-server")
        .filter_directives("neurika_server=debug,tower_http=debug,sqlx=info")
        .build()
        .merge_env()?;

    let _log_guard = init_logging(&log_config)?;

    info!("Starting Neurika Server");

    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    let db_pool = db::create_pool(&DbConfig::from(&config.database)).await?;
    info!("Database connection pool established");

    db::migrate(&db_pool).await?;

    let storage = Storage::new(StorageConfig::from_env()?).await?;

    // One connection pool for the identity, completion and mail APIs
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;

    let completion = OpenAiClient::new(http.clone(), &config.completion);
    info!(model = %completion.model(), "Completion provider configured");

    let mailer = Mailer::from_config(http.clone(), &config.mail);
    if mailer.is_none() {
        info!("No mail API key configured, invitations will not be e-mailed");
    }

    let state = FeatureState {
        db: db_pool,
        storage,
        identity: IdentityClient::new(http, &config.auth),
        completion: Arc::new(completion),
        mailer,
        formatter: Arc::new(ResponseFormatter::new()?),
        settings: FeatureSettings::from(&config),
    };

    let app = api::create_router(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
    .await?;

    info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
