//! Khata API server entrypoint.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use khata_api::auth::JwtManager;
use khata_api::config::ApiConfig;
use khata_api::{app, AppState};
use khata_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "khata_api=info,khata_db=info,tower_http=info".into()),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Server exited with error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApiConfig::load()?;

    let db = Database::new(DbConfig::new(&config.database_path)).await?;
    info!(path = %config.database_path, "Database ready");

    let state = AppState {
        db,
        jwt: Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        )),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
