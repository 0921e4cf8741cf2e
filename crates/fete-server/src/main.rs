use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use fete_api::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fete=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path: PathBuf = std::env::var("FETE_DB_PATH")
        .unwrap_or_else(|_| "fete.db".into())
        .into();
    let host = std::env::var("FETE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("FETE_PORT")
        .unwrap_or_else(|_| "3400".into())
        .parse()?;
    // Media arrives inline as data URIs, so the default 2 MB body cap is far
    // too small
    let body_limit_mb: usize = std::env::var("FETE_BODY_LIMIT_MB")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(25);

    // Init database
    let db = fete_db::Database::open(&db_path)?;
    let state: AppState = Arc::new(AppStateInner { db });

    // CORS — celebration pages are opened from shared links on arbitrary
    // origins; pre-flight OPTIONS is answered by the layer
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(false);

    let app = fete_api::routes(state)
        .layer(DefaultBodyLimit::max(body_limit_mb * 1024 * 1024))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Fete server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
