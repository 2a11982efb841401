use server::config::ServerConfig;
use server::services::session;
use server::state::AppState;
use server::{db, routes};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("invalid configuration");
    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    match session::purge_expired(&pool).await {
        Ok(purged) => tracing::info!(purged, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "expired session purge failed"),
    }

    let state = AppState::new(pool, config.session_ttl_hours);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    tracing::info!(port = config.port, session_ttl_hours = config.session_ttl_hours, "ecclesia listening");
    axum::serve(listener, app).await.expect("server failed");
}
