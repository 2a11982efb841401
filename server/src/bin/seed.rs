//! Load the demo data set into the configured database.

use server::config::ServerConfig;
use server::{db, seed};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env().expect("invalid configuration");
    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    match seed::run(&pool).await {
        Ok(report) if report.total() == 0 => tracing::info!("demo data already present; nothing inserted"),
        Ok(report) => tracing::info!(
            members = report.members,
            visitors = report.visitors,
            users = report.users,
            password = seed::DEMO_PASSWORD,
            "demo data inserted"
        ),
        Err(e) => {
            tracing::error!(error = %e, "seed failed; nothing was written");
            std::process::exit(1);
        }
    }
}
