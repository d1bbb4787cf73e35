use dotenvy::dotenv;
use log::{error, info};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use quadrant::api_router::configure_api_routes;
use quadrant::config::AppConfig;
use quadrant::shared::state::AppState;
use quadrant::shared::utils::create_conn;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    let config = AppConfig::from_env()?;

    let pool = match create_conn() {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to create database pool: {}", e);
            return Err(anyhow::anyhow!("database pool creation failed: {e}"));
        }
    };

    let app_state = Arc::new(AppState {
        conn: pool,
        config: config.clone(),
    });

    let app = configure_api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting HTTP server on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
