use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{app_state::AppState, config::read_config};

mod app_state;
mod config;
mod loader;
mod router;
mod routes;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = read_config().expect("Failed to read configuration");

    let index = loader::load_index(&config.corpus).expect("Failed to load corpus");
    let app_state = AppState::new(index, &config.context);
    let app = router::create(app_state);

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");
    info!("Listening on {}", address);

    axum::serve(listener, app).await.expect("Server error");
}
