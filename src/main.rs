use actix_web::{App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(&config).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize application");
        std::io::Error::other(e.to_string())
    })?;
    let analyzer = state.analyzer;

    tracing::info!(
        vision_models = ?config.models.vision.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        text_models = ?config.models.text.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
        "Starting AI Attack Analyzer on {}",
        bind_addr
    );

    HttpServer::new(move || {
        App::new()
            .app_data(analyzer.clone())
            .configure(api::health::configure)
            .configure(api::analysis::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
