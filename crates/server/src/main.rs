use anyhow::Context;
use taskverse::TaskverseConfig;
use taskverse_server::routes;
use tracing_subscriber::{EnvFilter, prelude::*};

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from `.env` if present so local development picks up credentials
    dotenv::dotenv().ok();

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let filter_string = format!(
        "warn,taskverse={level},taskverse_server={level}",
        level = log_level
    );
    let env_filter = EnvFilter::try_new(filter_string).context("Failed to create tracing filter")?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let config = TaskverseConfig::from_env();
    let assistant = taskverse::initialize_assistant(config);
    tracing::info!(classifier = assistant.classifier_name(), "Intent router ready");

    let app_router = routes::router(assistant);

    let port = std::env::var("BACKEND_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|s| s.trim().parse::<u16>().ok())
        .unwrap_or_else(|| {
            tracing::info!("No PORT environment variable set, using port {}", DEFAULT_PORT);
            DEFAULT_PORT
        });

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let listener = tokio::net::TcpListener::bind(format!("{host}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {host}:{port}"))?;
    let actual_port = listener.local_addr()?.port();

    tracing::info!("Server running on http://{host}:{actual_port}");

    axum::serve(listener, app_router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
