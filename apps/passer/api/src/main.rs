use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{handlers, seed, UserService};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

mod config;
mod shutdown;

use config::Config;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    info!(
        environment = ?config.environment,
        tokens = ?config.tokens,
        "Configuration loaded"
    );

    let service = UserService::new(config.tokens.clone());

    if config.seed_users {
        let inserted = service
            .seed(seed::development_users())
            .await
            .map_err(|e| eyre::eyre!("Seeding users failed: {}", e))?;
        info!("Preloaded {} development users", inserted);
    }
    info!(users = service.count().await, "User directory ready");

    let app = handlers::router(service).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Passer API listening on {}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        })?;

    info!("Passer API shutdown complete");
    Ok(())
}
