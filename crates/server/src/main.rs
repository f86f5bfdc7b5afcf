use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use server::{DeploymentImpl, routes};
use services::services::config::Config;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utils::log::{init_sentry, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    let _sentry = init_sentry(config.sentry_dsn.as_deref());
    init_tracing();

    let bind_address = config.bind_address();
    let cors = cors_layer(config.cors_allowed_origin.as_deref())?;
    let deployment = DeploymentImpl::from_config(config).await?;

    let app = routes::router(deployment)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!("Server running on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn cors_layer(allowed_origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
    Ok(match allowed_origin {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS_ALLOWED_ORIGIN {origin}"))?,
        ),
        None => layer.allow_origin(Any),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
