//! Tracing subscriber setup shared by the binaries.

use sentry::ClientInitGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Initialise sentry when a DSN is configured. The returned guard must be
/// held for the lifetime of the process so buffered events are flushed.
pub fn init_sentry(dsn: Option<&str>) -> Option<ClientInitGuard> {
    let dsn = dsn.filter(|d| !d.trim().is_empty())?;
    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(
                if cfg!(debug_assertions) {
                    "dev"
                } else {
                    "production"
                }
                .into(),
            ),
            ..Default::default()
        },
    ));
    Some(guard)
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default
/// filter. The sentry layer is a no-op when sentry was never initialised.
pub fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer())
        .init();
}
