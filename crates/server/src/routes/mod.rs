use axum::{Router, middleware::from_fn_with_state};

use crate::{DeploymentImpl, middleware::require_session};

pub mod calendar;
pub mod comments;
pub mod development;
pub mod garden;
pub mod health;
pub mod maintenance;
pub mod profiles;
pub mod social_events;
pub mod tasks;

/// The full `/api` tree. Everything except the health check requires a
/// signed-in member.
pub fn router(deployment: DeploymentImpl) -> Router {
    let protected = Router::new()
        .merge(profiles::router(&deployment))
        .merge(tasks::router(&deployment))
        .merge(garden::router(&deployment))
        .merge(maintenance::router(&deployment))
        .merge(development::router(&deployment))
        .merge(social_events::router(&deployment))
        .merge(calendar::router(&deployment))
        .merge(comments::router(&deployment))
        .layer(from_fn_with_state(deployment.clone(), require_session));

    let api = Router::new().merge(health::router()).merge(protected);

    Router::new().nest("/api", api).with_state(deployment)
}
