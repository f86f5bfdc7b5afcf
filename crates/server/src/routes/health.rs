use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::DeploymentImpl;

#[derive(Debug, Serialize, TS)]
pub struct HealthStatus {
    pub ok: bool,
    pub database: bool,
}

pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> ResponseJson<ApiResponse<HealthStatus>> {
    let database = match deployment.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };
    ResponseJson(ApiResponse::success(HealthStatus { ok: true, database }))
}

pub fn router() -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
