use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::maintenance::{
    CreateMaintenanceRequest, CreateMaintenanceVisit, MaintenanceRequest, MaintenanceStatus,
    MaintenanceVisit, UpdateMaintenanceRequest, UpdateMaintenanceVisit,
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{auth::Session, maintenance::MaintenanceService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RequestQuery {
    pub status: Option<MaintenanceStatus>,
}

pub async fn get_requests(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<RequestQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<MaintenanceRequest>>>, ApiError> {
    let pool = &deployment.db().pool;
    let requests = match query.status {
        Some(status) => MaintenanceRequest::find_by_status(pool, status).await?,
        None => MaintenanceRequest::find_all(pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(requests)))
}

pub async fn get_request(
    State(deployment): State<DeploymentImpl>,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<MaintenanceRequest>>, ApiError> {
    let request = MaintenanceRequest::find_by_id(&deployment.db().pool, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("maintenance request".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

pub async fn create_request(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateMaintenanceRequest>,
) -> Result<ResponseJson<ApiResponse<MaintenanceRequest>>, ApiError> {
    let request =
        MaintenanceService::create_request(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

pub async fn update_request(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(request_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateMaintenanceRequest>,
) -> Result<ResponseJson<ApiResponse<MaintenanceRequest>>, ApiError> {
    let request =
        MaintenanceService::update_request(&deployment.db().pool, session, request_id, &payload)
            .await?;
    Ok(ResponseJson(ApiResponse::success(request)))
}

/// Deletes the request together with its visits, their calendar entries
/// and the comment thread.
pub async fn delete_request(
    State(deployment): State<DeploymentImpl>,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    MaintenanceService::delete_request(&deployment.db().pool, request_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_visits(
    State(deployment): State<DeploymentImpl>,
    Path(request_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<MaintenanceVisit>>>, ApiError> {
    let visits = MaintenanceVisit::find_by_request_id(&deployment.db().pool, request_id).await?;
    Ok(ResponseJson(ApiResponse::success(visits)))
}

pub async fn create_visit(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(request_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateMaintenanceVisit>,
) -> Result<ResponseJson<ApiResponse<MaintenanceVisit>>, ApiError> {
    let visit =
        MaintenanceService::create_visit(&deployment.db().pool, session, request_id, &payload)
            .await?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub async fn update_visit(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(visit_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateMaintenanceVisit>,
) -> Result<ResponseJson<ApiResponse<MaintenanceVisit>>, ApiError> {
    let visit =
        MaintenanceService::update_visit(&deployment.db().pool, session, visit_id, &payload)
            .await?;
    Ok(ResponseJson(ApiResponse::success(visit)))
}

pub async fn delete_visit(
    State(deployment): State<DeploymentImpl>,
    Path(visit_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    MaintenanceService::delete_visit(&deployment.db().pool, visit_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/maintenance",
        Router::new()
            .route("/requests", get(get_requests).post(create_request))
            .route(
                "/requests/{request_id}",
                get(get_request).put(update_request).delete(delete_request),
            )
            .route(
                "/requests/{request_id}/visits",
                get(get_visits).post(create_visit),
            )
            .route("/visits/{visit_id}", put(update_visit).delete(delete_visit)),
    )
}
