use axum::{
    Extension, Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::garden::{
    CreateGardenArea, CreateGardenTask, GardenArea, GardenTask, UpdateGardenTask,
};
use deployment::Deployment;
use services::services::{auth::Session, garden::GardenService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub async fn get_areas(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<GardenArea>>>, ApiError> {
    let areas = GardenArea::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(areas)))
}

pub async fn create_area(
    State(deployment): State<DeploymentImpl>,
    axum::Json(payload): axum::Json<CreateGardenArea>,
) -> Result<ResponseJson<ApiResponse<GardenArea>>, ApiError> {
    let area = GardenService::create_area(&deployment.db().pool, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(area)))
}

pub async fn update_area(
    State(deployment): State<DeploymentImpl>,
    Path(area_id): Path<Uuid>,
    axum::Json(payload): axum::Json<CreateGardenArea>,
) -> Result<ResponseJson<ApiResponse<GardenArea>>, ApiError> {
    let area = GardenService::update_area(&deployment.db().pool, area_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(area)))
}

pub async fn delete_area(
    State(deployment): State<DeploymentImpl>,
    Path(area_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    GardenService::delete_area(&deployment.db().pool, area_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_area_tasks(
    State(deployment): State<DeploymentImpl>,
    Path(area_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<GardenTask>>>, ApiError> {
    let tasks = GardenTask::find_by_area(&deployment.db().pool, area_id).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_tasks(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<GardenTask>>>, ApiError> {
    let tasks = GardenTask::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<GardenTask>>, ApiError> {
    let task = GardenTask::find_by_id(&deployment.db().pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("garden task".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateGardenTask>,
) -> Result<ResponseJson<ApiResponse<GardenTask>>, ApiError> {
    let task = GardenService::create_task(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateGardenTask>,
) -> Result<ResponseJson<ApiResponse<GardenTask>>, ApiError> {
    let task =
        GardenService::update_task(&deployment.db().pool, session, task_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    GardenService::delete_task(&deployment.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/garden",
        Router::new()
            .route("/areas", get(get_areas).post(create_area))
            .route("/areas/{area_id}", put(update_area).delete(delete_area))
            .route("/areas/{area_id}/tasks", get(get_area_tasks))
            .route("/tasks", get(get_tasks).post(create_task))
            .route(
                "/tasks/{task_id}",
                get(get_task).put(update_task).delete(delete_task),
            ),
    )
}
