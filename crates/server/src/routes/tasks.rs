use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::task::{CreateTask, Task, TaskStatus, UpdateTask};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{auth::Session, tasks::TaskService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    /// Only tasks assigned to or created by the caller.
    #[serde(default)]
    pub mine: bool,
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

pub async fn get_tasks(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Query(query): Query<TaskQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Task>>>, ApiError> {
    let pool = &deployment.db().pool;
    let tasks = if query.mine {
        Task::find_for_user(pool, session.user_id).await?
    } else {
        Task::find_all(pool).await?
    };
    Ok(ResponseJson(ApiResponse::success(tasks)))
}

pub async fn get_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = Task::find_by_id(&deployment.db().pool, task_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("task".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn create_task(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = TaskService::create(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTask>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = TaskService::update(&deployment.db().pool, task_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn update_task_status(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTaskStatus>,
) -> Result<ResponseJson<ApiResponse<Task>>, ApiError> {
    let task = TaskService::update_status(&deployment.db().pool, task_id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(deployment): State<DeploymentImpl>,
    Path(task_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    TaskService::delete(&deployment.db().pool, task_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/tasks",
        Router::new()
            .route("/", get(get_tasks).post(create_task))
            .route(
                "/{task_id}",
                get(get_task).put(update_task).delete(delete_task),
            )
            .route("/{task_id}/status", put(update_task_status)),
    )
}
