//! One set of handlers for every comment thread. The `{kind}` segment picks
//! the thread family and must be one of the snake_case resource tags.

use std::str::FromStr;

use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::comment::{Comment, CommentResource};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{
    auth::Session,
    comments::{CommentService, Page},
};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, TS)]
pub struct CommentBody {
    pub content: String,
}

fn parse_kind(kind: &str) -> Result<CommentResource, ApiError> {
    CommentResource::from_str(kind)
        .map_err(|_| ApiError::BadRequest(format!("unknown comment kind '{kind}'")))
}

pub async fn list_comments(
    State(deployment): State<DeploymentImpl>,
    Path((kind, resource_id)): Path<(String, Uuid)>,
    Query(query): Query<PageQuery>,
) -> Result<ResponseJson<ApiResponse<Page<Comment>>>, ApiError> {
    let resource = parse_kind(&kind)?;
    let page = CommentService::list(
        &deployment.db().pool,
        resource,
        resource_id,
        query.page.unwrap_or(1),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn create_comment(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path((kind, resource_id)): Path<(String, Uuid)>,
    axum::Json(payload): axum::Json<CommentBody>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let resource = parse_kind(&kind)?;
    let comment = CommentService::create(
        &deployment.db().pool,
        session,
        resource,
        resource_id,
        &payload.content,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

pub async fn edit_comment(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path((kind, comment_id)): Path<(String, Uuid)>,
    axum::Json(payload): axum::Json<CommentBody>,
) -> Result<ResponseJson<ApiResponse<Comment>>, ApiError> {
    let resource = parse_kind(&kind)?;
    let comment = CommentService::edit(
        &deployment.db().pool,
        session,
        resource,
        comment_id,
        &payload.content,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(comment)))
}

pub async fn delete_comment(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path((kind, comment_id)): Path<(String, Uuid)>,
    Query(query): Query<DeleteQuery>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let resource = parse_kind(&kind)?;
    CommentService::delete(
        &deployment.db().pool,
        session,
        resource,
        comment_id,
        query.confirm,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/comments/{kind}",
        Router::new()
            .route("/{resource_id}", get(list_comments).post(create_comment))
            .route("/item/{comment_id}", put(edit_comment).delete(delete_comment)),
    )
}
