use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::development::{
    CreateDevelopmentInitiative, DevelopmentInitiative, InitiativeCategory,
    UpdateDevelopmentInitiative,
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{auth::Session, development::DevelopmentService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct InitiativeQuery {
    pub category: Option<InitiativeCategory>,
}

pub async fn get_initiatives(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<InitiativeQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<DevelopmentInitiative>>>, ApiError> {
    let pool = &deployment.db().pool;
    let initiatives = match query.category {
        Some(category) => DevelopmentInitiative::find_by_category(pool, category).await?,
        None => DevelopmentInitiative::find_all(pool).await?,
    };
    Ok(ResponseJson(ApiResponse::success(initiatives)))
}

pub async fn get_initiative(
    State(deployment): State<DeploymentImpl>,
    Path(initiative_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<DevelopmentInitiative>>, ApiError> {
    let initiative = DevelopmentInitiative::find_by_id(&deployment.db().pool, initiative_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("initiative".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(initiative)))
}

pub async fn create_initiative(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateDevelopmentInitiative>,
) -> Result<ResponseJson<ApiResponse<DevelopmentInitiative>>, ApiError> {
    let initiative = DevelopmentService::create(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(initiative)))
}

pub async fn update_initiative(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(initiative_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateDevelopmentInitiative>,
) -> Result<ResponseJson<ApiResponse<DevelopmentInitiative>>, ApiError> {
    let initiative =
        DevelopmentService::update(&deployment.db().pool, session, initiative_id, &payload)
            .await?;
    Ok(ResponseJson(ApiResponse::success(initiative)))
}

pub async fn delete_initiative(
    State(deployment): State<DeploymentImpl>,
    Path(initiative_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    DevelopmentService::delete(&deployment.db().pool, initiative_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/development",
        Router::new()
            .route("/", get(get_initiatives).post(create_initiative))
            .route(
                "/{initiative_id}",
                get(get_initiative)
                    .put(update_initiative)
                    .delete(delete_initiative),
            ),
    )
}
