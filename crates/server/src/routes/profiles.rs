use axum::{
    Extension, Router,
    extract::State,
    response::Json as ResponseJson,
    routing::get,
};
use db::models::profile::{Profile, UpsertProfile};
use deployment::Deployment;
use services::services::auth::Session;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub async fn get_profiles(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Profile>>>, ApiError> {
    let profiles = Profile::find_all(&deployment.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(profiles)))
}

pub async fn get_my_profile(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let profile = Profile::find_by_id(&deployment.db().pool, session.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

/// Members may only write their own profile.
pub async fn upsert_my_profile(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<UpsertProfile>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let profile = Profile::upsert(&deployment.db().pool, session.user_id, &payload).await?;
    tracing::info!(user_id = %session.user_id, "Profile saved");
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route("/profiles", get(get_profiles))
        .route("/profiles/me", get(get_my_profile).put(upsert_my_profile))
}
