use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::Local;
use db::models::social_event::{
    CreateSocialEvent, RsvpStatus, SocialEvent, SocialEventParticipant, UpdateSocialEvent,
};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{auth::Session, social_events::SocialEventService};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct SocialEventQuery {
    #[serde(default)]
    pub upcoming: bool,
}

#[derive(Debug, Deserialize, TS)]
pub struct RsvpRequest {
    pub status: RsvpStatus,
}

pub async fn get_events(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<SocialEventQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<SocialEvent>>>, ApiError> {
    let pool = &deployment.db().pool;
    let events = if query.upcoming {
        SocialEvent::find_upcoming(pool, Local::now().date_naive()).await?
    } else {
        SocialEvent::find_all(pool).await?
    };
    Ok(ResponseJson(ApiResponse::success(events)))
}

pub async fn get_event(
    State(deployment): State<DeploymentImpl>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<SocialEvent>>, ApiError> {
    let event = SocialEvent::find_by_id(&deployment.db().pool, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("social event".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn create_event(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateSocialEvent>,
) -> Result<ResponseJson<ApiResponse<SocialEvent>>, ApiError> {
    let event = SocialEventService::create(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn update_event(
    State(deployment): State<DeploymentImpl>,
    Path(event_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateSocialEvent>,
) -> Result<ResponseJson<ApiResponse<SocialEvent>>, ApiError> {
    let event = SocialEventService::update(&deployment.db().pool, event_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn delete_event(
    State(deployment): State<DeploymentImpl>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    SocialEventService::delete(&deployment.db().pool, event_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub async fn get_participants(
    State(deployment): State<DeploymentImpl>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<SocialEventParticipant>>>, ApiError> {
    let participants =
        SocialEventParticipant::find_by_event_id(&deployment.db().pool, event_id).await?;
    Ok(ResponseJson(ApiResponse::success(participants)))
}

/// Record or change the caller's RSVP.
pub async fn rsvp(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(event_id): Path<Uuid>,
    axum::Json(payload): axum::Json<RsvpRequest>,
) -> Result<ResponseJson<ApiResponse<SocialEventParticipant>>, ApiError> {
    let participant =
        SocialEventService::rsvp(&deployment.db().pool, session, event_id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(participant)))
}

pub async fn leave(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    SocialEventService::leave(&deployment.db().pool, session, event_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/social-events",
        Router::new()
            .route("/", get(get_events).post(create_event))
            .route(
                "/{event_id}",
                get(get_event).put(update_event).delete(delete_event),
            )
            .route(
                "/{event_id}/participants",
                get(get_participants).put(rsvp).delete(leave),
            ),
    )
}
