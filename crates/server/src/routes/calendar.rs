use axum::{
    Extension, Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::NaiveDateTime;
use db::models::calendar_event::{CalendarEvent, CreateCalendarEvent, UpdateCalendarEvent};
use deployment::Deployment;
use serde::Deserialize;
use services::services::{auth::Session, calendar::CalendarService};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

/// Window in community-local wall-clock time, e.g. `2024-05-01T00:00:00`.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

pub async fn get_events(
    State(deployment): State<DeploymentImpl>,
    Query(range): Query<RangeQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<CalendarEvent>>>, ApiError> {
    let events = CalendarService::list_range(&deployment.db().pool, range.from, range.to).await?;
    Ok(ResponseJson(ApiResponse::success(events)))
}

pub async fn get_event(
    State(deployment): State<DeploymentImpl>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let event = CalendarEvent::find_by_id(&deployment.db().pool, event_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("calendar event".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn create_event(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    axum::Json(payload): axum::Json<CreateCalendarEvent>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let event = CalendarService::create_manual(&deployment.db().pool, session, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn update_event(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(event_id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCalendarEvent>,
) -> Result<ResponseJson<ApiResponse<CalendarEvent>>, ApiError> {
    let event =
        CalendarService::update_manual(&deployment.db().pool, session, event_id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(event)))
}

pub async fn delete_event(
    State(deployment): State<DeploymentImpl>,
    Extension(session): Extension<Session>,
    Path(event_id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    CalendarService::delete_manual(&deployment.db().pool, session, event_id).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/calendar/events",
        Router::new()
            .route("/", get(get_events).post(create_event))
            .route(
                "/{event_id}",
                get(get_event).put(update_event).delete(delete_event),
            ),
    )
}
