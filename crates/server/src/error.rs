use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use deployment::DeploymentError;
use services::services::{
    auth::AuthError, calendar::CalendarError, comments::CommentError,
    development::DevelopmentError, garden::GardenError, maintenance::MaintenanceError,
    social_events::SocialEventError, tasks::TaskError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Comment(#[from] CommentError),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error(transparent)]
    Garden(#[from] GardenError),
    #[error(transparent)]
    Maintenance(#[from] MaintenanceError),
    #[error(transparent)]
    Development(#[from] DevelopmentError),
    #[error(transparent)]
    SocialEvent(#[from] SocialEventError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

fn calendar_status(err: &CalendarError) -> StatusCode {
    match err {
        CalendarError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CalendarError::InvalidRange | CalendarError::EmptyTitle => StatusCode::BAD_REQUEST,
        CalendarError::NotFound => StatusCode::NOT_FOUND,
        CalendarError::DerivedEventReadOnly(_) => StatusCode::CONFLICT,
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Comment(err) => match err {
                CommentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                CommentError::EmptyContent | CommentError::ConfirmationRequired => {
                    StatusCode::BAD_REQUEST
                }
                CommentError::ResourceNotFound { .. } | CommentError::NotFound => {
                    StatusCode::NOT_FOUND
                }
                CommentError::Forbidden => StatusCode::FORBIDDEN,
            },
            ApiError::Calendar(err) => calendar_status(err),
            ApiError::Garden(err) => match err {
                GardenError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                GardenError::Calendar(inner) => calendar_status(inner),
                GardenError::TaskNotFound | GardenError::AreaNotFound => StatusCode::NOT_FOUND,
                GardenError::AreaInUse(_) => StatusCode::CONFLICT,
                GardenError::Blank(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::Maintenance(err) => match err {
                MaintenanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                MaintenanceError::Calendar(inner) => calendar_status(inner),
                MaintenanceError::RequestNotFound | MaintenanceError::VisitNotFound => {
                    StatusCode::NOT_FOUND
                }
                MaintenanceError::EmptyTitle => StatusCode::BAD_REQUEST,
            },
            ApiError::Development(err) => match err {
                DevelopmentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DevelopmentError::Calendar(inner) => calendar_status(inner),
                DevelopmentError::NotFound => StatusCode::NOT_FOUND,
                DevelopmentError::EmptyTitle | DevelopmentError::InvalidCapacity => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::SocialEvent(err) => match err {
                SocialEventError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                SocialEventError::NotFound | SocialEventError::NotParticipating => {
                    StatusCode::NOT_FOUND
                }
                SocialEventError::EmptyTitle | SocialEventError::InvalidTimes => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::Task(err) => match err {
                TaskError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
                TaskError::NotFound => StatusCode::NOT_FOUND,
                TaskError::EmptyTitle => StatusCode::BAD_REQUEST,
            },
            ApiError::Deployment(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let error_message = if status_code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Something went wrong. Please try again.".to_string()
        } else {
            match &self {
                ApiError::Auth(err) => {
                    tracing::debug!(error = %err, "Rejected unauthenticated request");
                    "Please sign in to continue.".to_string()
                }
                _ => self.to_string(),
            }
        };

        let response = ApiResponse::<()>::error(&error_message);
        (status_code, Json(response)).into_response()
    }
}
