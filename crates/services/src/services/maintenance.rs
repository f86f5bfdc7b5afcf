//! Maintenance requests and the contractor visits scheduled for them.

use db::models::{
    calendar_event::{CalendarEvent, CalendarEventType},
    comment::{Comment, CommentResource},
    maintenance::{
        CreateMaintenanceRequest, CreateMaintenanceVisit, MaintenanceRequest, MaintenanceVisit,
        UpdateMaintenanceRequest, UpdateMaintenanceVisit,
    },
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use super::{
    auth::Session,
    calendar::{CalendarError, CalendarService},
};

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("maintenance request not found")]
    RequestNotFound,
    #[error("maintenance visit not found")]
    VisitNotFound,
    #[error("title cannot be empty")]
    EmptyTitle,
}

pub struct MaintenanceService;

impl MaintenanceService {
    pub async fn create_request(
        pool: &SqlitePool,
        session: Session,
        data: &CreateMaintenanceRequest,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        if data.title.trim().is_empty() {
            return Err(MaintenanceError::EmptyTitle);
        }
        let request = MaintenanceRequest::create(pool, data, session.user_id).await?;
        info!(request_id = %request.id, user_id = %session.user_id, "Maintenance request created");
        Ok(request)
    }

    /// Title changes are pushed to the calendar entries of every visit.
    pub async fn update_request(
        pool: &SqlitePool,
        session: Session,
        id: Uuid,
        data: &UpdateMaintenanceRequest,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        let existing = Self::find_request(pool, id).await?;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(MaintenanceError::EmptyTitle);
        }
        let request = MaintenanceRequest::update(pool, &existing, data).await?;

        if request.title != existing.title {
            for visit in MaintenanceVisit::find_by_request_id(pool, id).await? {
                CalendarService::materialize_maintenance_visit(
                    pool,
                    &visit,
                    &request.title,
                    session.user_id,
                )
                .await?;
            }
        }
        Ok(request)
    }

    /// Remove the request with its comments, visits and their calendar
    /// entries. All of it happens in one transaction.
    pub async fn delete_request(pool: &SqlitePool, id: Uuid) -> Result<(), MaintenanceError> {
        let mut tx = pool.begin().await?;

        let visit_ids = MaintenanceVisit::ids_for_request(&mut *tx, id).await?;
        for visit_id in &visit_ids {
            CalendarEvent::delete_by_reference(
                &mut *tx,
                *visit_id,
                CalendarEventType::MaintenanceVisit,
            )
            .await?;
        }
        let comments =
            Comment::delete_for_resource(&mut *tx, CommentResource::Maintenance, id).await?;
        let visits = MaintenanceVisit::delete_for_request(&mut *tx, id).await?;

        if MaintenanceRequest::delete(&mut *tx, id).await? == 0 {
            return Err(MaintenanceError::RequestNotFound);
        }
        tx.commit().await?;

        info!(
            request_id = %id,
            comments_deleted = comments,
            visits_deleted = visits,
            "Maintenance request deleted"
        );
        Ok(())
    }

    pub async fn create_visit(
        pool: &SqlitePool,
        session: Session,
        request_id: Uuid,
        data: &CreateMaintenanceVisit,
    ) -> Result<MaintenanceVisit, MaintenanceError> {
        let request = Self::find_request(pool, request_id).await?;
        let visit = MaintenanceVisit::create(pool, request.id, data, session.user_id).await?;
        info!(visit_id = %visit.id, request_id = %request.id, "Maintenance visit scheduled");

        Self::sync_calendar(pool, &visit, &request, session).await?;
        Ok(visit)
    }

    pub async fn update_visit(
        pool: &SqlitePool,
        session: Session,
        visit_id: Uuid,
        data: &UpdateMaintenanceVisit,
    ) -> Result<MaintenanceVisit, MaintenanceError> {
        let existing = MaintenanceVisit::find_by_id(pool, visit_id)
            .await?
            .ok_or(MaintenanceError::VisitNotFound)?;
        let visit = MaintenanceVisit::update(pool, &existing, data).await?;

        if data.touches_schedule() {
            let request = Self::find_request(pool, visit.request_id).await?;
            Self::sync_calendar(pool, &visit, &request, session).await?;
        }
        Ok(visit)
    }

    pub async fn delete_visit(pool: &SqlitePool, visit_id: Uuid) -> Result<(), MaintenanceError> {
        let mut tx = pool.begin().await?;
        CalendarEvent::delete_by_reference(&mut *tx, visit_id, CalendarEventType::MaintenanceVisit)
            .await?;
        if MaintenanceVisit::delete(&mut *tx, visit_id).await? == 0 {
            return Err(MaintenanceError::VisitNotFound);
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_request(
        pool: &SqlitePool,
        id: Uuid,
    ) -> Result<MaintenanceRequest, MaintenanceError> {
        MaintenanceRequest::find_by_id(pool, id)
            .await?
            .ok_or(MaintenanceError::RequestNotFound)
    }

    async fn sync_calendar(
        pool: &SqlitePool,
        visit: &MaintenanceVisit,
        request: &MaintenanceRequest,
        session: Session,
    ) -> Result<(), MaintenanceError> {
        if let Err(e) = CalendarService::materialize_maintenance_visit(
            pool,
            visit,
            &request.title,
            session.user_id,
        )
        .await
        {
            error!(
                visit_id = %visit.id,
                error = %e,
                "Failed to sync maintenance visit to calendar"
            );
            return Err(e.into());
        }
        Ok(())
    }
}
