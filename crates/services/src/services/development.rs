use db::models::{
    calendar_event::{CalendarEvent, CalendarEventType},
    comment::{Comment, CommentResource},
    development::{CreateDevelopmentInitiative, DevelopmentInitiative, UpdateDevelopmentInitiative},
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
pub enum DevelopmentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("initiative not found")]
    NotFound,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("max participants must be positive")]
    InvalidCapacity,
}

pub struct DevelopmentService;

impl DevelopmentService {
    pub async fn create(
        pool: &SqlitePool,
        session: Session,
        data: &CreateDevelopmentInitiative,
    ) -> Result<DevelopmentInitiative, DevelopmentError> {
        if data.title.trim().is_empty() {
            return Err(DevelopmentError::EmptyTitle);
        }
        validate_capacity(data.max_participants)?;

        let initiative = DevelopmentInitiative::create(pool, data, session.user_id).await?;
        info!(
            initiative_id = %initiative.id,
            category = %initiative.category,
            user_id = %session.user_id,
            "Development initiative created"
        );

        Self::sync_calendar(pool, &initiative, session).await?;
        Ok(initiative)
    }

    pub async fn update(
        pool: &SqlitePool,
        session: Session,
        id: Uuid,
        data: &UpdateDevelopmentInitiative,
    ) -> Result<DevelopmentInitiative, DevelopmentError> {
        let existing = DevelopmentInitiative::find_by_id(pool, id)
            .await?
            .ok_or(DevelopmentError::NotFound)?;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(DevelopmentError::EmptyTitle);
        }
        if let Some(max) = data.max_participants {
            validate_capacity(max)?;
        }

        let initiative = DevelopmentInitiative::update(pool, &existing, data).await?;
        if data.touches_schedule() {
            Self::sync_calendar(pool, &initiative, session).await?;
        }
        Ok(initiative)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), DevelopmentError> {
        let mut tx = pool.begin().await?;
        Comment::delete_for_resource(&mut *tx, CommentResource::Development, id).await?;
        CalendarEvent::delete_by_reference(&mut *tx, id, CalendarEventType::DevelopmentEvent)
            .await?;
        if DevelopmentInitiative::delete(&mut *tx, id).await? == 0 {
            return Err(DevelopmentError::NotFound);
        }
        tx.commit().await?;
        info!(initiative_id = %id, "Development initiative deleted");
        Ok(())
    }

    async fn sync_calendar(
        pool: &SqlitePool,
        initiative: &DevelopmentInitiative,
        session: Session,
    ) -> Result<(), DevelopmentError> {
        if let Err(e) =
            CalendarService::materialize_development_event(pool, initiative, session.user_id).await
        {
            error!(
                initiative_id = %initiative.id,
                error = %e,
                "Failed to sync development event to calendar"
            );
            return Err(e.into());
        }
        Ok(())
    }
}

fn validate_capacity(max_participants: Option<i32>) -> Result<(), DevelopmentError> {
    match max_participants {
        Some(n) if n <= 0 => Err(DevelopmentError::InvalidCapacity),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use db::{DBService, models::development::InitiativeCategory};

    use super::*;

    fn event(title: &str, date: Option<NaiveDate>) -> CreateDevelopmentInitiative {
        CreateDevelopmentInitiative {
            title: title.to_string(),
            description: Some("Bring a dish".to_string()),
            category: Some(InitiativeCategory::Event),
            status: None,
            priority: None,
            event_date: date,
            event_time: NaiveTime::from_hms_opt(18, 30, 0),
            duration: Some("2.5 hours".to_string()),
            location: Some("Common room".to_string()),
            max_participants: Some(30),
        }
    }

    #[tokio::test]
    async fn dated_initiative_appears_on_calendar() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();

        let initiative =
            DevelopmentService::create(&db.pool, session, &event("Potluck", Some(date)))
                .await
                .unwrap();

        let events = CalendarEvent::find_by_reference(
            &db.pool,
            initiative.id,
            CalendarEventType::DevelopmentEvent,
        )
        .await
        .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "Development Event");
        assert_eq!(events[0].start_time, date.and_hms_opt(18, 30, 0).unwrap());
        assert_eq!(events[0].end_time, date.and_hms_opt(21, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn clearing_date_removes_calendar_entry() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        let initiative =
            DevelopmentService::create(&db.pool, session, &event("Workshop", Some(date)))
                .await
                .unwrap();

        DevelopmentService::update(
            &db.pool,
            session,
            initiative.id,
            &UpdateDevelopmentInitiative {
                event_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(
            CalendarEvent::find_by_reference(
                &db.pool,
                initiative.id,
                CalendarEventType::DevelopmentEvent
            )
            .await
            .unwrap()
            .is_empty()
        );
    }

    #[tokio::test]
    async fn non_positive_capacity_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let mut data = event("Cleanup", None);
        data.max_participants = Some(0);
        assert!(matches!(
            DevelopmentService::create(&db.pool, Session::new(Uuid::new_v4()), &data).await,
            Err(DevelopmentError::InvalidCapacity)
        ));
    }

    #[tokio::test]
    async fn delete_removes_comments_and_calendar_entry() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let initiative = DevelopmentService::create(&db.pool, session, &event("Fair", Some(date)))
            .await
            .unwrap();
        Comment::create(
            &db.pool,
            CommentResource::Development,
            initiative.id,
            session.user_id,
            "Count me in",
        )
        .await
        .unwrap();

        DevelopmentService::delete(&db.pool, initiative.id).await.unwrap();

        assert!(
            DevelopmentInitiative::find_by_id(&db.pool, initiative.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            Comment::find_by_resource(&db.pool, CommentResource::Development, initiative.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            CalendarEvent::find_by_reference(
                &db.pool,
                initiative.id,
                CalendarEventType::DevelopmentEvent
            )
            .await
            .unwrap()
            .is_empty()
        );
    }
}
