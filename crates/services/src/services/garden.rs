//! Garden areas and tasks. Dated tasks are mirrored onto the calendar.

use db::models::{
    calendar_event::{CalendarEvent, CalendarEventType},
    comment::{Comment, CommentResource},
    garden::{CreateGardenArea, CreateGardenTask, GardenArea, GardenTask, UpdateGardenTask},
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
pub enum GardenError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
    #[error("garden task not found")]
    TaskNotFound,
    #[error("garden area not found")]
    AreaNotFound,
    #[error("garden area still has {0} task(s)")]
    AreaInUse(i64),
    #[error("{0} cannot be empty")]
    Blank(&'static str),
}

pub struct GardenService;

impl GardenService {
    pub async fn create_area(
        pool: &SqlitePool,
        data: &CreateGardenArea,
    ) -> Result<GardenArea, GardenError> {
        if data.name.trim().is_empty() {
            return Err(GardenError::Blank("name"));
        }
        Ok(GardenArea::create(pool, data).await?)
    }

    pub async fn update_area(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateGardenArea,
    ) -> Result<GardenArea, GardenError> {
        if data.name.trim().is_empty() {
            return Err(GardenError::Blank("name"));
        }
        GardenArea::update(pool, id, data)
            .await?
            .ok_or(GardenError::AreaNotFound)
    }

    /// Areas that still hold tasks are kept.
    pub async fn delete_area(pool: &SqlitePool, id: Uuid) -> Result<(), GardenError> {
        let tasks = GardenArea::count_tasks(pool, id).await?;
        if tasks > 0 {
            return Err(GardenError::AreaInUse(tasks));
        }
        if GardenArea::delete(pool, id).await? == 0 {
            return Err(GardenError::AreaNotFound);
        }
        Ok(())
    }

    pub async fn create_task(
        pool: &SqlitePool,
        session: Session,
        data: &CreateGardenTask,
    ) -> Result<GardenTask, GardenError> {
        if data.title.trim().is_empty() {
            return Err(GardenError::Blank("title"));
        }
        if let Some(area_id) = data.area_id {
            Self::ensure_area(pool, area_id).await?;
        }

        let task = GardenTask::create(pool, data, session.user_id).await?;
        info!(task_id = %task.id, user_id = %session.user_id, "Garden task created");

        Self::sync_calendar(pool, &task, session).await?;
        Ok(task)
    }

    pub async fn update_task(
        pool: &SqlitePool,
        session: Session,
        id: Uuid,
        data: &UpdateGardenTask,
    ) -> Result<GardenTask, GardenError> {
        let existing = GardenTask::find_by_id(pool, id)
            .await?
            .ok_or(GardenError::TaskNotFound)?;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(GardenError::Blank("title"));
        }
        if let Some(Some(area_id)) = data.area_id {
            Self::ensure_area(pool, area_id).await?;
        }

        let task = GardenTask::update(pool, &existing, data).await?;
        if data.touches_schedule() {
            Self::sync_calendar(pool, &task, session).await?;
        }
        Ok(task)
    }

    /// Remove the task with its comments and calendar entry.
    pub async fn delete_task(pool: &SqlitePool, id: Uuid) -> Result<(), GardenError> {
        let mut tx = pool.begin().await?;
        Comment::delete_for_resource(&mut *tx, CommentResource::Garden, id).await?;
        CalendarEvent::delete_by_reference(&mut *tx, id, CalendarEventType::GardenTask).await?;
        let deleted = GardenTask::delete(&mut *tx, id).await?;
        if deleted == 0 {
            return Err(GardenError::TaskNotFound);
        }
        tx.commit().await?;
        info!(task_id = %id, "Garden task deleted");
        Ok(())
    }

    async fn ensure_area(pool: &SqlitePool, area_id: Uuid) -> Result<(), GardenError> {
        match GardenArea::find_by_id(pool, area_id).await? {
            Some(_) => Ok(()),
            None => Err(GardenError::AreaNotFound),
        }
    }

    async fn sync_calendar(
        pool: &SqlitePool,
        task: &GardenTask,
        session: Session,
    ) -> Result<(), GardenError> {
        if let Err(e) = CalendarService::materialize_garden_task(pool, task, session.user_id).await
        {
            error!(task_id = %task.id, error = %e, "Failed to sync garden task to calendar");
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use db::DBService;

    use super::*;

    fn new_task(title: &str, due: Option<NaiveDate>, area_id: Option<Uuid>) -> CreateGardenTask {
        CreateGardenTask {
            area_id,
            title: title.to_string(),
            description: None,
            status: None,
            due_date: due,
            scheduled_time: None,
            duration: None,
            assigned_to: None,
        }
    }

    fn may_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn dated_task_gets_calendar_entry_and_undated_does_not() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());

        let dated =
            GardenService::create_task(&db.pool, session, &new_task("Mulch", Some(may_day()), None))
                .await
                .unwrap();
        let undated = GardenService::create_task(&db.pool, session, &new_task("Sweep", None, None))
            .await
            .unwrap();

        let dated_events =
            CalendarEvent::find_by_reference(&db.pool, dated.id, CalendarEventType::GardenTask)
                .await
                .unwrap();
        assert_eq!(dated_events.len(), 1);
        assert_eq!(dated_events[0].title, "Mulch");
        assert!(
            CalendarEvent::find_by_reference(&db.pool, undated.id, CalendarEventType::GardenTask)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn status_only_update_leaves_calendar_alone() {
        let db = DBService::new_in_memory().await.unwrap();
        let creator = Session::new(Uuid::new_v4());
        let other = Session::new(Uuid::new_v4());
        let task =
            GardenService::create_task(&db.pool, creator, &new_task("Prune", Some(may_day()), None))
                .await
                .unwrap();

        GardenService::update_task(
            &db.pool,
            other,
            task.id,
            &UpdateGardenTask {
                status: Some(db::models::garden::GardenTaskStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let events =
            CalendarEvent::find_by_reference(&db.pool, task.id, CalendarEventType::GardenTask)
                .await
                .unwrap();
        assert_eq!(events[0].last_modified_by, Some(creator.user_id));
    }

    #[tokio::test]
    async fn deleting_task_removes_comments_and_calendar_entry() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let task =
            GardenService::create_task(&db.pool, session, &new_task("Water", Some(may_day()), None))
                .await
                .unwrap();
        Comment::create(
            &db.pool,
            CommentResource::Garden,
            task.id,
            session.user_id,
            "Hose is in the shed",
        )
        .await
        .unwrap();

        GardenService::delete_task(&db.pool, task.id).await.unwrap();

        assert!(GardenTask::find_by_id(&db.pool, task.id).await.unwrap().is_none());
        assert!(
            Comment::find_by_resource(&db.pool, CommentResource::Garden, task.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            CalendarEvent::find_by_reference(&db.pool, task.id, CalendarEventType::GardenTask)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(matches!(
            GardenService::delete_task(&db.pool, task.id).await,
            Err(GardenError::TaskNotFound)
        ));
    }

    #[tokio::test]
    async fn area_with_tasks_cannot_be_deleted() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let area = GardenService::create_area(
            &db.pool,
            &CreateGardenArea {
                name: "Herb spiral".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        GardenService::create_task(
            &db.pool,
            session,
            &new_task("Harvest basil", None, Some(area.id)),
        )
        .await
        .unwrap();

        assert!(matches!(
            GardenService::delete_area(&db.pool, area.id).await,
            Err(GardenError::AreaInUse(1))
        ));
    }

    #[tokio::test]
    async fn unknown_area_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = GardenService::create_task(
            &db.pool,
            Session::new(Uuid::new_v4()),
            &new_task("Lost", None, Some(Uuid::new_v4())),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, GardenError::AreaNotFound));
    }
}
