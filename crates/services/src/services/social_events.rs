use db::models::{
    comment::{Comment, CommentResource},
    social_event::{
        CreateSocialEvent, RsvpStatus, SocialEvent, SocialEventParticipant, UpdateSocialEvent,
    },
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::auth::Session;

#[derive(Debug, Error)]
pub enum SocialEventError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("social event not found")]
    NotFound,
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("event must end at or after its start")]
    InvalidTimes,
    #[error("not registered for this event")]
    NotParticipating,
}

pub struct SocialEventService;

impl SocialEventService {
    pub async fn create(
        pool: &SqlitePool,
        session: Session,
        data: &CreateSocialEvent,
    ) -> Result<SocialEvent, SocialEventError> {
        if data.title.trim().is_empty() {
            return Err(SocialEventError::EmptyTitle);
        }
        check_times(data.start_time, data.end_time)?;
        let event = SocialEvent::create(pool, data, session.user_id).await?;
        info!(event_id = %event.id, user_id = %session.user_id, "Social event created");
        Ok(event)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateSocialEvent,
    ) -> Result<SocialEvent, SocialEventError> {
        let existing = Self::find(pool, id).await?;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(SocialEventError::EmptyTitle);
        }
        check_times(
            data.start_time.unwrap_or(existing.start_time),
            data.end_time.unwrap_or(existing.end_time),
        )?;
        Ok(SocialEvent::update(pool, &existing, data).await?)
    }

    /// Remove the event and its comment thread. Participants go with the
    /// event through the foreign key.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), SocialEventError> {
        let mut tx = pool.begin().await?;
        Comment::delete_for_resource(&mut *tx, CommentResource::SocialEvent, id).await?;
        if SocialEvent::delete(&mut *tx, id).await? == 0 {
            return Err(SocialEventError::NotFound);
        }
        tx.commit().await?;
        info!(event_id = %id, "Social event deleted");
        Ok(())
    }

    pub async fn rsvp(
        pool: &SqlitePool,
        session: Session,
        event_id: Uuid,
        status: RsvpStatus,
    ) -> Result<SocialEventParticipant, SocialEventError> {
        Self::find(pool, event_id).await?;
        let participant =
            SocialEventParticipant::upsert(pool, event_id, session.user_id, status).await?;
        info!(
            event_id = %event_id,
            user_id = %session.user_id,
            status = %participant.status,
            "RSVP recorded"
        );
        Ok(participant)
    }

    pub async fn leave(
        pool: &SqlitePool,
        session: Session,
        event_id: Uuid,
    ) -> Result<(), SocialEventError> {
        if SocialEventParticipant::delete(pool, event_id, session.user_id).await? == 0 {
            return Err(SocialEventError::NotParticipating);
        }
        Ok(())
    }

    async fn find(pool: &SqlitePool, id: Uuid) -> Result<SocialEvent, SocialEventError> {
        SocialEvent::find_by_id(pool, id)
            .await?
            .ok_or(SocialEventError::NotFound)
    }
}

fn check_times(
    start: Option<chrono::NaiveTime>,
    end: Option<chrono::NaiveTime>,
) -> Result<(), SocialEventError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(SocialEventError::InvalidTimes),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use db::DBService;

    use super::*;

    fn picnic() -> CreateSocialEvent {
        CreateSocialEvent {
            title: "Summer picnic".to_string(),
            description: None,
            category: Some("Outdoor".to_string()),
            event_date: NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            start_time: NaiveTime::from_hms_opt(12, 0, 0),
            end_time: NaiveTime::from_hms_opt(15, 0, 0),
            location: Some("Courtyard".to_string()),
        }
    }

    #[tokio::test]
    async fn rsvp_is_one_row_per_member() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let event = SocialEventService::create(&db.pool, session, &picnic()).await.unwrap();

        SocialEventService::rsvp(&db.pool, session, event.id, RsvpStatus::Maybe)
            .await
            .unwrap();
        let updated = SocialEventService::rsvp(&db.pool, session, event.id, RsvpStatus::Going)
            .await
            .unwrap();

        let participants = SocialEventParticipant::find_by_event_id(&db.pool, event.id)
            .await
            .unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(updated.status, RsvpStatus::Going);

        SocialEventService::leave(&db.pool, session, event.id).await.unwrap();
        assert!(matches!(
            SocialEventService::leave(&db.pool, session, event.id).await,
            Err(SocialEventError::NotParticipating)
        ));
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let mut data = picnic();
        data.end_time = NaiveTime::from_hms_opt(11, 0, 0);
        assert!(matches!(
            SocialEventService::create(&db.pool, Session::new(Uuid::new_v4()), &data).await,
            Err(SocialEventError::InvalidTimes)
        ));
    }

    #[tokio::test]
    async fn delete_removes_comments_and_participants() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let event = SocialEventService::create(&db.pool, session, &picnic()).await.unwrap();
        SocialEventService::rsvp(&db.pool, session, event.id, RsvpStatus::Going)
            .await
            .unwrap();
        Comment::create(
            &db.pool,
            CommentResource::SocialEvent,
            event.id,
            session.user_id,
            "Bringing lemonade",
        )
        .await
        .unwrap();

        SocialEventService::delete(&db.pool, event.id).await.unwrap();

        assert!(SocialEvent::find_by_id(&db.pool, event.id).await.unwrap().is_none());
        assert!(
            SocialEventParticipant::find_by_event_id(&db.pool, event.id)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            Comment::find_by_resource(&db.pool, CommentResource::SocialEvent, event.id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
