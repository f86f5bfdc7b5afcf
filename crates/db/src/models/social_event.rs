use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "social_event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SocialEventStatus {
    #[default]
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "rsvp_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RsvpStatus {
    #[default]
    Going,
    Maybe,
    NotGoing,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SocialEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub status: SocialEventStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateSocialEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateSocialEvent {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub category: Option<Option<String>>,
    pub event_date: Option<NaiveDate>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveTime>")]
    pub start_time: Option<Option<NaiveTime>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveTime>")]
    pub end_time: Option<Option<NaiveTime>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub location: Option<Option<String>>,
    pub status: Option<SocialEventStatus>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SocialEventParticipant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RsvpStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const EVENT_COLUMNS: &str = "id, title, description, category, event_date, start_time, end_time, location, status, created_by, created_at, updated_at";
const PARTICIPANT_COLUMNS: &str = "id, event_id, user_id, status, created_at, updated_at";

impl SocialEvent {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM social_events ORDER BY event_date ASC, start_time ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_upcoming(
        pool: &SqlitePool,
        from: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialEvent>(&format!(
            r#"SELECT {EVENT_COLUMNS} FROM social_events
               WHERE event_date >= $1 AND status = 'upcoming'
               ORDER BY event_date ASC, start_time ASC"#
        ))
        .bind(from)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM social_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateSocialEvent,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SocialEvent>(&format!(
            r#"INSERT INTO social_events (id, title, description, category, event_date, start_time, end_time, location, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.event_date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(&data.location)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        existing: &SocialEvent,
        data: &UpdateSocialEvent,
    ) -> Result<Self, sqlx::Error> {
        let title = data.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = data
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let category = data
            .category
            .clone()
            .unwrap_or_else(|| existing.category.clone());
        let event_date = data.event_date.unwrap_or(existing.event_date);
        let start_time = data.start_time.unwrap_or(existing.start_time);
        let end_time = data.end_time.unwrap_or(existing.end_time);
        let location = data
            .location
            .clone()
            .unwrap_or_else(|| existing.location.clone());
        let status = data.status.clone().unwrap_or_else(|| existing.status.clone());

        sqlx::query_as::<_, SocialEvent>(&format!(
            r#"UPDATE social_events
               SET title = $2, description = $3, category = $4, event_date = $5, start_time = $6,
                   end_time = $7, location = $8, status = $9, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {EVENT_COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(event_date)
        .bind(start_time)
        .bind(end_time)
        .bind(location)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM social_events WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl SocialEventParticipant {
    pub async fn find_by_event_id(
        pool: &SqlitePool,
        event_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialEventParticipant>(&format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM social_event_participants WHERE event_id = $1 ORDER BY created_at ASC"
        ))
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Record or change a member's RSVP; one row per (event, user).
    pub async fn upsert(
        pool: &SqlitePool,
        event_id: Uuid,
        user_id: Uuid,
        status: RsvpStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SocialEventParticipant>(&format!(
            r#"INSERT INTO social_event_participants (id, event_id, user_id, status)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT(event_id, user_id) DO UPDATE SET
                   status = excluded.status,
                   updated_at = datetime('now', 'subsec')
               RETURNING {PARTICIPANT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(user_id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(
        pool: &SqlitePool,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM social_event_participants WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
