use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

use super::task::Priority;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "initiative_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum InitiativeCategory {
    #[default]
    Project,
    Event,
}

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "initiative_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InitiativeStatus {
    #[default]
    Active,
    Completed,
    OnHold,
    Cancelled,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct DevelopmentInitiative {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: InitiativeCategory,
    pub status: InitiativeStatus,
    pub priority: Priority,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateDevelopmentInitiative {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<InitiativeCategory>,
    pub status: Option<InitiativeStatus>,
    pub priority: Option<Priority>,
    pub event_date: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub location: Option<String>,
    pub max_participants: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateDevelopmentInitiative {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    pub category: Option<InitiativeCategory>,
    pub status: Option<InitiativeStatus>,
    pub priority: Option<Priority>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveDate>")]
    pub event_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveTime>")]
    pub event_time: Option<Option<NaiveTime>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub duration: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub location: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<i32>")]
    pub max_participants: Option<Option<i32>>,
}

impl UpdateDevelopmentInitiative {
    pub fn touches_schedule(&self) -> bool {
        self.event_date.is_some()
            || self.event_time.is_some()
            || self.duration.is_some()
            || self.title.is_some()
            || self.description.is_some()
    }
}

const COLUMNS: &str = "id, title, description, category, status, priority, event_date, event_time, duration, location, max_participants, created_by, created_at, updated_at";

impl DevelopmentInitiative {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DevelopmentInitiative>(&format!(
            "SELECT {COLUMNS} FROM development_initiatives ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_category(
        pool: &SqlitePool,
        category: InitiativeCategory,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DevelopmentInitiative>(&format!(
            "SELECT {COLUMNS} FROM development_initiatives WHERE category = $1 ORDER BY created_at DESC"
        ))
        .bind(category)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, DevelopmentInitiative>(&format!(
            "SELECT {COLUMNS} FROM development_initiatives WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateDevelopmentInitiative,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, DevelopmentInitiative>(&format!(
            r#"INSERT INTO development_initiatives
                   (id, title, description, category, status, priority, event_date, event_time, duration, location, max_participants, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.category.clone().unwrap_or_default())
        .bind(data.status.clone().unwrap_or_default())
        .bind(data.priority.clone().unwrap_or_default())
        .bind(data.event_date)
        .bind(data.event_time)
        .bind(&data.duration)
        .bind(&data.location)
        .bind(data.max_participants)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        existing: &DevelopmentInitiative,
        data: &UpdateDevelopmentInitiative,
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
        let status = data.status.clone().unwrap_or_else(|| existing.status.clone());
        let priority = data
            .priority
            .clone()
            .unwrap_or_else(|| existing.priority.clone());
        let event_date = data.event_date.unwrap_or(existing.event_date);
        let event_time = data.event_time.unwrap_or(existing.event_time);
        let duration = data
            .duration
            .clone()
            .unwrap_or_else(|| existing.duration.clone());
        let location = data
            .location
            .clone()
            .unwrap_or_else(|| existing.location.clone());
        let max_participants = data.max_participants.unwrap_or(existing.max_participants);

        sqlx::query_as::<_, DevelopmentInitiative>(&format!(
            r#"UPDATE development_initiatives
               SET title = $2, description = $3, category = $4, status = $5, priority = $6,
                   event_date = $7, event_time = $8, duration = $9, location = $10, max_participants = $11,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(title)
        .bind(description)
        .bind(category)
        .bind(status)
        .bind(priority)
        .bind(event_date)
        .bind(event_time)
        .bind(duration)
        .bind(location)
        .bind(max_participants)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM development_initiatives WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
