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
#[sqlx(type_name = "maintenance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MaintenanceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: Priority,
    pub status: MaintenanceStatus,
    pub reported_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMaintenanceRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateMaintenanceRequest {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub location: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<MaintenanceStatus>,
}

/// A scheduled contractor visit for a request.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct MaintenanceVisit {
    pub id: Uuid,
    pub request_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub estimated_duration: Option<String>,
    pub notes: Option<String>,
    pub completed: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateMaintenanceVisit {
    pub scheduled_date: NaiveDate,
    pub scheduled_time: Option<NaiveTime>,
    pub estimated_duration: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateMaintenanceVisit {
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveTime>")]
    pub scheduled_time: Option<Option<NaiveTime>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub estimated_duration: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub notes: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl UpdateMaintenanceVisit {
    pub fn touches_schedule(&self) -> bool {
        self.scheduled_date.is_some()
            || self.scheduled_time.is_some()
            || self.estimated_duration.is_some()
            || self.notes.is_some()
    }
}

const REQUEST_COLUMNS: &str =
    "id, title, description, location, priority, status, reported_by, created_at, updated_at";
const VISIT_COLUMNS: &str = "id, request_id, scheduled_date, scheduled_time, estimated_duration, notes, completed, created_by, created_at, updated_at";

impl MaintenanceRequest {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM maintenance_requests ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_status(
        pool: &SqlitePool,
        status: MaintenanceStatus,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM maintenance_requests WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM maintenance_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateMaintenanceRequest,
        reported_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let priority = data.priority.clone().unwrap_or_default();
        sqlx::query_as::<_, MaintenanceRequest>(&format!(
            r#"INSERT INTO maintenance_requests (id, title, description, location, priority, reported_by)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {REQUEST_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.location)
        .bind(priority)
        .bind(reported_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        existing: &MaintenanceRequest,
        data: &UpdateMaintenanceRequest,
    ) -> Result<Self, sqlx::Error> {
        let title = data.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = data
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let location = data
            .location
            .clone()
            .unwrap_or_else(|| existing.location.clone());
        let priority = data
            .priority
            .clone()
            .unwrap_or_else(|| existing.priority.clone());
        let status = data.status.clone().unwrap_or_else(|| existing.status.clone());

        sqlx::query_as::<_, MaintenanceRequest>(&format!(
            r#"UPDATE maintenance_requests
               SET title = $2, description = $3, location = $4, priority = $5, status = $6,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {REQUEST_COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(priority)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

impl MaintenanceVisit {
    pub async fn find_by_request_id(
        pool: &SqlitePool,
        request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM maintenance_visits WHERE request_id = $1 ORDER BY scheduled_date ASC, scheduled_time ASC"
        ))
        .bind(request_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceVisit>(&format!(
            "SELECT {VISIT_COLUMNS} FROM maintenance_visits WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        request_id: Uuid,
        data: &CreateMaintenanceVisit,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, MaintenanceVisit>(&format!(
            r#"INSERT INTO maintenance_visits (id, request_id, scheduled_date, scheduled_time, estimated_duration, notes, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING {VISIT_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(request_id)
        .bind(data.scheduled_date)
        .bind(data.scheduled_time)
        .bind(&data.estimated_duration)
        .bind(&data.notes)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        existing: &MaintenanceVisit,
        data: &UpdateMaintenanceVisit,
    ) -> Result<Self, sqlx::Error> {
        let scheduled_date = data.scheduled_date.unwrap_or(existing.scheduled_date);
        let scheduled_time = data.scheduled_time.unwrap_or(existing.scheduled_time);
        let estimated_duration = data
            .estimated_duration
            .clone()
            .unwrap_or_else(|| existing.estimated_duration.clone());
        let notes = data.notes.clone().unwrap_or_else(|| existing.notes.clone());
        let completed = data.completed.unwrap_or(existing.completed);

        sqlx::query_as::<_, MaintenanceVisit>(&format!(
            r#"UPDATE maintenance_visits
               SET scheduled_date = $2, scheduled_time = $3, estimated_duration = $4, notes = $5,
                   completed = $6, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {VISIT_COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(scheduled_date)
        .bind(scheduled_time)
        .bind(estimated_duration)
        .bind(notes)
        .bind(completed)
        .fetch_one(pool)
        .await
    }

    pub async fn ids_for_request<'e, E>(
        executor: E,
        request_id: Uuid,
    ) -> Result<Vec<Uuid>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar("SELECT id FROM maintenance_visits WHERE request_id = $1")
            .bind(request_id)
            .fetch_all(executor)
            .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM maintenance_visits WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_request<'e, E>(
        executor: E,
        request_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM maintenance_visits WHERE request_id = $1")
            .bind(request_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
