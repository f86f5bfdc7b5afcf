use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "garden_task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GardenTaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct GardenArea {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateGardenArea {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct GardenTask {
    pub id: Uuid,
    pub area_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: GardenTaskStatus,
    pub due_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration: Option<String>, // Free-form hours, "24" for all day
    pub assigned_to: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateGardenTask {
    pub area_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<GardenTaskStatus>,
    pub due_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration: Option<String>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateGardenTask {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<Uuid>")]
    pub area_id: Option<Option<Uuid>>,
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    pub status: Option<GardenTaskStatus>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveDate>")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveTime>")]
    pub scheduled_time: Option<Option<NaiveTime>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub duration: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<Uuid>")]
    pub assigned_to: Option<Option<Uuid>>,
}

impl UpdateGardenTask {
    /// Whether applying this update can move the task on the calendar.
    pub fn touches_schedule(&self) -> bool {
        self.due_date.is_some()
            || self.scheduled_time.is_some()
            || self.duration.is_some()
            || self.title.is_some()
            || self.description.is_some()
    }
}

const AREA_COLUMNS: &str = "id, name, description, created_at, updated_at";
const TASK_COLUMNS: &str = "id, area_id, title, description, status, due_date, scheduled_time, duration, assigned_to, created_by, created_at, updated_at";

impl GardenArea {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenArea>(&format!(
            "SELECT {AREA_COLUMNS} FROM garden_areas ORDER BY name ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenArea>(&format!(
            "SELECT {AREA_COLUMNS} FROM garden_areas WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateGardenArea) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, GardenArea>(&format!(
            "INSERT INTO garden_areas (id, name, description) VALUES ($1, $2, $3) RETURNING {AREA_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateGardenArea,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenArea>(&format!(
            r#"UPDATE garden_areas SET name = $2, description = $3, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {AREA_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .fetch_optional(pool)
        .await
    }

    pub async fn count_tasks(pool: &SqlitePool, id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM garden_tasks WHERE area_id = $1")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM garden_areas WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

impl GardenTask {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM garden_tasks ORDER BY due_date IS NULL, due_date ASC, created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_area(pool: &SqlitePool, area_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM garden_tasks WHERE area_id = $1 ORDER BY due_date IS NULL, due_date ASC, created_at DESC"
        ))
        .bind(area_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, GardenTask>(&format!(
            "SELECT {TASK_COLUMNS} FROM garden_tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateGardenTask,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        sqlx::query_as::<_, GardenTask>(&format!(
            r#"INSERT INTO garden_tasks (id, area_id, title, description, status, due_date, scheduled_time, duration, assigned_to, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(data.area_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(status)
        .bind(data.due_date)
        .bind(data.scheduled_time)
        .bind(&data.duration)
        .bind(data.assigned_to)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        existing: &GardenTask,
        data: &UpdateGardenTask,
    ) -> Result<Self, sqlx::Error> {
        let area_id = data.area_id.unwrap_or(existing.area_id);
        let title = data.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = data
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let status = data.status.clone().unwrap_or_else(|| existing.status.clone());
        let due_date = data.due_date.unwrap_or(existing.due_date);
        let scheduled_time = data.scheduled_time.unwrap_or(existing.scheduled_time);
        let duration = data
            .duration
            .clone()
            .unwrap_or_else(|| existing.duration.clone());
        let assigned_to = data.assigned_to.unwrap_or(existing.assigned_to);

        sqlx::query_as::<_, GardenTask>(&format!(
            r#"UPDATE garden_tasks
               SET area_id = $2, title = $3, description = $4, status = $5, due_date = $6,
                   scheduled_time = $7, duration = $8, assigned_to = $9,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(area_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(due_date)
        .bind(scheduled_time)
        .bind(duration)
        .bind(assigned_to)
        .fetch_one(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM garden_tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
