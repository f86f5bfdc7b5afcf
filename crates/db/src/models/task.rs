use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

/// Priority shared by tasks, maintenance requests and initiatives.
#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>, // Profile id
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateTask {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<Uuid>,
}

impl CreateTask {
    pub fn from_title_description(title: String, description: Option<String>) -> Self {
        Self {
            title,
            description,
            status: Some(TaskStatus::Todo),
            priority: None,
            due_date: None,
            assigned_to: None,
        }
    }
}

/// Partial update. For nullable columns the outer `Option` says whether the
/// field was sent and the inner one carries the new value (`null` clears it).
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateTask {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<NaiveDate>")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<Uuid>")]
    pub assigned_to: Option<Option<Uuid>>,
}

const TASK_COLUMNS: &str = "id, title, description, status, priority, due_date, assigned_to, created_by, created_at, updated_at";

impl Task {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Tasks assigned to or created by a member, open ones first.
    pub async fn find_for_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"SELECT {TASK_COLUMNS} FROM tasks
               WHERE assigned_to = $1 OR created_by = $1
               ORDER BY CASE status WHEN 'completed' THEN 1 ELSE 0 END, due_date IS NULL, due_date ASC, created_at DESC"#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        data: &CreateTask,
        task_id: Uuid,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let status = data.status.clone().unwrap_or_default();
        let priority = data.priority.clone().unwrap_or_default();
        sqlx::query_as::<_, Task>(&format!(
            r#"INSERT INTO tasks (id, title, description, status, priority, due_date, assigned_to, created_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(task_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(status)
        .bind(priority)
        .bind(data.due_date)
        .bind(data.assigned_to)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    /// Apply `data` on top of the stored row.
    pub async fn update(
        pool: &SqlitePool,
        existing: &Task,
        data: &UpdateTask,
    ) -> Result<Self, sqlx::Error> {
        let title = data.title.clone().unwrap_or_else(|| existing.title.clone());
        let description = data
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone());
        let status = data.status.clone().unwrap_or_else(|| existing.status.clone());
        let priority = data
            .priority
            .clone()
            .unwrap_or_else(|| existing.priority.clone());
        let due_date = data.due_date.unwrap_or(existing.due_date);
        let assigned_to = data.assigned_to.unwrap_or(existing.assigned_to);

        sqlx::query_as::<_, Task>(&format!(
            r#"UPDATE tasks
               SET title = $2, description = $3, status = $4, priority = $5, due_date = $6, assigned_to = $7,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(assigned_to)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(&format!(
            r#"UPDATE tasks SET status = $2, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {TASK_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete<'e, E>(executor: E, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
