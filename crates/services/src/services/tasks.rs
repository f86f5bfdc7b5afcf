//! Shared co-op tasks. A task carries two comment threads: discussion
//! (`task`) and checklist notes (`todo`).

use db::models::{
    comment::{Comment, CommentResource},
    task::{CreateTask, Task, TaskStatus, UpdateTask},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::auth::Session;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("task not found")]
    NotFound,
    #[error("title cannot be empty")]
    EmptyTitle,
}

pub struct TaskService;

impl TaskService {
    pub async fn create(
        pool: &SqlitePool,
        session: Session,
        data: &CreateTask,
    ) -> Result<Task, TaskError> {
        if data.title.trim().is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let task = Task::create(pool, data, Uuid::new_v4(), session.user_id).await?;
        info!(task_id = %task.id, user_id = %session.user_id, "Task created");
        Ok(task)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTask,
    ) -> Result<Task, TaskError> {
        let existing = Task::find_by_id(pool, id).await?.ok_or(TaskError::NotFound)?;
        if data.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TaskError::EmptyTitle);
        }
        Ok(Task::update(pool, &existing, data).await?)
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, TaskError> {
        Task::update_status(pool, id, status)
            .await?
            .ok_or(TaskError::NotFound)
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<(), TaskError> {
        let mut tx = pool.begin().await?;
        let discussion = Comment::delete_for_resource(&mut *tx, CommentResource::Task, id).await?;
        let todos = Comment::delete_for_resource(&mut *tx, CommentResource::Todo, id).await?;
        if Task::delete(&mut *tx, id).await? == 0 {
            return Err(TaskError::NotFound);
        }
        tx.commit().await?;
        info!(
            task_id = %id,
            comments_deleted = discussion + todos,
            "Task deleted"
        );
        Ok(())
    }
}
