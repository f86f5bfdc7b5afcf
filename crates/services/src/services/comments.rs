//! Comment threads shared by every commentable record.
//!
//! One implementation serves all [`CommentResource`] kinds; the kind only
//! selects the table and column names. Ownership rules:
//!
//! - Anyone signed in may comment on an existing record.
//! - Only the author may edit or delete a comment. The author check is part
//!   of the write itself, so a rejected request never touches the row.
//! - Deleting requires an explicit confirmation from the caller.

use db::models::comment::{Comment, CommentResource};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;
use uuid::Uuid;

use super::auth::Session;

pub const COMMENTS_PAGE_SIZE: usize = 5;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("comment cannot be empty")]
    EmptyContent,
    #[error("{resource} {id} not found")]
    ResourceNotFound { resource: CommentResource, id: Uuid },
    #[error("comment not found")]
    NotFound,
    #[error("only the author can change this comment")]
    Forbidden,
    #[error("deleting a comment must be confirmed")]
    ConfirmationRequired,
}

/// One page of a list. `page` is 1-based and always within `1..=total_pages`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice `items` into the requested page. Out-of-range page numbers clamp
/// to the first or last page; an empty list is a single empty page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Newest first; ids break ties so the order is total.
pub fn sort_newest_first(comments: &mut [Comment]) {
    comments.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Order an already-fetched thread and return one page of it.
pub fn page_of(mut comments: Vec<Comment>, page: usize) -> Page<Comment> {
    sort_newest_first(&mut comments);
    paginate(comments, page, COMMENTS_PAGE_SIZE)
}

fn normalize_content(content: &str) -> Result<&str, CommentError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(CommentError::EmptyContent);
    }
    Ok(content)
}

pub struct CommentService;

impl CommentService {
    pub async fn list(
        pool: &SqlitePool,
        resource: CommentResource,
        resource_id: Uuid,
        page: usize,
    ) -> Result<Page<Comment>, CommentError> {
        let comments = Comment::find_by_resource(pool, resource, resource_id).await?;
        Ok(page_of(comments, page))
    }

    pub async fn create(
        pool: &SqlitePool,
        session: Session,
        resource: CommentResource,
        resource_id: Uuid,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let content = normalize_content(content)?;
        if !Comment::parent_exists(pool, resource, resource_id).await? {
            return Err(CommentError::ResourceNotFound {
                resource,
                id: resource_id,
            });
        }

        let comment = Comment::create(pool, resource, resource_id, session.user_id, content).await?;
        info!(
            resource = %resource,
            resource_id = %resource_id,
            comment_id = %comment.id,
            user_id = %session.user_id,
            "Comment created"
        );
        Ok(comment)
    }

    pub async fn edit(
        pool: &SqlitePool,
        session: Session,
        resource: CommentResource,
        comment_id: Uuid,
        content: &str,
    ) -> Result<Comment, CommentError> {
        let content = normalize_content(content)?;
        match Comment::update_content_as_author(
            pool,
            resource,
            comment_id,
            session.user_id,
            content,
        )
        .await?
        {
            Some(comment) => Ok(comment),
            None => Err(Self::classify_rejection(pool, session, resource, comment_id).await?),
        }
    }

    pub async fn delete(
        pool: &SqlitePool,
        session: Session,
        resource: CommentResource,
        comment_id: Uuid,
        confirmed: bool,
    ) -> Result<(), CommentError> {
        if !confirmed {
            return Err(CommentError::ConfirmationRequired);
        }

        let deleted = Comment::delete_as_author(pool, resource, comment_id, session.user_id).await?;
        if deleted == 0 {
            return Err(Self::classify_rejection(pool, session, resource, comment_id).await?);
        }

        info!(
            resource = %resource,
            comment_id = %comment_id,
            user_id = %session.user_id,
            "Comment deleted"
        );
        Ok(())
    }

    /// Explain why an author-scoped write matched nothing.
    async fn classify_rejection(
        pool: &SqlitePool,
        session: Session,
        resource: CommentResource,
        comment_id: Uuid,
    ) -> Result<CommentError, CommentError> {
        match Comment::find_by_id(pool, resource, comment_id).await? {
            None => Ok(CommentError::NotFound),
            Some(_) => {
                warn!(
                    resource = %resource,
                    comment_id = %comment_id,
                    user_id = %session.user_id,
                    "Rejected change to another member's comment"
                );
                Ok(CommentError::Forbidden)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{Duration, TimeZone, Utc};
    use db::{
        DBService,
        models::{
            garden::{CreateGardenTask, GardenTask},
            task::{CreateTask, Task},
        },
    };

    use super::*;

    fn comment_at(minutes: i64) -> Comment {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
        Comment {
            id: Uuid::new_v4(),
            resource: CommentResource::Garden,
            resource_id: Uuid::nil(),
            author_id: Uuid::nil(),
            content: format!("comment {minutes}"),
            created_at: at,
            updated_at: at,
        }
    }

    async fn garden_task(db: &DBService, owner: Uuid) -> GardenTask {
        GardenTask::create(
            &db.pool,
            &CreateGardenTask {
                area_id: None,
                title: "Turn the compost".to_string(),
                description: None,
                status: None,
                due_date: None,
                scheduled_time: None,
                duration: None,
                assigned_to: None,
            },
            owner,
        )
        .await
        .unwrap()
    }

    #[test]
    fn pages_partition_the_sorted_thread() {
        for total in [0usize, 1, 4, 5, 6, 10, 11, 23] {
            let comments: Vec<_> = (0..total as i64).map(comment_at).collect();
            let first = page_of(comments.clone(), 1);
            let mut seen = HashSet::new();
            let mut ordered = Vec::new();
            for page in 1..=first.total_pages {
                let p = page_of(comments.clone(), page);
                assert_eq!(p.page, page);
                if page < p.total_pages {
                    assert_eq!(p.items.len(), COMMENTS_PAGE_SIZE);
                } else {
                    assert!(p.items.len() <= COMMENTS_PAGE_SIZE);
                }
                for c in p.items {
                    assert!(seen.insert(c.id), "duplicated across pages");
                    ordered.push(c.created_at);
                }
            }
            assert_eq!(seen.len(), total);
            assert!(ordered.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn first_page_holds_the_newest_comments() {
        let comments: Vec<_> = (0..7).map(comment_at).collect();
        let page = page_of(comments, 1);
        let contents: Vec<_> = page.items.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["comment 6", "comment 5", "comment 4", "comment 3", "comment 2"]
        );
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn out_of_range_pages_clamp() {
        let comments: Vec<_> = (0..7).map(comment_at).collect();
        assert_eq!(page_of(comments.clone(), 0).page, 1);
        let last = page_of(comments, 99);
        assert_eq!(last.page, 2);
        assert_eq!(last.items.len(), 2);
        let empty = page_of(Vec::new(), 3);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn create_and_list_round_trip_for_garden() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let task = garden_task(&db, author.user_id).await;

        let created = CommentService::create(
            &db.pool,
            author,
            CommentResource::Garden,
            task.id,
            "  Bring gloves  ",
        )
        .await
        .unwrap();
        assert_eq!(created.content, "Bring gloves");
        assert_eq!(created.author_id, author.user_id);

        let page = CommentService::list(&db.pool, CommentResource::Garden, task.id, 1)
            .await
            .unwrap();
        assert_eq!(page.items, vec![created]);
    }

    #[tokio::test]
    async fn blank_comment_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let task = garden_task(&db, author.user_id).await;
        let err = CommentService::create(&db.pool, author, CommentResource::Garden, task.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::EmptyContent));
    }

    #[tokio::test]
    async fn comment_on_missing_record_is_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let err = CommentService::create(
            &db.pool,
            Session::new(Uuid::new_v4()),
            CommentResource::Maintenance,
            Uuid::new_v4(),
            "Leaking again",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CommentError::ResourceNotFound { .. }));
    }

    #[tokio::test]
    async fn only_the_author_can_edit() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let other = Session::new(Uuid::new_v4());
        let task = Task::create(
            &db.pool,
            &CreateTask::from_title_description("Clean gutters".to_string(), None),
            Uuid::new_v4(),
            author.user_id,
        )
        .await
        .unwrap();
        let comment =
            CommentService::create(&db.pool, author, CommentResource::Task, task.id, "On it")
                .await
                .unwrap();

        let err =
            CommentService::edit(&db.pool, other, CommentResource::Task, comment.id, "Mine now")
                .await
                .unwrap_err();
        assert!(matches!(err, CommentError::Forbidden));
        let unchanged = Comment::find_by_id(&db.pool, CommentResource::Task, comment.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.content, "On it");

        let edited =
            CommentService::edit(&db.pool, author, CommentResource::Task, comment.id, "Done")
                .await
                .unwrap();
        assert_eq!(edited.content, "Done");
    }

    #[tokio::test]
    async fn non_owner_delete_leaves_comment_listed() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let other = Session::new(Uuid::new_v4());
        let task = garden_task(&db, author.user_id).await;
        let comment =
            CommentService::create(&db.pool, author, CommentResource::Garden, task.id, "Keep me")
                .await
                .unwrap();

        let err = CommentService::delete(&db.pool, other, CommentResource::Garden, comment.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, CommentError::Forbidden));

        let page = CommentService::list(&db.pool, CommentResource::Garden, task.id, 1)
            .await
            .unwrap();
        assert_eq!(page.total_items, 1);
        assert_eq!(page.items[0].id, comment.id);
    }

    #[tokio::test]
    async fn delete_needs_confirmation_then_removes() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let task = garden_task(&db, author.user_id).await;
        let comment =
            CommentService::create(&db.pool, author, CommentResource::Garden, task.id, "Temporary")
                .await
                .unwrap();

        let err =
            CommentService::delete(&db.pool, author, CommentResource::Garden, comment.id, false)
                .await
                .unwrap_err();
        assert!(matches!(err, CommentError::ConfirmationRequired));

        CommentService::delete(&db.pool, author, CommentResource::Garden, comment.id, true)
            .await
            .unwrap();
        let err =
            CommentService::delete(&db.pool, author, CommentResource::Garden, comment.id, true)
                .await
                .unwrap_err();
        assert!(matches!(err, CommentError::NotFound));
    }

    #[tokio::test]
    async fn threads_are_scoped_by_resource_kind() {
        let db = DBService::new_in_memory().await.unwrap();
        let author = Session::new(Uuid::new_v4());
        let task = Task::create(
            &db.pool,
            &CreateTask::from_title_description("Paint hallway".to_string(), None),
            Uuid::new_v4(),
            author.user_id,
        )
        .await
        .unwrap();

        CommentService::create(&db.pool, author, CommentResource::Task, task.id, "Task note")
            .await
            .unwrap();
        CommentService::create(&db.pool, author, CommentResource::Todo, task.id, "Todo note")
            .await
            .unwrap();

        let task_page = CommentService::list(&db.pool, CommentResource::Task, task.id, 1)
            .await
            .unwrap();
        let todo_page = CommentService::list(&db.pool, CommentResource::Todo, task.id, 1)
            .await
            .unwrap();
        assert_eq!(task_page.items.len(), 1);
        assert_eq!(task_page.items[0].content, "Task note");
        assert_eq!(todo_page.items.len(), 1);
        assert_eq!(todo_page.items[0].resource, CommentResource::Todo);
    }
}
