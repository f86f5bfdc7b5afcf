use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use strum_macros::{Display, EnumIter, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// The record families that carry a comment thread.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    TS,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CommentResource {
    Development,
    Garden,
    Maintenance,
    Task,
    Todo,
    SocialEvent,
}

/// Physical layout of one comment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentTable {
    pub table: &'static str,
    pub foreign_key_field: &'static str,
    pub content_field: &'static str,
    pub author_field: &'static str,
    pub parent_table: &'static str,
}

impl CommentResource {
    pub const fn descriptor(self) -> CommentTable {
        match self {
            CommentResource::Development => CommentTable {
                table: "development_comments",
                foreign_key_field: "initiative_id",
                content_field: "content",
                author_field: "user_id",
                parent_table: "development_initiatives",
            },
            CommentResource::Garden => CommentTable {
                table: "garden_comments",
                foreign_key_field: "task_id",
                content_field: "comment",
                author_field: "user_id",
                parent_table: "garden_tasks",
            },
            CommentResource::Maintenance => CommentTable {
                table: "maintenance_comments",
                foreign_key_field: "request_id",
                content_field: "comment",
                author_field: "user_id",
                parent_table: "maintenance_requests",
            },
            CommentResource::Task => CommentTable {
                table: "task_comments",
                foreign_key_field: "task_id",
                content_field: "content",
                author_field: "created_by",
                parent_table: "tasks",
            },
            CommentResource::Todo => CommentTable {
                table: "todo_comments",
                foreign_key_field: "todo_id",
                content_field: "content",
                author_field: "created_by",
                parent_table: "tasks",
            },
            CommentResource::SocialEvent => CommentTable {
                table: "social_event_comments",
                foreign_key_field: "event_id",
                content_field: "content",
                author_field: "user_id",
                parent_table: "social_events",
            },
        }
    }

    pub const fn table(self) -> &'static str {
        self.descriptor().table
    }

    pub const fn foreign_key_field(self) -> &'static str {
        self.descriptor().foreign_key_field
    }

    pub const fn content_field(self) -> &'static str {
        self.descriptor().content_field
    }

    pub const fn author_field(self) -> &'static str {
        self.descriptor().author_field
    }

    pub const fn parent_table(self) -> &'static str {
        self.descriptor().parent_table
    }
}

/// A comment row normalised across every comment table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub resource: CommentResource,
    pub resource_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct CommentRow {
    id: Uuid,
    resource_id: Uuid,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self, resource: CommentResource) -> Comment {
        Comment {
            id: self.id,
            resource,
            resource_id: self.resource_id,
            author_id: self.author_id,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// Column names below come from `CommentTable` constants only, never from
// request input, so interpolating them into SQL is safe.
fn select_columns(t: &CommentTable) -> String {
    format!(
        "id, {fk} AS resource_id, {author} AS author_id, {content} AS content, created_at, updated_at",
        fk = t.foreign_key_field,
        author = t.author_field,
        content = t.content_field,
    )
}

impl Comment {
    pub async fn find_by_resource(
        pool: &SqlitePool,
        resource: CommentResource,
        resource_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let t = resource.descriptor();
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE {fk} = $1 ORDER BY created_at DESC",
            cols = select_columns(&t),
            table = t.table,
            fk = t.foreign_key_field,
        );
        let rows = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(resource_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(|r| r.into_comment(resource)).collect())
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        resource: CommentResource,
        id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let t = resource.descriptor();
        let sql = format!(
            "SELECT {cols} FROM {table} WHERE id = $1",
            cols = select_columns(&t),
            table = t.table,
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.into_comment(resource)))
    }

    /// Whether the record a comment would hang off exists.
    pub async fn parent_exists(
        pool: &SqlitePool,
        resource: CommentResource,
        resource_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let sql = format!(
            "SELECT COUNT(*) FROM {parent} WHERE id = $1",
            parent = resource.parent_table()
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(resource_id)
            .fetch_one(pool)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(
        pool: &SqlitePool,
        resource: CommentResource,
        resource_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let t = resource.descriptor();
        let sql = format!(
            "INSERT INTO {table} (id, {fk}, {author}, {content}) VALUES ($1, $2, $3, $4) RETURNING {cols}",
            table = t.table,
            fk = t.foreign_key_field,
            author = t.author_field,
            content = t.content_field,
            cols = select_columns(&t),
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(resource_id)
            .bind(author_id)
            .bind(content)
            .fetch_one(pool)
            .await?;
        Ok(row.into_comment(resource))
    }

    /// Update the text of a comment owned by `author_id`. Returns `None` when
    /// no row matched both the id and the author.
    pub async fn update_content_as_author(
        pool: &SqlitePool,
        resource: CommentResource,
        id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let t = resource.descriptor();
        let sql = format!(
            "UPDATE {table} SET {content} = $3, updated_at = datetime('now', 'subsec')
             WHERE id = $1 AND {author} = $2
             RETURNING {cols}",
            table = t.table,
            content = t.content_field,
            author = t.author_field,
            cols = select_columns(&t),
        );
        let row = sqlx::query_as::<_, CommentRow>(&sql)
            .bind(id)
            .bind(author_id)
            .bind(content)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(|r| r.into_comment(resource)))
    }

    /// Delete a comment owned by `author_id`, returning the affected row count.
    pub async fn delete_as_author(
        pool: &SqlitePool,
        resource: CommentResource,
        id: Uuid,
        author_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let t = resource.descriptor();
        let sql = format!(
            "DELETE FROM {table} WHERE id = $1 AND {author} = $2",
            table = t.table,
            author = t.author_field,
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(author_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_for_resource<'e, E>(
        executor: E,
        resource: CommentResource,
        resource_id: Uuid,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let t = resource.descriptor();
        let sql = format!(
            "DELETE FROM {table} WHERE {fk} = $1",
            table = t.table,
            fk = t.foreign_key_field,
        );
        let result = sqlx::query(&sql).bind(resource_id).execute(executor).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_resource_maps_to_a_complete_descriptor() {
        for resource in CommentResource::iter() {
            let d = resource.descriptor();
            for field in [
                d.table,
                d.foreign_key_field,
                d.content_field,
                d.author_field,
                d.parent_table,
            ] {
                assert!(!field.is_empty(), "{resource} has an empty field");
            }
            assert_eq!(d, resource.descriptor());
        }
    }

    #[test]
    fn each_resource_has_its_own_table() {
        let mut tables: Vec<_> = CommentResource::iter().map(|r| r.table()).collect();
        tables.sort();
        tables.dedup();
        assert_eq!(tables.len(), CommentResource::iter().count());
    }

    #[test]
    fn field_names_differ_between_families() {
        assert_eq!(CommentResource::Garden.content_field(), "comment");
        assert_eq!(CommentResource::Development.content_field(), "content");
        assert_eq!(CommentResource::Task.author_field(), "created_by");
        assert_eq!(CommentResource::SocialEvent.author_field(), "user_id");
        assert_eq!(CommentResource::Todo.foreign_key_field(), "todo_id");
    }

    #[test]
    fn tags_round_trip_through_strings() {
        assert_eq!(
            CommentResource::from_str("social_event").unwrap(),
            CommentResource::SocialEvent
        );
        assert_eq!(CommentResource::Maintenance.to_string(), "maintenance");
        assert!(CommentResource::from_str("kitchen").is_err());
    }
}
