use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

pub const MANUAL_DEFAULT_CATEGORY: &str = "Miscellaneous";

/// Where a calendar entry came from.
#[derive(
    Debug,
    Clone,
    Copy,
    Type,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    TS,
    EnumString,
    Display,
    Default,
)]
#[sqlx(type_name = "calendar_event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CalendarEventType {
    #[default]
    Manual,
    GardenTask,
    DevelopmentEvent,
    MaintenanceVisit,
}

impl CalendarEventType {
    /// Category shown for entries of this type. Manual entries pick their
    /// own and fall back to [`MANUAL_DEFAULT_CATEGORY`].
    pub fn category(self) -> &'static str {
        match self {
            CalendarEventType::Manual => MANUAL_DEFAULT_CATEGORY,
            CalendarEventType::GardenTask => "Garden",
            CalendarEventType::DevelopmentEvent => "Development Event",
            CalendarEventType::MaintenanceVisit => "P4P Visit",
        }
    }

    pub fn is_derived(self) -> bool {
        !matches!(self, CalendarEventType::Manual)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS, PartialEq)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub event_type: CalendarEventType,
    pub reference_id: Option<Uuid>, // Source record for derived entries
    pub category: String,
    pub created_by: Uuid,
    pub last_modified_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A calendar entry computed from a source record.
#[derive(Debug, Clone)]
pub struct SourceCalendarEvent {
    pub reference_id: Uuid,
    pub event_type: CalendarEventType,
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category: Option<String>,
}

/// Fully resolved values for a manual entry update.
#[derive(Debug, Clone, Copy)]
pub struct ManualEventChanges<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category: &'a str,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateCalendarEvent {
    pub title: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[ts(optional, as = "Option<String>")]
    pub description: Option<Option<String>>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub category: Option<String>,
}

const COLUMNS: &str = "id, title, description, start_time, end_time, event_type, reference_id, category, created_by, last_modified_by, created_at, updated_at";

impl CalendarEvent {
    /// Entries overlapping `[from, to)`, earliest first. A zero-length entry
    /// counts when its instant lies in the window.
    pub async fn find_in_range(
        pool: &SqlitePool,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"SELECT {COLUMNS} FROM calendar_events
               WHERE start_time < $2 AND (end_time > $1 OR start_time >= $1)
               ORDER BY start_time ASC"#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "SELECT {COLUMNS} FROM calendar_events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_reference(
        pool: &SqlitePool,
        reference_id: Uuid,
        event_type: CalendarEventType,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            "SELECT {COLUMNS} FROM calendar_events WHERE reference_id = $1 AND event_type = $2"
        ))
        .bind(reference_id)
        .bind(event_type)
        .fetch_all(pool)
        .await
    }

    /// Write the entry for a source record in one statement. The unique
    /// index on `(reference_id, event_type)` turns a second write into an
    /// update of the existing row.
    pub async fn upsert_for_source<'e, E>(
        executor: E,
        data: &SourceCalendarEvent,
        actor: Uuid,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"INSERT INTO calendar_events
                   (id, title, description, start_time, end_time, event_type, reference_id, category, created_by, last_modified_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
               ON CONFLICT(reference_id, event_type) DO UPDATE SET
                   title = excluded.title,
                   description = excluded.description,
                   start_time = excluded.start_time,
                   end_time = excluded.end_time,
                   category = excluded.category,
                   last_modified_by = excluded.last_modified_by,
                   updated_at = datetime('now', 'subsec')
               RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.event_type)
        .bind(data.reference_id)
        .bind(data.event_type.category())
        .bind(actor)
        .fetch_one(executor)
        .await
    }

    pub async fn create_manual(
        pool: &SqlitePool,
        data: &CreateCalendarEvent,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let category = data
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(MANUAL_DEFAULT_CATEGORY);
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"INSERT INTO calendar_events
                   (id, title, description, start_time, end_time, event_type, reference_id, category, created_by, last_modified_by)
               VALUES ($1, $2, $3, $4, $5, $6, NULL, $7, $8, $8)
               RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(CalendarEventType::Manual)
        .bind(category)
        .bind(created_by)
        .fetch_one(pool)
        .await
    }

    pub async fn update_manual(
        pool: &SqlitePool,
        existing: &CalendarEvent,
        changes: &ManualEventChanges<'_>,
        modified_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CalendarEvent>(&format!(
            r#"UPDATE calendar_events
               SET title = $2, description = $3, start_time = $4, end_time = $5, category = $6,
                   last_modified_by = $7, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(existing.id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.start_time)
        .bind(changes.end_time)
        .bind(changes.category)
        .bind(modified_by)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_by_reference<'e, E>(
        executor: E,
        reference_id: Uuid,
        event_type: CalendarEventType,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result =
            sqlx::query("DELETE FROM calendar_events WHERE reference_id = $1 AND event_type = $2")
                .bind(reference_id)
                .bind(event_type)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }
}
