//! Calendar entries: manual ones created by members, and derived ones
//! materialized from dated garden tasks, development events and
//! maintenance visits.
//!
//! A derived entry is identified by `(reference_id, event_type)`. Writing it
//! is a single upsert, so re-materializing after every edit converges on
//! exactly one row per source record.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use db::models::{
    calendar_event::{
        CalendarEvent, CalendarEventType, CreateCalendarEvent, MANUAL_DEFAULT_CATEGORY,
        ManualEventChanges, SourceCalendarEvent, UpdateCalendarEvent,
    },
    development::DevelopmentInitiative,
    garden::GardenTask,
    maintenance::MaintenanceVisit,
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::auth::Session;

/// Duration value meaning "the whole day".
pub const ALL_DAY_SENTINEL: &str = "24";
const DEFAULT_DURATION_HOURS: f64 = 1.0;
/// Longest accepted duration, one leap year.
const MAX_DURATION_HOURS: f64 = 24.0 * 366.0;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("event must end at or after its start")]
    InvalidRange,
    #[error("event title cannot be empty")]
    EmptyTitle,
    #[error("calendar event not found")]
    NotFound,
    #[error("this event is generated from a {0} and must be changed there")]
    DerivedEventReadOnly(CalendarEventType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventDuration {
    AllDay,
    Hours(f64),
}

impl EventDuration {
    /// Parse a free-form hours value. Only a leading number is read, so
    /// `"2 hours"` is two hours. Blank, non-numeric, zero and negative
    /// values fall back to one hour, as do values longer than a year.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return EventDuration::Hours(DEFAULT_DURATION_HOURS);
        };
        if raw == ALL_DAY_SENTINEL {
            return EventDuration::AllDay;
        }
        match leading_number(raw) {
            Some(hours) if hours > 0.0 && hours <= MAX_DURATION_HOURS => {
                EventDuration::Hours(hours)
            }
            _ => EventDuration::Hours(DEFAULT_DURATION_HOURS),
        }
    }

    pub fn as_delta(self) -> TimeDelta {
        match self {
            EventDuration::AllDay => TimeDelta::hours(24),
            EventDuration::Hours(hours) => {
                TimeDelta::milliseconds((hours * 3_600_000.0).round() as i64)
            }
        }
    }
}

fn leading_number(raw: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = raw
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    raw[..end].parse::<f64>().ok()
}

pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Start and end of an entry for a source dated `date`.
pub fn event_window(
    date: NaiveDate,
    time: Option<NaiveTime>,
    duration: Option<&str>,
) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(time.unwrap_or_else(default_start_time));
    let end = start
        .checked_add_signed(EventDuration::parse(duration).as_delta())
        .unwrap_or(start);
    (start, end)
}

pub struct CalendarService;

impl CalendarService {
    /// Write the entry for a dated source. Repeated calls update in place.
    pub async fn materialize(
        pool: &SqlitePool,
        source: &SourceCalendarEvent,
        actor: Uuid,
    ) -> Result<CalendarEvent, CalendarError> {
        let event = CalendarEvent::upsert_for_source(pool, source, actor).await?;
        debug!(
            reference_id = %source.reference_id,
            event_type = %source.event_type,
            start_time = %event.start_time,
            end_time = %event.end_time,
            "Calendar event materialized"
        );
        Ok(event)
    }

    /// Keep a garden task's entry in step with its due date. A task without
    /// a due date has no entry.
    pub async fn materialize_garden_task(
        pool: &SqlitePool,
        task: &GardenTask,
        actor: Uuid,
    ) -> Result<Option<CalendarEvent>, CalendarError> {
        let Some(due_date) = task.due_date else {
            Self::clear_for_source(pool, task.id, CalendarEventType::GardenTask).await?;
            return Ok(None);
        };
        let (start_time, end_time) =
            event_window(due_date, task.scheduled_time, task.duration.as_deref());
        let source = SourceCalendarEvent {
            reference_id: task.id,
            event_type: CalendarEventType::GardenTask,
            title: task.title.clone(),
            description: task.description.clone(),
            start_time,
            end_time,
        };
        Self::materialize(pool, &source, actor).await.map(Some)
    }

    pub async fn materialize_development_event(
        pool: &SqlitePool,
        initiative: &DevelopmentInitiative,
        actor: Uuid,
    ) -> Result<Option<CalendarEvent>, CalendarError> {
        let Some(event_date) = initiative.event_date else {
            Self::clear_for_source(pool, initiative.id, CalendarEventType::DevelopmentEvent)
                .await?;
            return Ok(None);
        };
        let (start_time, end_time) = event_window(
            event_date,
            initiative.event_time,
            initiative.duration.as_deref(),
        );
        let source = SourceCalendarEvent {
            reference_id: initiative.id,
            event_type: CalendarEventType::DevelopmentEvent,
            title: initiative.title.clone(),
            description: initiative.description.clone(),
            start_time,
            end_time,
        };
        Self::materialize(pool, &source, actor).await.map(Some)
    }

    pub async fn materialize_maintenance_visit(
        pool: &SqlitePool,
        visit: &MaintenanceVisit,
        request_title: &str,
        actor: Uuid,
    ) -> Result<CalendarEvent, CalendarError> {
        let (start_time, end_time) = event_window(
            visit.scheduled_date,
            visit.scheduled_time,
            visit.estimated_duration.as_deref(),
        );
        let source = SourceCalendarEvent {
            reference_id: visit.id,
            event_type: CalendarEventType::MaintenanceVisit,
            title: format!("P4P Visit: {request_title}"),
            description: visit.notes.clone(),
            start_time,
            end_time,
        };
        Self::materialize(pool, &source, actor).await
    }

    pub async fn clear_for_source(
        pool: &SqlitePool,
        reference_id: Uuid,
        event_type: CalendarEventType,
    ) -> Result<u64, CalendarError> {
        let removed = CalendarEvent::delete_by_reference(pool, reference_id, event_type).await?;
        if removed > 0 {
            debug!(
                reference_id = %reference_id,
                event_type = %event_type,
                "Calendar event cleared"
            );
        }
        Ok(removed)
    }

    pub async fn list_range(
        pool: &SqlitePool,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        if to < from {
            return Err(CalendarError::InvalidRange);
        }
        Ok(CalendarEvent::find_in_range(pool, from, to).await?)
    }

    pub async fn create_manual(
        pool: &SqlitePool,
        session: Session,
        data: &CreateCalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        if data.title.trim().is_empty() {
            return Err(CalendarError::EmptyTitle);
        }
        if data.end_time < data.start_time {
            return Err(CalendarError::InvalidRange);
        }
        let event = CalendarEvent::create_manual(pool, data, session.user_id).await?;
        info!(event_id = %event.id, user_id = %session.user_id, "Calendar event created");
        Ok(event)
    }

    pub async fn update_manual(
        pool: &SqlitePool,
        session: Session,
        id: Uuid,
        data: &UpdateCalendarEvent,
    ) -> Result<CalendarEvent, CalendarError> {
        let existing = Self::find_manual(pool, id).await?;

        let title = data.title.as_deref().unwrap_or(&existing.title);
        if title.trim().is_empty() {
            return Err(CalendarError::EmptyTitle);
        }
        let description = match &data.description {
            Some(d) => d.as_deref(),
            None => existing.description.as_deref(),
        };
        let start_time = data.start_time.unwrap_or(existing.start_time);
        let end_time = data.end_time.unwrap_or(existing.end_time);
        if end_time < start_time {
            return Err(CalendarError::InvalidRange);
        }
        let category = data
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(if data.category.is_some() {
                MANUAL_DEFAULT_CATEGORY
            } else {
                existing.category.as_str()
            });

        let changes = ManualEventChanges {
            title,
            description,
            start_time,
            end_time,
            category,
        };
        Ok(CalendarEvent::update_manual(pool, &existing, &changes, session.user_id).await?)
    }

    pub async fn delete_manual(
        pool: &SqlitePool,
        session: Session,
        id: Uuid,
    ) -> Result<(), CalendarError> {
        let existing = Self::find_manual(pool, id).await?;
        CalendarEvent::delete(pool, existing.id).await?;
        info!(event_id = %id, user_id = %session.user_id, "Calendar event deleted");
        Ok(())
    }

    async fn find_manual(pool: &SqlitePool, id: Uuid) -> Result<CalendarEvent, CalendarError> {
        let event = CalendarEvent::find_by_id(pool, id)
            .await?
            .ok_or(CalendarError::NotFound)?;
        if event.event_type.is_derived() {
            return Err(CalendarError::DerivedEventReadOnly(event.event_type));
        }
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use db::{
        DBService,
        models::{
            garden::{CreateGardenTask, UpdateGardenTask},
            maintenance::{CreateMaintenanceRequest, CreateMaintenanceVisit, MaintenanceRequest},
        },
    };

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn garden_task_without_time_starts_at_nine() {
        let (start, end) = event_window(date(2024, 5, 1), None, Some("2"));
        assert_eq!(start, date(2024, 5, 1).and_time(time(9, 0)));
        assert_eq!(end, date(2024, 5, 1).and_time(time(11, 0)));
    }

    #[test]
    fn window_length_matches_parsed_duration() {
        for (raw, expected_ms) in [
            (Some("1"), 3_600_000),
            (Some("1.5"), 5_400_000),
            (Some("0.25"), 900_000),
            (Some("3 hours"), 10_800_000),
            (Some("12"), 43_200_000),
            (Some("24"), 86_400_000),
            (Some(" 24 "), 86_400_000),
            (Some("abc"), 3_600_000),
            (Some(""), 3_600_000),
            (Some("0"), 3_600_000),
            (Some("-2"), 3_600_000),
            (Some("8784"), 31_622_400_000),
            (Some("8785"), 3_600_000),
            (Some("100000000000"), 3_600_000),
            (Some("99999999999999999999"), 3_600_000),
            (None, 3_600_000),
        ] {
            let (start, end) = event_window(date(2024, 6, 3), Some(time(14, 30)), raw);
            assert_eq!(
                (end - start).num_milliseconds(),
                expected_ms,
                "duration {raw:?}"
            );
            assert!(end >= start);
        }
    }

    #[test]
    fn all_day_sentinel_spans_a_full_day() {
        assert_eq!(EventDuration::parse(Some("24")), EventDuration::AllDay);
        let (start, end) = event_window(date(2024, 12, 31), Some(time(0, 0)), Some("24"));
        assert_eq!(end, date(2025, 1, 1).and_time(time(0, 0)));
        assert_eq!(end - start, TimeDelta::hours(24));
    }

    async fn dated_garden_task(db: &DBService, actor: Uuid) -> GardenTask {
        GardenTask::create(
            &db.pool,
            &CreateGardenTask {
                area_id: None,
                title: "Plant tomatoes".to_string(),
                description: Some("South bed".to_string()),
                status: None,
                due_date: Some(date(2024, 5, 1)),
                scheduled_time: None,
                duration: Some("2".to_string()),
                assigned_to: None,
            },
            actor,
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn garden_task_materializes_with_garden_category() {
        let db = DBService::new_in_memory().await.unwrap();
        let actor = Uuid::new_v4();
        let task = dated_garden_task(&db, actor).await;

        let event = CalendarService::materialize_garden_task(&db.pool, &task, actor)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.category, "Garden");
        assert_eq!(event.event_type, CalendarEventType::GardenTask);
        assert_eq!(event.reference_id, Some(task.id));
        assert_eq!(event.start_time, date(2024, 5, 1).and_time(time(9, 0)));
        assert_eq!(event.end_time, date(2024, 5, 1).and_time(time(11, 0)));
        assert_eq!(event.created_by, actor);
    }

    #[tokio::test]
    async fn repeated_materialization_converges_on_one_row() {
        let db = DBService::new_in_memory().await.unwrap();
        let actor = Uuid::new_v4();
        let mut task = dated_garden_task(&db, actor).await;

        for hour in [8, 10, 13, 16] {
            task = GardenTask::update(
                &db.pool,
                &task,
                &UpdateGardenTask {
                    scheduled_time: Some(Some(time(hour, 0))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
            CalendarService::materialize_garden_task(&db.pool, &task, actor)
                .await
                .unwrap();
        }

        let rows =
            CalendarEvent::find_by_reference(&db.pool, task.id, CalendarEventType::GardenTask)
                .await
                .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_time, date(2024, 5, 1).and_time(time(16, 0)));
    }

    #[tokio::test]
    async fn clearing_due_date_removes_entry() {
        let db = DBService::new_in_memory().await.unwrap();
        let actor = Uuid::new_v4();
        let task = dated_garden_task(&db, actor).await;
        CalendarService::materialize_garden_task(&db.pool, &task, actor)
            .await
            .unwrap();

        let undated = GardenTask::update(
            &db.pool,
            &task,
            &UpdateGardenTask {
                due_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let result = CalendarService::materialize_garden_task(&db.pool, &undated, actor)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(
            CalendarEvent::find_by_reference(&db.pool, task.id, CalendarEventType::GardenTask)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn maintenance_visit_uses_p4p_category() {
        let db = DBService::new_in_memory().await.unwrap();
        let actor = Uuid::new_v4();
        let request = MaintenanceRequest::create(
            &db.pool,
            &CreateMaintenanceRequest {
                title: "Boiler service".to_string(),
                description: None,
                location: Some("Basement".to_string()),
                priority: None,
            },
            actor,
        )
        .await
        .unwrap();
        let visit = MaintenanceVisit::create(
            &db.pool,
            request.id,
            &CreateMaintenanceVisit {
                scheduled_date: date(2024, 7, 2),
                scheduled_time: Some(time(13, 0)),
                estimated_duration: Some("24".to_string()),
                notes: None,
            },
            actor,
        )
        .await
        .unwrap();

        let event =
            CalendarService::materialize_maintenance_visit(&db.pool, &visit, &request.title, actor)
                .await
                .unwrap();
        assert_eq!(event.category, "P4P Visit");
        assert_eq!(event.title, "P4P Visit: Boiler service");
        assert_eq!(event.end_time - event.start_time, TimeDelta::hours(24));
    }

    #[tokio::test]
    async fn derived_events_are_read_only_through_calendar() {
        let db = DBService::new_in_memory().await.unwrap();
        let actor = Session::new(Uuid::new_v4());
        let task = dated_garden_task(&db, actor.user_id).await;
        let event = CalendarService::materialize_garden_task(&db.pool, &task, actor.user_id)
            .await
            .unwrap()
            .unwrap();

        let err = CalendarService::delete_manual(&db.pool, actor, event.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CalendarError::DerivedEventReadOnly(CalendarEventType::GardenTask)
        ));
    }

    #[tokio::test]
    async fn manual_event_validation_and_update() {
        let db = DBService::new_in_memory().await.unwrap();
        let session = Session::new(Uuid::new_v4());
        let start = date(2024, 9, 1).and_time(time(18, 0));

        let backwards = CreateCalendarEvent {
            title: "AGM".to_string(),
            description: None,
            start_time: start,
            end_time: start - TimeDelta::hours(1),
            category: None,
        };
        assert!(matches!(
            CalendarService::create_manual(&db.pool, session, &backwards).await,
            Err(CalendarError::InvalidRange)
        ));

        let event = CalendarService::create_manual(
            &db.pool,
            session,
            &CreateCalendarEvent {
                end_time: start + TimeDelta::hours(2),
                ..backwards
            },
        )
        .await
        .unwrap();
        assert_eq!(event.category, "Miscellaneous");

        let editor = Session::new(Uuid::new_v4());
        let updated = CalendarService::update_manual(
            &db.pool,
            editor,
            event.id,
            &UpdateCalendarEvent {
                category: Some("Governance".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.category, "Governance");
        assert_eq!(updated.title, event.title);
        assert_eq!(updated.start_time, event.start_time);
        assert_eq!(updated.end_time, event.end_time);
        assert_eq!(updated.created_by, session.user_id);
        assert_eq!(updated.last_modified_by, Some(editor.user_id));
    }
}
