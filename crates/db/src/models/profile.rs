use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProfileRole {
    #[default]
    Member,
    Admin,
}

/// A co-op member. The id is the user id issued by the auth provider.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub unit: Option<String>,
    pub avatar_url: Option<String>,
    pub role: ProfileRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpsertProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub unit: Option<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, full_name, email, unit, avatar_url, role, created_at, updated_at
               FROM profiles
               ORDER BY full_name ASC"#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"SELECT id, full_name, email, unit, avatar_url, role, created_at, updated_at
               FROM profiles
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Insert or refresh the profile for `id`. The role is never changed here.
    pub async fn upsert(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpsertProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Profile>(
            r#"INSERT INTO profiles (id, full_name, email, unit, avatar_url)
               VALUES ($1, $2, $3, $4, $5)
               ON CONFLICT(id) DO UPDATE SET
                   full_name = excluded.full_name,
                   email = excluded.email,
                   unit = excluded.unit,
                   avatar_url = excluded.avatar_url,
                   updated_at = datetime('now', 'subsec')
               RETURNING id, full_name, email, unit, avatar_url, role, created_at, updated_at"#,
        )
        .bind(id)
        .bind(&data.full_name)
        .bind(&data.email)
        .bind(&data.unit)
        .bind(&data.avatar_url)
        .fetch_one(pool)
        .await
    }
}
