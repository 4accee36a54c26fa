/**
 * Profile Store
 *
 * Profiles mirror the identities of the external auth provider. A row is
 * upserted whenever a verified session is seen, so foreign keys from rooms,
 * messages and friendships always resolve.
 */

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::profile::{guest_username, Profile};

#[derive(Debug, Clone, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    is_guest: bool,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            username: row.username,
            is_guest: row.is_guest,
            created_at: row.created_at,
        }
    }
}

/// Insert or refresh a profile
///
/// A provided username replaces the stored one; otherwise the stored name
/// is kept, or a guest name is derived for new rows. The guest flag always
/// follows the latest session, so a guest that registers is upgraded.
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `user_id` - Token subject
/// * `username` - Username claim, if any
/// * `is_guest` - Anonymous session flag
pub async fn upsert_profile(
    pool: &SqlitePool,
    user_id: Uuid,
    username: Option<&str>,
    is_guest: bool,
) -> Result<Profile, sqlx::Error> {
    let username = username.map(str::trim).filter(|name| !name.is_empty());
    let initial_name = username
        .map(str::to_string)
        .unwrap_or_else(|| guest_username(user_id));

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (id, username, is_guest, created_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(id) DO UPDATE
            SET is_guest = excluded.is_guest,
                username = COALESCE(?5, profiles.username)
        RETURNING id, username, is_guest, created_at
        "#,
    )
    .bind(user_id)
    .bind(&initial_name)
    .bind(is_guest)
    .bind(Utc::now())
    .bind(username)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Get a profile by id
pub async fn get_profile(pool: &SqlitePool, user_id: Uuid) -> Result<Option<Profile>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProfileRow>(
        "SELECT id, username, is_guest, created_at FROM profiles WHERE id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Profile::from))
}
