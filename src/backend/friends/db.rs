//! Database operations for friendships

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::friendship::{FriendEntry, FriendList, Friendship, FriendshipStatus};

const FRIENDSHIP_COLUMNS: &str = "id, requester_id, addressee_id, status, created_at, responded_at";

#[derive(Debug, Clone, sqlx::FromRow)]
struct FriendshipRow {
    id: Uuid,
    requester_id: Uuid,
    addressee_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

impl From<FriendshipRow> for Friendship {
    fn from(row: FriendshipRow) -> Self {
        Friendship {
            id: row.id,
            requester_id: row.requester_id,
            addressee_id: row.addressee_id,
            status: FriendshipStatus::from_str(&row.status).unwrap_or_default(),
            created_at: row.created_at,
            responded_at: row.responded_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct FriendEntryRow {
    id: Uuid,
    addressee_id: Uuid,
    other_id: Uuid,
    other_username: String,
    status: String,
    created_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
}

/// Create a pending request
pub async fn insert_friendship(
    pool: &SqlitePool,
    requester_id: Uuid,
    addressee_id: Uuid,
) -> Result<Friendship, sqlx::Error> {
    let row = sqlx::query_as::<_, FriendshipRow>(&format!(
        r#"
        INSERT INTO friendships (id, requester_id, addressee_id, status, created_at)
        VALUES (?, ?, ?, 'pending', ?)
        RETURNING {}
        "#,
        FRIENDSHIP_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(requester_id)
    .bind(addressee_id)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(row.into())
}

/// Get a friendship by id
pub async fn get_friendship(pool: &SqlitePool, id: Uuid) -> Result<Option<Friendship>, sqlx::Error> {
    let row = sqlx::query_as::<_, FriendshipRow>(&format!(
        "SELECT {} FROM friendships WHERE id = ?",
        FRIENDSHIP_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Friendship::from))
}

/// The friendship between two users, in either direction
pub async fn find_between(pool: &SqlitePool, a: Uuid, b: Uuid) -> Result<Option<Friendship>, sqlx::Error> {
    let row = sqlx::query_as::<_, FriendshipRow>(&format!(
        r#"
        SELECT {} FROM friendships
        WHERE (requester_id = ?1 AND addressee_id = ?2)
           OR (requester_id = ?2 AND addressee_id = ?1)
        "#,
        FRIENDSHIP_COLUMNS
    ))
    .bind(a)
    .bind(b)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Friendship::from))
}

/// Mark a pending request accepted
///
/// Returns `None` when the row is gone or no longer pending.
pub async fn accept_friendship(
    pool: &SqlitePool,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<Option<Friendship>, sqlx::Error> {
    let row = sqlx::query_as::<_, FriendshipRow>(&format!(
        r#"
        UPDATE friendships SET status = 'accepted', responded_at = ?
        WHERE id = ? AND status = 'pending'
        RETURNING {}
        "#,
        FRIENDSHIP_COLUMNS
    ))
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Friendship::from))
}

/// Delete a friendship
pub async fn delete_friendship(pool: &SqlitePool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM friendships WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Every friendship of `user_id`, split by status and direction
pub async fn list_friends(pool: &SqlitePool, user_id: Uuid) -> Result<FriendList, sqlx::Error> {
    let rows = sqlx::query_as::<_, FriendEntryRow>(
        r#"
        SELECT f.id, f.addressee_id, p.id AS other_id, p.username AS other_username,
               f.status, f.created_at, f.responded_at
        FROM friendships f
        JOIN profiles p
          ON p.id = CASE WHEN f.requester_id = ?1 THEN f.addressee_id ELSE f.requester_id END
        WHERE f.requester_id = ?1 OR f.addressee_id = ?1
        ORDER BY p.username ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut list = FriendList::default();
    for row in rows {
        let status = FriendshipStatus::from_str(&row.status).unwrap_or_default();
        let incoming = row.addressee_id == user_id;
        let entry = FriendEntry {
            friendship_id: row.id,
            user_id: row.other_id,
            username: row.other_username,
            status,
            since: row.responded_at.unwrap_or(row.created_at),
        };
        match (status, incoming) {
            (FriendshipStatus::Accepted, _) => list.friends.push(entry),
            (FriendshipStatus::Pending, true) => list.incoming.push(entry),
            (FriendshipStatus::Pending, false) => list.outgoing.push(entry),
        }
    }
    Ok(list)
}
