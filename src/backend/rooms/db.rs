//! Database operations for rooms and membership
//!
//! Joins run in a single transaction: the invite is consumed with a guarded
//! `UPDATE` and the membership row is inserted only while the member count
//! is below the room's cap, so concurrent joins cannot overfill a room.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::shared::invite::RoomInvite;
use crate::shared::room::{Room, RoomMember, RoomSummary};

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct RoomRow {
    id: Uuid,
    name: String,
    topic: Option<String>,
    emoji: Option<String>,
    is_private: bool,
    max_members: Option<u32>,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room {
            id: row.id,
            name: row.name,
            topic: row.topic,
            emoji: row.emoji,
            is_private: row.is_private,
            max_members: row.max_members,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RoomSummaryRow {
    #[sqlx(flatten)]
    room: RoomRow,
    member_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MemberRow {
    room_id: Uuid,
    user_id: Uuid,
    username: String,
    joined_at: DateTime<Utc>,
    last_seen_ms: i64,
}

impl From<MemberRow> for RoomMember {
    fn from(row: MemberRow) -> Self {
        RoomMember {
            room_id: row.room_id,
            user_id: row.user_id,
            username: row.username,
            joined_at: row.joined_at,
            last_seen: DateTime::from_timestamp_millis(row.last_seen_ms).unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

/// Outcome of a join attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// A membership row was inserted
    Joined { member_count: i64 },
    /// The caller was already a member; `last_seen` was refreshed
    AlreadyMember { member_count: i64 },
    /// Private room and no usable invite
    InviteRejected,
    /// Member cap reached
    RoomFull,
}

const ROOM_COLUMNS: &str = "id, name, topic, emoji, is_private, max_members, owner_id, created_at";

/// Insert a room and its owner's membership
pub async fn create_room(pool: &SqlitePool, room: &Room) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO rooms (id, name, topic, emoji, is_private, max_members, owner_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(room.id)
    .bind(&room.name)
    .bind(&room.topic)
    .bind(&room.emoji)
    .bind(room.is_private)
    .bind(room.max_members)
    .bind(room.owner_id)
    .bind(room.created_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO room_members (room_id, user_id, joined_at, last_seen_ms) VALUES (?, ?, ?, ?)",
    )
    .bind(room.id)
    .bind(room.owner_id)
    .bind(room.created_at)
    .bind(room.created_at.timestamp_millis())
    .execute(&mut *tx)
    .await?;

    tx.commit().await
}

/// Get a room by id
pub async fn get_room(pool: &SqlitePool, room_id: Uuid) -> Result<Option<Room>, sqlx::Error> {
    let row = sqlx::query_as::<_, RoomRow>(&format!("SELECT {} FROM rooms WHERE id = ?", ROOM_COLUMNS))
        .bind(room_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Room::from))
}

/// Rooms visible to a user: public rooms plus those they own or belong to
pub async fn list_visible_rooms(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<RoomSummary>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RoomSummaryRow>(
        r#"
        SELECT r.id, r.name, r.topic, r.emoji, r.is_private, r.max_members, r.owner_id, r.created_at,
               (SELECT COUNT(*) FROM room_members m WHERE m.room_id = r.id) AS member_count
        FROM rooms r
        WHERE r.is_private = 0
           OR r.owner_id = ?1
           OR EXISTS (SELECT 1 FROM room_members m WHERE m.room_id = r.id AND m.user_id = ?1)
        ORDER BY r.rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| RoomSummary {
            room: row.room.into(),
            member_count: row.member_count,
        })
        .collect())
}

/// Overwrite a room's mutable fields
pub async fn update_room(pool: &SqlitePool, room: &Room) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE rooms
        SET name = ?, topic = ?, emoji = ?, is_private = ?, max_members = ?
        WHERE id = ?
        "#,
    )
    .bind(&room.name)
    .bind(&room.topic)
    .bind(&room.emoji)
    .bind(room.is_private)
    .bind(room.max_members)
    .bind(room.id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Delete a room; messages, members and invites cascade
pub async fn delete_room(pool: &SqlitePool, room_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(room_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn member_count(pool: &SqlitePool, room_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM room_members WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(pool)
        .await
}

pub async fn is_member(pool: &SqlitePool, room_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM room_members WHERE room_id = ? AND user_id = ?")
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Whether a user may read a room's content
pub async fn can_view(pool: &SqlitePool, room: &Room, user_id: Uuid) -> Result<bool, sqlx::Error> {
    if !room.is_private || room.is_owned_by(user_id) {
        return Ok(true);
    }
    is_member(pool, room.id, user_id).await
}

/// Members of a room with usernames, oldest first
pub async fn list_members(pool: &SqlitePool, room_id: Uuid) -> Result<Vec<RoomMember>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(
        r#"
        SELECT m.room_id, m.user_id, p.username, m.joined_at, m.last_seen_ms
        FROM room_members m
        JOIN profiles p ON p.id = m.user_id
        WHERE m.room_id = ?
        ORDER BY m.rowid
        "#,
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(RoomMember::from).collect())
}

/// Refresh a member's liveness timestamp
///
/// # Returns
/// `false` when the user is not a member
pub async fn touch_member(
    pool: &SqlitePool,
    room_id: Uuid,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE room_members SET last_seen_ms = ? WHERE room_id = ? AND user_id = ?")
        .bind(now.timestamp_millis())
        .bind(room_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a membership row
///
/// # Returns
/// `false` when there was nothing to remove
pub async fn remove_member(pool: &SqlitePool, room_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM room_members WHERE room_id = ? AND user_id = ?")
        .bind(room_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete memberships whose last heartbeat is older than `cutoff`
pub async fn remove_stale_members(pool: &SqlitePool, cutoff: DateTime<Utc>) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM room_members WHERE last_seen_ms < ?")
        .bind(cutoff.timestamp_millis())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Attempt to join a room
///
/// # Arguments
/// * `room` - Target room
/// * `user_id` - Joining user
/// * `invite` - Invite resolved from the supplied token, if any
/// * `now` - Current time
///
/// Owners and public rooms need no invite. Otherwise the invite must belong
/// to this room and be usable; it is consumed only if the insert succeeds.
pub async fn join_room(
    pool: &SqlitePool,
    room: &Room,
    user_id: Uuid,
    invite: Option<&RoomInvite>,
    now: DateTime<Utc>,
) -> Result<JoinOutcome, sqlx::Error> {
    let now_ms = now.timestamp_millis();
    let mut tx = pool.begin().await?;

    let refreshed = sqlx::query("UPDATE room_members SET last_seen_ms = ? WHERE room_id = ? AND user_id = ?")
        .bind(now_ms)
        .bind(room.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if refreshed.rows_affected() > 0 {
        let member_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_members WHERE room_id = ?")
            .bind(room.id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        return Ok(JoinOutcome::AlreadyMember { member_count });
    }

    let invite_to_consume = if room.is_private && !room.is_owned_by(user_id) {
        match invite {
            Some(invite) if invite.room_id == room.id && invite.is_usable(now) => Some(invite),
            _ => {
                tx.rollback().await?;
                return Ok(JoinOutcome::InviteRejected);
            }
        }
    } else {
        None
    };

    let inserted = sqlx::query(
        r#"
        INSERT INTO room_members (room_id, user_id, joined_at, last_seen_ms)
        SELECT ?1, ?2, ?3, ?4
        WHERE ?5 IS NULL
           OR (SELECT COUNT(*) FROM room_members WHERE room_id = ?1) < ?5
        "#,
    )
    .bind(room.id)
    .bind(user_id)
    .bind(now)
    .bind(now_ms)
    .bind(room.max_members)
    .execute(&mut *tx)
    .await?;
    if inserted.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(JoinOutcome::RoomFull);
    }

    if let Some(invite) = invite_to_consume {
        let consumed = sqlx::query(
            r#"
            UPDATE room_invites
            SET uses = uses + 1,
                is_active = CASE
                    WHEN max_uses IS NOT NULL AND uses + 1 >= max_uses THEN 0
                    ELSE is_active
                END
            WHERE id = ?
              AND is_active = 1
              AND (max_uses IS NULL OR uses < max_uses)
            "#,
        )
        .bind(invite.id)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(JoinOutcome::InviteRejected);
        }
    }

    let member_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM room_members WHERE room_id = ?")
        .bind(room.id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(JoinOutcome::Joined { member_count })
}
