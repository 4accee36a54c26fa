//! Database operations for messages
//!
//! Messages are ordered by their insertion sequence (`seq`), not by
//! timestamp, so history pages are stable even when clocks collide.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::shared::message::{MediaType, Message, MessageDraft, MessageWithAuthor};

#[derive(Debug, Clone, sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    room_id: Uuid,
    author_id: Uuid,
    content: String,
    media_url: Option<String>,
    media_type: Option<String>,
    created_at: DateTime<Utc>,
    author_username: String,
    author_is_guest: bool,
}

impl From<MessageRow> for MessageWithAuthor {
    fn from(row: MessageRow) -> Self {
        MessageWithAuthor {
            message: Message {
                id: row.id,
                room_id: row.room_id,
                author_id: row.author_id,
                content: row.content,
                media_url: row.media_url,
                media_type: row.media_type.as_deref().and_then(MediaType::from_str),
                created_at: row.created_at,
            },
            author_username: row.author_username,
            author_is_guest: row.author_is_guest,
        }
    }
}

/// Insert one message on an open connection or transaction
pub async fn insert_message(
    conn: &mut SqliteConnection,
    room_id: Uuid,
    author_id: Uuid,
    draft: &MessageDraft,
) -> Result<Message, sqlx::Error> {
    let message = Message {
        id: Uuid::new_v4(),
        room_id,
        author_id,
        content: draft.content.clone(),
        media_url: draft.media_url.clone(),
        media_type: draft.media_type,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO messages (id, room_id, author_id, content, media_url, media_type, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(message.id)
    .bind(message.room_id)
    .bind(message.author_id)
    .bind(&message.content)
    .bind(&message.media_url)
    .bind(message.media_type.map(|t| t.as_str()))
    .bind(message.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(message)
}

/// Insert a whole batch in one transaction, preserving order
///
/// Either every draft is stored or none is.
pub async fn insert_batch(
    pool: &SqlitePool,
    room_id: Uuid,
    author_id: Uuid,
    drafts: &[(Uuid, MessageDraft)],
) -> Result<Vec<(Uuid, Message)>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut stored = Vec::with_capacity(drafts.len());
    for (temp_id, draft) in drafts {
        let message = insert_message(&mut tx, room_id, author_id, draft).await?;
        stored.push((*temp_id, message));
    }
    tx.commit().await?;
    Ok(stored)
}

/// Get a message with its author
pub async fn get_message(pool: &SqlitePool, message_id: Uuid) -> Result<Option<MessageWithAuthor>, sqlx::Error> {
    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.room_id, m.author_id, m.content, m.media_url, m.media_type, m.created_at,
               p.username AS author_username, p.is_guest AS author_is_guest
        FROM messages m
        JOIN profiles p ON p.id = m.author_id
        WHERE m.id = ?
        "#,
    )
    .bind(message_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(MessageWithAuthor::from))
}

/// A page of room history, oldest first
///
/// # Arguments
/// * `limit` - Page size
/// * `before` - Only messages inserted before this message id
pub async fn list_messages(
    pool: &SqlitePool,
    room_id: Uuid,
    limit: u32,
    before: Option<Uuid>,
) -> Result<Vec<MessageWithAuthor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT * FROM (
            SELECT m.seq, m.id, m.room_id, m.author_id, m.content, m.media_url, m.media_type, m.created_at,
                   p.username AS author_username, p.is_guest AS author_is_guest
            FROM messages m
            JOIN profiles p ON p.id = m.author_id
            WHERE m.room_id = ?1
              AND (?2 IS NULL OR m.seq < (SELECT seq FROM messages WHERE id = ?2))
            ORDER BY m.seq DESC
            LIMIT ?3
        )
        ORDER BY seq ASC
        "#,
    )
    .bind(room_id)
    .bind(before)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(MessageWithAuthor::from).collect())
}

/// Delete a message by id
pub async fn delete_message(pool: &SqlitePool, message_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM messages WHERE id = ?")
        .bind(message_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
