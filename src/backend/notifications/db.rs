//! Database operations for notifications

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Insert one notification per recipient in a single transaction
///
/// Recipients without a profile are skipped.
///
/// # Returns
///
/// Number of rows inserted
pub async fn insert_bulk(
    pool: &SqlitePool,
    sender_id: Uuid,
    recipients: &[Uuid],
    kind: &str,
    room_id: Option<Uuid>,
    message_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<usize, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut created = 0;
    for recipient_id in recipients {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (id, sender_id, recipient_id, kind, room_id, message_id, created_at)
            SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7
            WHERE EXISTS (SELECT 1 FROM profiles WHERE id = ?3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sender_id)
        .bind(recipient_id)
        .bind(kind)
        .bind(room_id)
        .bind(message_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        created += result.rows_affected() as usize;
    }
    tx.commit().await?;
    Ok(created)
}
