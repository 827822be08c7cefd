use chrono::Utc;

use crate::{
    db::Db,
    errors::ApiError,
    identity,
    models::{InboxItem, MessageRecipient, RecipientStatus},
    projector,
};

/// Marks a delivery record read.
///
/// The update only fires while the record is unread, so concurrent callers
/// cannot overwrite an earlier `read_at`. A record that is already read is
/// returned unchanged.
pub async fn mark_read(db: &Db, entry_id: &str) -> Result<MessageRecipient, ApiError> {
    let mut tx = db.begin_write().await?;

    let updated = sqlx::query("UPDATE message_recipients SET read = 1, read_at = ? WHERE id = ? AND read = 0")
        .bind(Utc::now())
        .bind(entry_id)
        .execute(&mut *tx)
        .await?;

    let sql = format!("SELECT {} FROM message_recipients mr WHERE mr.id = ?", projector::RECIPIENT_COLUMNS);
    let row = sqlx::query(&sql).bind(entry_id).fetch_optional(&mut *tx).await?;
    let row = row.ok_or_else(|| ApiError::not_found("Message recipient entry", entry_id))?;
    let record = projector::recipient(&row)?;
    tx.commit().await?;

    if updated.rows_affected() > 0 {
        log::info!("delivery record {entry_id} marked read");
    } else {
        log::debug!("delivery record {entry_id} was already read");
    }
    Ok(record)
}

pub async fn inbox(db: &Db, user_id: &str) -> Result<Vec<InboxItem>, ApiError> {
    inbox_query(db, user_id, false).await
}

pub async fn unread_inbox(db: &Db, user_id: &str) -> Result<Vec<InboxItem>, ApiError> {
    inbox_query(db, user_id, true).await
}

async fn inbox_query(db: &Db, user_id: &str, unread_only: bool) -> Result<Vec<InboxItem>, ApiError> {
    identity::require_user(db, user_id).await?;
    log::debug!("loading inbox for {user_id} (unread_only={unread_only})");

    let filter = if unread_only { " AND mr.read = 0" } else { "" };
    let sql = format!(
        "SELECT {}
         FROM message_recipients mr
         INNER JOIN messages m ON m.id = mr.message_id
         LEFT JOIN users u ON u.id = m.sender_id
         WHERE mr.recipient_id = ?{filter}
         ORDER BY mr.rowid ASC",
        projector::INBOX_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(&db.0).await?;
    Ok(rows.iter().map(projector::inbox_item).collect::<Result<_, _>>()?)
}

pub async fn recipient_status(db: &Db, message_id: &str) -> Result<Vec<RecipientStatus>, ApiError> {
    let exists = sqlx::query("SELECT 1 FROM messages WHERE id = ?")
        .bind(message_id)
        .fetch_optional(&db.0)
        .await?;
    if exists.is_none() {
        return Err(ApiError::not_found("Message", message_id));
    }

    let sql = format!(
        "SELECT {}
         FROM message_recipients mr
         LEFT JOIN users u ON u.id = mr.recipient_id
         WHERE mr.message_id = ?
         ORDER BY mr.rowid ASC",
        projector::RECIPIENT_STATUS_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(message_id).fetch_all(&db.0).await?;
    Ok(rows.iter().map(projector::recipient_status).collect::<Result<_, _>>()?)
}
