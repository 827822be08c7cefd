//! Message creation and the per-recipient delivery records it fans out to.

use chrono::Utc;

use crate::{
    db::Db,
    errors::ApiError,
    identity,
    models::{Message, MessageRecipient},
    projector,
};

pub struct NewMessage<'a> {
    pub sender_id: &'a str,
    pub subject: Option<&'a str>,
    pub content: &'a str,
    pub recipient_ids: &'a [String],
}

/// Stores the message and one unread delivery record per distinct recipient.
///
/// Everything happens in one transaction: a missing recipient drops the
/// transaction, so neither the message nor any delivery record is kept.
pub async fn send_message(db: &Db, new: NewMessage<'_>) -> Result<Message, ApiError> {
    let mut tx = db.begin_write().await?;

    if !identity::user_exists(&mut *tx, new.sender_id).await? {
        return Err(ApiError::SenderNotFound);
    }
    if new.recipient_ids.is_empty() {
        return Err(ApiError::NoRecipients);
    }

    let message = Message {
        id: uuid::Uuid::new_v4().to_string(),
        sender_id: new.sender_id.to_string(),
        subject: new.subject.map(str::to_string),
        content: new.content.to_string(),
        timestamp: Utc::now(),
    };
    sqlx::query("INSERT INTO messages(id, sender_id, subject, content, timestamp) VALUES (?, ?, ?, ?, ?)")
        .bind(&message.id)
        .bind(&message.sender_id)
        .bind(&message.subject)
        .bind(&message.content)
        .bind(message.timestamp)
        .execute(&mut *tx)
        .await?;

    let recipients = distinct(new.recipient_ids);
    for recipient_id in &recipients {
        if !identity::user_exists(&mut *tx, recipient_id).await? {
            return Err(ApiError::RecipientNotFound { id: recipient_id.to_string() });
        }
        sqlx::query("INSERT INTO message_recipients(id, message_id, recipient_id, read, read_at) VALUES (?, ?, ?, 0, NULL)")
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&message.id)
            .bind(recipient_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    log::info!(
        "message {} sent by {} to {} recipient(s)",
        message.id,
        message.sender_id,
        recipients.len()
    );
    Ok(message)
}

pub async fn get_message(db: &Db, id: &str) -> Result<Message, ApiError> {
    let sql = format!("SELECT {} FROM messages m WHERE m.id = ?", projector::MESSAGE_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(&db.0).await?;
    let row = row.ok_or_else(|| ApiError::not_found("Message", id))?;
    Ok(projector::message(&row)?)
}

pub async fn sent_messages(db: &Db, user_id: &str) -> Result<Vec<Message>, ApiError> {
    identity::require_user(db, user_id).await?;
    log::debug!("listing messages sent by {user_id}");
    let sql = format!(
        "SELECT {} FROM messages m WHERE m.sender_id = ? ORDER BY m.rowid ASC",
        projector::MESSAGE_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(&db.0).await?;
    Ok(rows.iter().map(projector::message).collect::<Result<_, _>>()?)
}

/// Delivery records of a message in fanout order.
pub async fn delivery_records(db: &Db, message_id: &str) -> Result<Vec<MessageRecipient>, ApiError> {
    let sql = format!(
        "SELECT {} FROM message_recipients mr WHERE mr.message_id = ? ORDER BY mr.rowid ASC",
        projector::RECIPIENT_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(message_id).fetch_all(&db.0).await?;
    Ok(rows.iter().map(projector::recipient).collect::<Result<_, _>>()?)
}

/// First occurrence wins; order is otherwise preserved.
fn distinct(ids: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().map(String::as_str).filter(|id| seen.insert(*id)).collect()
}
