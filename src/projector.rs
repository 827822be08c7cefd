//! Row to response-shape assembly.
//!
//! Queries select the column lists defined here so the aliases and the
//! decoding below stay in one place.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::models::{InboxItem, Message, MessageRecipient, RecipientStatus, User};

pub const USER_COLUMNS: &str = "u.id, u.email, u.name, u.created_at";

pub const MESSAGE_COLUMNS: &str = "m.id, m.sender_id, m.subject, m.content, m.timestamp";

pub const RECIPIENT_COLUMNS: &str = "mr.id, mr.message_id, mr.recipient_id, mr.read, mr.read_at";

/// Expects `messages m`, `message_recipients mr` and `LEFT JOIN users u` on the sender.
pub const INBOX_COLUMNS: &str = "m.id, m.sender_id, m.subject, m.content, m.timestamp,
    mr.id AS recipient_entry_id, mr.read, mr.read_at,
    u.id AS sender_user_id, u.email AS sender_email, u.name AS sender_name,
    u.created_at AS sender_created_at";

/// Expects `message_recipients mr` and `LEFT JOIN users u` on the recipient.
pub const RECIPIENT_STATUS_COLUMNS: &str = "mr.id AS recipient_entry_id, mr.recipient_id,
    u.name AS recipient_name, u.email AS recipient_email, mr.read, mr.read_at";

pub fn user(r: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: r.try_get("id")?,
        email: r.try_get("email")?,
        name: r.try_get("name")?,
        created_at: r.try_get("created_at")?,
    })
}

pub fn message(r: &SqliteRow) -> Result<Message, sqlx::Error> {
    Ok(Message {
        id: r.try_get("id")?,
        sender_id: r.try_get("sender_id")?,
        subject: r.try_get("subject")?,
        content: r.try_get("content")?,
        timestamp: r.try_get("timestamp")?,
    })
}

pub fn recipient(r: &SqliteRow) -> Result<MessageRecipient, sqlx::Error> {
    Ok(MessageRecipient {
        id: r.try_get("id")?,
        message_id: r.try_get("message_id")?,
        recipient_id: r.try_get("recipient_id")?,
        read: r.try_get::<i64, _>("read")? != 0,
        read_at: r.try_get("read_at")?,
    })
}

pub fn inbox_item(r: &SqliteRow) -> Result<InboxItem, sqlx::Error> {
    let sender = sender(
        r.try_get("sender_user_id")?,
        r.try_get("sender_email")?,
        r.try_get("sender_name")?,
        r.try_get("sender_created_at")?,
    );
    Ok(InboxItem {
        id: r.try_get("id")?,
        sender_id: r.try_get("sender_id")?,
        subject: r.try_get("subject")?,
        content: r.try_get("content")?,
        timestamp: r.try_get("timestamp")?,
        recipient_entry_id: r.try_get("recipient_entry_id")?,
        read: r.try_get::<i64, _>("read")? != 0,
        read_at: r.try_get("read_at")?,
        sender,
    })
}

pub fn recipient_status(r: &SqliteRow) -> Result<RecipientStatus, sqlx::Error> {
    Ok(RecipientStatus {
        recipient_entry_id: r.try_get("recipient_entry_id")?,
        recipient_id: r.try_get("recipient_id")?,
        recipient_name: r.try_get("recipient_name")?,
        recipient_email: r.try_get("recipient_email")?,
        read: r.try_get::<i64, _>("read")? != 0,
        read_at: r.try_get("read_at")?,
    })
}

/// Sender columns from a LEFT JOIN; any missing piece means no sender.
fn sender(
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    created_at: Option<DateTime<Utc>>,
) -> Option<User> {
    Some(User { id: id?, email: email?, name: name?, created_at: created_at? })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Db;

    #[test]
    fn sender_is_absent_when_join_missed() {
        assert_eq!(sender(None, None, None, None), None);
        assert_eq!(sender(Some("id".into()), None, Some("A".into()), Some(Utc::now())), None);
    }

    #[test]
    fn sender_is_built_from_joined_columns() {
        let now = Utc::now();
        let u = sender(Some("id".into()), Some("a@x.io".into()), Some("A".into()), Some(now));
        assert_eq!(
            u,
            Some(User { id: "id".into(), email: "a@x.io".into(), name: "A".into(), created_at: now })
        );
    }

    #[actix_web::test]
    async fn inbox_item_survives_dangling_sender() {
        let db = Db::in_memory().await.unwrap();
        // Bypass referential checks to simulate a sender that no longer joins.
        sqlx::query("PRAGMA foreign_keys = OFF").execute(&db.0).await.unwrap();
        let now = Utc::now();
        sqlx::query("INSERT INTO messages(id, sender_id, subject, content, timestamp) VALUES ('m1', 'ghost', NULL, 'hi', ?)")
            .bind(now)
            .execute(&db.0)
            .await
            .unwrap();
        sqlx::query("INSERT INTO message_recipients(id, message_id, recipient_id) VALUES ('r1', 'm1', 'someone')")
            .execute(&db.0)
            .await
            .unwrap();

        let sql = format!(
            "SELECT {INBOX_COLUMNS} FROM message_recipients mr
             INNER JOIN messages m ON m.id = mr.message_id
             LEFT JOIN users u ON u.id = m.sender_id"
        );
        let row = sqlx::query(&sql).fetch_one(&db.0).await.unwrap();
        let item = inbox_item(&row).unwrap();

        assert_eq!(item.id, "m1");
        assert_eq!(item.sender_id, "ghost");
        assert_eq!(item.recipient_entry_id, "r1");
        assert!(!item.read);
        assert!(item.read_at.is_none());
        assert!(item.sender.is_none());
    }
}
