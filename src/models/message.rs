use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

use super::user::User;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub subject: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One received message as seen from a recipient's inbox.
///
/// Flattens the message, the recipient's delivery record, and the sender into
/// a single read-only value. Never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InboxItem {
    pub id: String,
    pub sender_id: String,
    pub subject: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub recipient_entry_id: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub sender: Option<User>,
}
