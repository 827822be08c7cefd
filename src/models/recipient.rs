use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

/// Delivery record: one per (message, recipient) pair.
///
/// `read_at` is set exactly when `read` is true, and a record never goes back
/// to unread.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageRecipient {
    pub id: String,
    pub message_id: String,
    pub recipient_id: String,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RecipientStatus {
    pub recipient_entry_id: String,
    pub recipient_id: String,
    pub recipient_name: Option<String>,
    pub recipient_email: Option<String>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}
