pub mod message;
pub mod recipient;
pub mod user;

pub use message::{InboxItem, Message};
pub use recipient::{MessageRecipient, RecipientStatus};
pub use user::User;
