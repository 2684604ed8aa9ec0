pub mod chat;
pub mod document;
pub mod session;
pub mod user;

pub use chat::{ChatMessage, MessageType};
pub use document::{DocumentRecord, NewDocument};
pub use session::ChatSession;
pub use user::User;
