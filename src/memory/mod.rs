//! 记忆层：对话历史

pub mod conversation;

pub use conversation::{ConversationMemory, Message, Role};
