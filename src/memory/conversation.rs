//! 对话历史
//!
//! 严格追加的 role/content 序列；每轮恰好更新一次（先于代码提取，历史反映模型说了什么，
//! 而不管其代码是否跑成）。max_turns=0 时不裁剪（源行为）；>0 时保留最近 N 轮。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// 单条消息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// 对话历史（每轮含 user + assistant，窗口生效时实际保留约 max_turns*2 条消息）
#[derive(Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
    max_turns: usize,
}

impl ConversationMemory {
    /// max_turns = 0 表示无上限
    pub fn new(max_turns: usize) -> Self {
        Self {
            messages: Vec::new(),
            max_turns,
        }
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
        self.prune();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// 窗口生效且超出 max_turns*2 时丢弃最旧的消息，保留最近部分
    fn prune(&mut self) {
        if self.max_turns == 0 {
            return;
        }
        if self.messages.len() > self.max_turns * 2 {
            let keep = self.max_turns * 2;
            self.messages.drain(..self.messages.len() - keep);
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order() {
        let mut mem = ConversationMemory::new(0);
        mem.push(Message::user("hi"));
        mem.push(Message::assistant("hello"));
        assert_eq!(mem.len(), 2);
        assert_eq!(mem.messages()[0].role, Role::User);
        assert_eq!(mem.messages()[1].role, Role::Assistant);
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut mem = ConversationMemory::new(0);
        for i in 0..100 {
            mem.push(Message::user(format!("msg {}", i)));
        }
        assert_eq!(mem.len(), 100);
    }

    #[test]
    fn test_window_prunes_oldest() {
        let mut mem = ConversationMemory::new(2);
        for i in 0..10 {
            mem.push(Message::user(format!("u{}", i)));
            mem.push(Message::assistant(format!("a{}", i)));
        }
        assert_eq!(mem.len(), 4);
        assert_eq!(mem.messages()[0].content, "u8");
    }

    #[test]
    fn test_clear() {
        let mut mem = ConversationMemory::new(0);
        mem.push(Message::user("hi"));
        mem.clear();
        assert!(mem.is_empty());
    }
}
