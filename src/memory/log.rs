//! 消息日志：Agent / 用户 / 错误三种角色的有序记录
//!
//! 只追加、不重排、不删除；供 UI 渲染，也在恢复执行时拼接为续写上下文。
//! 仅在新会话开始时整体清空。

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 消息角色
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Role {
    Agent,
    User,
    Error,
}

/// 单条消息（带创建时间戳）
#[derive(Clone, Debug, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(Role::Agent, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Role::Error, content)
    }
}

/// 只追加的消息日志
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// 新会话开始时清空
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// 将全部消息内容按行拼接，作为恢复执行时的续写上下文
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
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
    fn push_preserves_order() {
        let mut log = MessageLog::new();
        log.push(Message::agent("first"));
        log.push(Message::user("second"));
        log.push(Message::error("third"));

        let contents: Vec<_> = log.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third"]);
        assert_eq!(log.messages()[1].role, Role::User);
    }

    #[test]
    fn transcript_joins_contents() {
        let mut log = MessageLog::new();
        log.push(Message::agent("plan"));
        log.push(Message::user("answer"));
        assert_eq!(log.transcript(), "plan\nanswer");
    }

    #[test]
    fn clear_empties_log() {
        let mut log = MessageLog::new();
        log.push(Message::agent("x"));
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.transcript(), "");
    }
}
