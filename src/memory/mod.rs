//! 会话记录：只追加的消息日志

pub mod log;

pub use log::{Message, MessageLog, Role};
