//! 核心层：错误、会话状态机、编排器（命令/状态通道）

pub mod controller;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use controller::{Session, SessionController};
pub use error::AgentError;
pub use orchestrator::{create_agent, Command};
pub use state::{SessionState, UiState};
