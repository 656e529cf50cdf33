//! 状态定义：会话阶段与 UiState 投影
//!
//! UI 只持有轻量的 UiState（阶段、历史、锁、错误）；完整会话由 SessionController 维护并投影到 UiState。

use serde::Serialize;

use crate::memory::Message;

/// 会话阶段：一次任务从提交到 Completed / Error 的生命周期
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Planning,
    Executing,
    /// 模型发出澄清请求，等待用户输入一行文本
    WaitingInput,
    Completed,
    Error,
}

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub state: SessionState,
    pub history: Vec<Message>,
    pub input_locked: bool,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            state: SessionState::Idle,
            history: Vec::new(),
            input_locked: false,
            error_message: None,
        }
    }
}
