//! Agent 错误类型
//!
//! Service：补全服务或传输层失败，携带原始错误消息，从不自动重试；
//! Config：提交前置条件不满足（空任务、缺少凭证），拒绝于任何状态转移之前，不写日志。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Service error: {0}")]
    Service(String),

    #[error("Config error: {0}")]
    Config(String),
}
