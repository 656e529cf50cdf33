//! 会话编排器：命令/状态通道
//!
//! 负责：加载配置、选择补全后端、创建 SessionController，建立 cmd/state 两通道，
//! 并在后台任务中按序消费用户命令（Submit/Respond/Clear/Quit），驱动状态机并投影 UiState。
//! 命令串行处理：补全调用是唯一挂起点，调用一旦发出便运行至完成或失败，无取消原语。

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::config::{load_config, AppConfig};
use crate::core::{AgentError, Session, SessionController, SessionState, UiState};
use crate::llm::{CompletionClient, MockClient, OpenAiClient};

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交任务，触发规划与逐步执行
    Submit(String),
    /// 对澄清请求回答一行文本
    Respond(String),
    /// 清空会话，回到 Idle
    Clear,
    /// 退出应用
    Quit,
}

/// 根据配置选择补全后端（OpenAI 兼容 / Mock）
///
/// openai 后端要求解析出凭证（配置或 OPENAI_API_KEY），缺失即拒绝启动；
/// provider = mock 时无需凭证，便于本地试跑。
pub(crate) fn create_llm_from_config(cfg: &AppConfig) -> Result<Arc<dyn CompletionClient>, AgentError> {
    match cfg.llm.provider.to_lowercase().as_str() {
        "mock" => {
            tracing::warn!("Using Mock completion backend (no real model calls)");
            Ok(Arc::new(MockClient))
        }
        _ => match cfg.llm.resolve_api_key() {
            Some(key) => {
                tracing::info!("Using OpenAI-compatible backend ({})", cfg.llm.model);
                Ok(Arc::new(OpenAiClient::new(
                    cfg.llm.base_url.as_deref(),
                    &cfg.llm.model,
                    &key,
                )))
            }
            None => Err(AgentError::Config(
                "no API credential: set SCOUT__LLM__API_KEY or OPENAI_API_KEY, or use provider = \"mock\""
                    .to_string(),
            )),
        },
    }
}

/// 将会话投影为 UI 可渲染的轻量状态
fn project(session: &Session) -> UiState {
    UiState {
        state: session.state.clone(),
        history: session.log.messages().to_vec(),
        input_locked: matches!(
            session.state,
            SessionState::Planning | SessionState::Executing
        ),
        error_message: session.error_message.clone(),
    }
}

/// 创建 Agent 运行时：返回命令发送端与状态接收端；后台任务消费命令并更新 state
pub async fn create_agent(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let llm = create_llm_from_config(&cfg)?;
    let mut controller = SessionController::new(llm);

    // 两通道：UI -> Core 命令；Core -> UI 状态快照
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(cmd) = cmd_rx.recv() => {
                    match cmd {
                        Command::Submit(task) => {
                            // 先锁输入并标记 Planning，再跑周期
                            let mut locked = project(controller.session());
                            locked.state = SessionState::Planning;
                            locked.input_locked = true;
                            let _ = state_tx.send(locked);

                            if let Err(e) = controller.submit(&task).await {
                                // 提交被拒：无状态转移、不写日志，仅提示
                                tracing::warn!("Submission rejected: {}", e);
                            }
                            let _ = state_tx.send(project(controller.session()));
                        }
                        Command::Respond(input) => {
                            let mut locked = project(controller.session());
                            locked.input_locked = true;
                            let _ = state_tx.send(locked);

                            controller.respond(&input).await;
                            let _ = state_tx.send(project(controller.session()));
                        }
                        Command::Clear => {
                            controller.clear();
                            let _ = state_tx.send(project(controller.session()));
                        }
                        Command::Quit => break,
                    }
                }
                else => break,  // cmd_tx 已关闭，退出循环
            }
        }
    });

    Ok((cmd_tx, state_rx))
}
