//! 会话状态机：SessionController
//!
//! 驱动 Planner 与 StepExecutor 走完一次任务的生命周期：
//! Idle -> Planning -> Executing -> { Completed | WaitingInput | Error }。
//! 独占持有执行上下文与消息日志；Planner / StepExecutor 只拿快照、只返回待追加内容。
//! 步骤严格串行：上一步结果未定，下一步不开始。

use std::sync::Arc;

use crate::core::{AgentError, SessionState};
use crate::llm::CompletionClient;
use crate::memory::{Message, MessageLog};
use crate::task::{parse_outcome, Planner, StepExecutor, StepOutcome};

/// 恢复执行用 system prompt（续写，不是按步提示）
pub const CONTINUATION_SYSTEM_PROMPT: &str =
    "You are an autonomous AI agent. Continue the task execution with the provided user input.";

/// 一次任务会话：任务文本、执行上下文、消息日志与当前阶段
#[derive(Debug, Default)]
pub struct Session {
    /// 用户目标，提交后不变；恢复执行重新规划时复用
    pub task: String,
    /// 执行上下文：已完成步骤结果按序拼接的单一字符串
    pub context: String,
    pub log: MessageLog,
    pub state: SessionState,
    pub error_message: Option<String>,
}

impl Session {
    fn new(task: &str) -> Self {
        Self {
            task: task.to_string(),
            ..Self::default()
        }
    }
}

/// 会话状态机：一次一个活跃会话，消息日志与上下文只在这里被改写
pub struct SessionController {
    llm: Arc<dyn CompletionClient>,
    planner: Planner,
    executor: StepExecutor,
    session: Session,
}

impl SessionController {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self {
            planner: Planner::new(llm.clone()),
            executor: StepExecutor::new(llm.clone()),
            llm,
            session: Session::default(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 提交任务：空白任务拒绝（无状态转移、不写日志），否则清空旧会话并跑完整周期
    pub async fn submit(&mut self, task: &str) -> Result<(), AgentError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(AgentError::Config("task is empty".to_string()));
        }

        tracing::info!("Submitting task: {}", task);
        self.session = Session::new(task);
        self.run_cycle().await;
        Ok(())
    }

    /// 回到 Idle，清空日志与上下文
    pub fn clear(&mut self) {
        self.session = Session::default();
    }

    /// 用户对澄清请求的回答
    ///
    /// 仅在 WaitingInput 且输入非空白时生效。先以已有转录 + 输入发起一次续写请求：
    /// 回复仍含哨兵则继续等待（记录新提问）；否则对原任务重启完整提交周期
    /// （重新规划，不接续被放弃的步骤序列；日志与上下文同时重置）。
    pub async fn respond(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() || self.session.state != SessionState::WaitingInput {
            return;
        }

        // 转录在用户消息入日志前取快照，续写提示词中输入单独成段
        let transcript = self.session.log.transcript();
        self.session.log.push(Message::user(input));

        let user_prompt = format!(
            "Previous context: {}\nUser input: {}\nContinue the task execution.",
            transcript, input
        );

        let continuation = match self.llm.complete(CONTINUATION_SYSTEM_PROMPT, &user_prompt).await {
            Ok(text) => text,
            Err(e) => return self.fail(AgentError::Service(e)),
        };

        self.session.log.push(Message::agent(continuation.clone()));

        match parse_outcome(&continuation) {
            StepOutcome::NeedsInput { question } => {
                self.session.log.push(Message::agent("❓ I need some information from you:"));
                self.session.log.push(Message::agent(question));
                // 状态保持 WaitingInput
            }
            StepOutcome::Completed { .. } => {
                let task = self.session.task.clone();
                self.session = Session::new(&task);
                self.run_cycle().await;
            }
        }
    }

    /// 完整周期：规划 -> 按序执行每一步 -> Completed；
    /// 遇 NeedsInput 立即暂停并放弃剩余步骤，遇服务错误终止。
    async fn run_cycle(&mut self) {
        self.session.state = SessionState::Planning;
        self.session
            .log
            .push(Message::agent("🔍 Analyzing the task and creating a plan..."));

        let task = self.session.task.clone();
        let steps = match self.planner.plan(&task, &mut self.session.log).await {
            Ok(steps) => steps,
            Err(e) => return self.fail(e),
        };

        self.session.state = SessionState::Executing;
        let total = steps.len();
        for step in &steps {
            self.session.log.push(Message::agent(format!(
                "🔄 Starting step {}/{}",
                step.index, total
            )));

            let outcome = self
                .executor
                .execute(step, &self.session.context, &mut self.session.log)
                .await;

            match outcome {
                Ok(StepOutcome::Completed { result }) => {
                    // 上下文只增不改：严格按步骤序号追加，无间隙
                    self.session
                        .context
                        .push_str(&format!("\nStep {} result: {}", step.index, result));
                }
                Ok(StepOutcome::NeedsInput { .. }) => {
                    self.session.state = SessionState::WaitingInput;
                    return;
                }
                Err(e) => return self.fail(e),
            }
        }

        // 空计划也走到这里：零步即完成
        self.session
            .log
            .push(Message::agent("🎉 Task completed successfully!"));
        self.session.state = SessionState::Completed;
    }

    /// 统一失败出口：恰好一条错误消息 + 一次到 Error 的转移
    fn fail(&mut self, e: AgentError) {
        tracing::warn!("Session failed: {}", e);
        self.session.log.push(Message::error(format!("❌ Error: {}", e)));
        self.session.error_message = Some(e.to_string());
        self.session.state = SessionState::Error;
    }
}
