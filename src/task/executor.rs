//! StepExecutor：单步执行与哨兵识别
//!
//! 对一步调用补全服务，把自由文本回复归类为 StepOutcome：含 `NEED_INPUT:` 哨兵即为澄清请求，
//! 否则为完成结果。哨兵扫描只发生在 parse_outcome 一处，控制流之后只看枚举。
//! 每次调用无论结果如何，都会先后向 MessageLog 追加「思考」与成功/提问消息。

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::CompletionClient;
use crate::memory::{Message, MessageLog};
use crate::task::Step;

/// 模型在带内请求澄清的哨兵标记（区分大小写，可出现在回复任意位置）
pub const NEED_INPUT_MARKER: &str = "NEED_INPUT:";

/// 执行用 system prompt（固定，向模型声明哨兵协议）
pub const EXECUTOR_SYSTEM_PROMPT: &str = "You are an autonomous AI agent. \
Execute the given step and provide detailed results. \
If you need any user input or clarification, explicitly state 'NEED_INPUT: your question'. \
Always think step by step and explain your thought process.";

/// 单步执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// 步骤已完成，result 追加到执行上下文
    Completed { result: String },
    /// 模型请求澄清，question 为哨兵之后（修剪过）的提问文本
    NeedsInput { question: String },
}

/// 将回复文本归类为 StepOutcome
///
/// 取第一个哨兵之后、下一个哨兵（如有）之前的文本作为提问并修剪空白；
/// 无哨兵则整段回复即完成结果。
pub fn parse_outcome(output: &str) -> StepOutcome {
    match output.find(NEED_INPUT_MARKER) {
        Some(idx) => {
            let rest = &output[idx + NEED_INPUT_MARKER.len()..];
            let question = match rest.find(NEED_INPUT_MARKER) {
                Some(end) => &rest[..end],
                None => rest,
            };
            StepOutcome::NeedsInput {
                question: question.trim().to_string(),
            }
        }
        None => StepOutcome::Completed {
            result: output.to_string(),
        },
    }
}

/// StepExecutor：持有补全客户端，对单步拼提示词、调用并归类回复
pub struct StepExecutor {
    llm: Arc<dyn CompletionClient>,
}

impl StepExecutor {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// 执行一步：context 为此前已完成步骤结果的快照，只读不改
    pub async fn execute(
        &self,
        step: &Step,
        context: &str,
        log: &mut MessageLog,
    ) -> Result<StepOutcome, AgentError> {
        log.push(Message::agent(format!(
            "🤔 Thinking about how to execute: {}",
            step.description
        )));

        let user_prompt = format!(
            "Current step to execute: {}\nContext: {}\nThink through this step carefully and explain your process.",
            step.description, context
        );

        let execution = self
            .llm
            .complete(EXECUTOR_SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(AgentError::Service)?;

        let outcome = parse_outcome(&execution);
        match &outcome {
            StepOutcome::NeedsInput { question } => {
                log.push(Message::agent("❓ I need some information from you:"));
                log.push(Message::agent(question.clone()));
            }
            StepOutcome::Completed { result } => {
                log.push(Message::agent(format!("✓ {}", result)));
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_marker_is_completed() {
        let out = parse_outcome("Everything went fine.");
        assert_eq!(
            out,
            StepOutcome::Completed {
                result: "Everything went fine.".to_string()
            }
        );
    }

    #[test]
    fn marker_anywhere_yields_question() {
        let out = parse_outcome("I thought about it... NEED_INPUT: What format?");
        assert_eq!(
            out,
            StepOutcome::NeedsInput {
                question: "What format?".to_string()
            }
        );
    }

    #[test]
    fn question_is_trimmed() {
        let out = parse_outcome("NEED_INPUT:   spaces around   ");
        assert_eq!(
            out,
            StepOutcome::NeedsInput {
                question: "spaces around".to_string()
            }
        );
    }

    #[test]
    fn first_occurrence_wins() {
        let out = parse_outcome("NEED_INPUT: first question NEED_INPUT: second question");
        assert_eq!(
            out,
            StepOutcome::NeedsInput {
                question: "first question".to_string()
            }
        );
    }

    #[test]
    fn marker_is_case_sensitive() {
        let out = parse_outcome("need_input: lowercase does not count");
        assert!(matches!(out, StepOutcome::Completed { .. }));
    }
}
