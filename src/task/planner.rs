//! Planner：任务拆解与计划解析
//!
//! 调用补全服务得到一份编号计划，原文先写入 MessageLog（用户可见模型的完整推理），
//! 再从中仅取「数字 + 句点」开头的行作为步骤；无匹配行时计划为空，交由上层按零步完成处理。

use std::sync::Arc;

use regex::Regex;

use crate::core::AgentError;
use crate::llm::CompletionClient;
use crate::memory::{Message, MessageLog};

/// 规划用 system prompt（固定）
pub const PLANNER_SYSTEM_PROMPT: &str = "You are an autonomous task planning AI. \
Analyze the given task and break it down into clear, specific steps. \
Think carefully about dependencies and potential challenges.";

/// 计划中的一步：1 起始的序号 + 描述文本，序号顺序即执行顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub description: String,
}

/// 从规划文本中解析步骤
///
/// 仅保留形如 `<数字>.<可选空白><描述>` 的行，去掉数字前缀并修剪空白；
/// 叙述、标题等不匹配的行全部丢弃。序号按出现顺序重新编为 1..n，
/// 不使用行首的字面数字（模型偶尔会跳号或重号）。
pub fn parse_plan(text: &str) -> Vec<Step> {
    let line_re = Regex::new(r"^\d+\.\s*(.*)$").unwrap();
    text.lines()
        .filter_map(|line| line_re.captures(line))
        .enumerate()
        .map(|(i, caps)| Step {
            index: i + 1,
            description: caps[1].trim().to_string(),
        })
        .collect()
}

/// Planner：持有补全客户端，plan 时拼提示词、记录原文并解析步骤
pub struct Planner {
    llm: Arc<dyn CompletionClient>,
}

impl Planner {
    pub fn new(llm: Arc<dyn CompletionClient>) -> Self {
        Self { llm }
    }

    /// 将任务拆解为步骤；规划原文在解析前先追加到日志
    pub async fn plan(&self, task: &str, log: &mut MessageLog) -> Result<Vec<Step>, AgentError> {
        let user_prompt = format!(
            "Task: {}\nCreate a detailed plan with numbered steps. \
Consider edge cases and potential challenges.",
            task
        );

        let analysis = self
            .llm
            .complete(PLANNER_SYSTEM_PROMPT, &user_prompt)
            .await
            .map_err(AgentError::Service)?;

        log.push(Message::agent("📋 Here's my plan:"));
        log.push(Message::agent(analysis.clone()));

        let steps = parse_plan(&analysis);
        tracing::info!("Planned {} step(s)", steps.len());
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_numbered_lines() {
        let text = "1. Do A\nsome note\n2. Do B";
        let steps = parse_plan(text);
        let descs: Vec<_> = steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(descs, vec!["Do A", "Do B"]);
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[1].index, 2);
    }

    #[test]
    fn strips_prefix_and_whitespace() {
        let steps = parse_plan("12.   trim me  ");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].description, "trim me");
    }

    #[test]
    fn no_matching_lines_yields_empty_plan() {
        assert!(parse_plan("I cannot break this down.\n- bullet\nStep one: x").is_empty());
        assert!(parse_plan("").is_empty());
    }

    #[test]
    fn reindexes_by_position_not_literal_number() {
        // 模型跳号时按出现顺序重排
        let steps = parse_plan("3. First\n7. Second");
        assert_eq!(steps[0].index, 1);
        assert_eq!(steps[0].description, "First");
        assert_eq!(steps[1].index, 2);
        assert_eq!(steps[1].description, "Second");
    }

    #[test]
    fn header_numbering_without_period_is_ignored() {
        let steps = parse_plan("Plan v2\n1) wrong style\n1. right style");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].description, "right style");
    }
}
