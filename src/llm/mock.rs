//! Mock 补全客户端（无需 API Key，便于本地跑通流程）
//!
//! 规划类请求返回一个两步的固定计划，执行类请求回显步骤描述。

use async_trait::async_trait;

use crate::llm::CompletionClient;

/// Mock 客户端：按提示词形状返回固定计划或回显
#[derive(Debug, Default)]
pub struct MockClient;

#[async_trait]
impl CompletionClient for MockClient {
    async fn complete(&self, _system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        // 规划提示词以 "Task:" 开头（见 task::planner），其余视为单步执行
        if user_prompt.starts_with("Task:") {
            return Ok([
                "Here is the plan.",
                "1. Restate the task in one sentence",
                "2. Produce a short mock result",
            ]
            .join("\n"));
        }

        let step = user_prompt
            .lines()
            .next()
            .unwrap_or("")
            .trim_start_matches("Current step to execute:")
            .trim();
        Ok(format!("Mock execution of '{}' finished.", step))
    }
}
