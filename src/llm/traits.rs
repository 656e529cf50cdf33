//! 补全客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 CompletionClient：一对 (system, user) 提示词换一段生成文本。
//! 不重试、不并发：同一时刻最多一个未完成的调用，失败原样上抛给调用方。

use async_trait::async_trait;

/// 补全客户端 trait：发送 (system prompt, user prompt)，返回生成文本或服务错误消息
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String>;
}
