//! Scout - 终端自主任务智能体
//!
//! 用户提交一个自由文本任务，Agent 调用补全服务将其拆解为编号步骤并逐步执行；
//! 模型通过 `NEED_INPUT:` 哨兵请求澄清时暂停，等用户输入一行文本后继续。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误、会话状态机、编排器（命令/状态通道）
//! - **llm**: 补全客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 消息日志（只追加的会话记录）
//! - **task**: Planner（计划解析）与 StepExecutor（单步执行与哨兵识别）
//! - **ui**: Ratatui TUI 界面

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod task;
pub mod ui;
