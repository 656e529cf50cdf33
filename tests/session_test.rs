//! 会话状态机集成测试
//!
//! 用脚本化的补全客户端按序喂回复，验证：空计划即完成、上下文按序累积、
//! 哨兵暂停与放弃剩余步骤、恢复执行重新规划、失败隔离。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use scout::core::{AgentError, SessionController, SessionState};
use scout::llm::CompletionClient;
use scout::memory::Role;

/// 脚本化客户端：按序弹出预置回复，并记录每次收到的 (system, user) 提示词
struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()))
    }
}

fn ok(s: &str) -> Result<String, String> {
    Ok(s.to_string())
}

#[tokio::test]
async fn empty_plan_completes_without_executing_steps() {
    let llm = ScriptedClient::new(vec![ok("I can't split this into steps, sorry.")]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("do nothing").await.unwrap();

    assert_eq!(ctl.session().state, SessionState::Completed);
    // 仅规划调用，StepExecutor 一次都没碰
    assert_eq!(llm.calls().len(), 1);
    assert_eq!(ctl.session().context, "");
    let last = ctl.session().log.messages().last().unwrap();
    assert!(last.content.contains("completed successfully"));
}

#[tokio::test]
async fn context_accumulates_in_step_order() {
    let llm = ScriptedClient::new(vec![
        ok("Plan:\n1. Do A\nsome note\n2. Do B\n3. Do C"),
        ok("result-a"),
        ok("result-b"),
        ok("result-c"),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("three step task").await.unwrap();

    assert_eq!(ctl.session().state, SessionState::Completed);
    assert_eq!(
        ctl.session().context,
        "\nStep 1 result: result-a\nStep 2 result: result-b\nStep 3 result: result-c"
    );

    let calls = llm.calls();
    assert_eq!(calls.len(), 4);
    // 第 1 步拿到空上下文，第 2 步恰好拿到第 1 步的结果，第 3 步拿到前两步
    assert!(calls[1].1.contains("Context: \nThink"));
    assert!(calls[2].1.contains("Context: \nStep 1 result: result-a\nThink"));
    assert!(calls[3]
        .1
        .contains("Context: \nStep 1 result: result-a\nStep 2 result: result-b\nThink"));
}

#[tokio::test]
async fn raw_plan_text_is_logged_verbatim() {
    let raw = "Reasoning first.\n1. Only step\ntrailing note";
    let llm = ScriptedClient::new(vec![ok(raw), ok("done")]);
    let mut ctl = SessionController::new(llm);

    ctl.submit("task").await.unwrap();

    let log = ctl.session().log.messages();
    assert!(log.iter().any(|m| m.content == raw));
}

#[tokio::test]
async fn needs_input_pauses_and_abandons_remaining_steps() {
    let llm = ScriptedClient::new(vec![
        ok("1. First\n2. Second"),
        ok("Thinking... NEED_INPUT: What format do you want?"),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("ambiguous task").await.unwrap();

    assert_eq!(ctl.session().state, SessionState::WaitingInput);
    // 规划 + 第 1 步；第 2 步被放弃
    assert_eq!(llm.calls().len(), 2);
    assert_eq!(ctl.session().context, "");
    let log = ctl.session().log.messages();
    assert!(log.iter().any(|m| m.content == "What format do you want?"));
}

#[tokio::test]
async fn resume_replans_original_task_from_scratch() {
    let llm = ScriptedClient::new(vec![
        ok("1. First\n2. Second"),
        ok("NEED_INPUT: Which encoding?"),
        // 续写回复无哨兵 -> 对原任务重启完整周期
        ok("Got it, continuing with UTF-8."),
        ok("1. Redo everything"),
        ok("redone"),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("convert the file").await.unwrap();
    assert_eq!(ctl.session().state, SessionState::WaitingInput);

    ctl.respond("UTF-8 please").await;

    assert_eq!(ctl.session().state, SessionState::Completed);
    assert_eq!(ctl.session().context, "\nStep 1 result: redone");

    // 日志被重置：第一条是新周期的分析消息，旧提问不复存在
    let log = ctl.session().log.messages();
    assert!(log[0].content.contains("Analyzing the task"));
    assert!(!log.iter().any(|m| m.content.contains("Which encoding?")));

    // Planner 被再次调用，且两次都是原任务
    let plan_calls: Vec<_> = llm
        .calls()
        .into_iter()
        .filter(|(_, user)| user.starts_with("Task: convert the file"))
        .collect();
    assert_eq!(plan_calls.len(), 2);
}

#[tokio::test]
async fn continuation_with_sentinel_stays_waiting() {
    let llm = ScriptedClient::new(vec![
        ok("1. Only step"),
        ok("NEED_INPUT: First question?"),
        ok("Hmm. NEED_INPUT: Second question?"),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("task").await.unwrap();
    ctl.respond("partial answer").await;

    assert_eq!(ctl.session().state, SessionState::WaitingInput);
    let log = ctl.session().log.messages();
    assert!(log.iter().any(|m| m.content == "Second question?"));
    // 没有触发重新规划
    assert_eq!(llm.calls().len(), 3);
}

#[tokio::test]
async fn continuation_prompt_carries_transcript_and_input() {
    let llm = ScriptedClient::new(vec![
        ok("1. Only step"),
        ok("NEED_INPUT: Color?"),
        ok("NEED_INPUT: Still color?"),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("paint it").await.unwrap();
    ctl.respond("blue").await;

    let calls = llm.calls();
    let (_, continuation) = &calls[2];
    assert!(continuation.starts_with("Previous context: "));
    assert!(continuation.contains("Here's my plan"));
    assert!(continuation.contains("\nUser input: blue\n"));
}

#[tokio::test]
async fn failure_on_middle_step_leaves_rest_unexecuted() {
    let llm = ScriptedClient::new(vec![
        ok("1. A\n2. B\n3. C"),
        ok("r1"),
        Err("upstream 500".to_string()),
    ]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("fragile task").await.unwrap();

    assert_eq!(ctl.session().state, SessionState::Error);
    // 规划 + 步骤 1 + 步骤 2；步骤 3 从未执行
    assert_eq!(llm.calls().len(), 3);
    assert_eq!(ctl.session().context, "\nStep 1 result: r1");

    // 恰好一条错误消息
    let errors: Vec<_> = ctl
        .session()
        .log
        .messages()
        .iter()
        .filter(|m| m.role == Role::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].content.contains("upstream 500"));
}

#[tokio::test]
async fn planning_failure_transitions_to_error() {
    let llm = ScriptedClient::new(vec![Err("connection refused".to_string())]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("task").await.unwrap();

    assert_eq!(ctl.session().state, SessionState::Error);
    assert_eq!(llm.calls().len(), 1);
    assert!(ctl.session().error_message.as_deref().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn empty_task_is_rejected_without_transition() {
    let llm = ScriptedClient::new(vec![]);
    let mut ctl = SessionController::new(llm.clone());

    let err = ctl.submit("   ").await.unwrap_err();
    assert!(matches!(err, AgentError::Config(_)));

    assert_eq!(ctl.session().state, SessionState::Idle);
    assert!(ctl.session().log.is_empty());
    assert!(llm.calls().is_empty());
}

#[tokio::test]
async fn blank_response_while_waiting_is_ignored() {
    let llm = ScriptedClient::new(vec![ok("1. Only step"), ok("NEED_INPUT: Unit?")]);
    let mut ctl = SessionController::new(llm.clone());

    ctl.submit("measure it").await.unwrap();
    let before = ctl.session().log.len();

    ctl.respond("   ").await;

    assert_eq!(ctl.session().state, SessionState::WaitingInput);
    assert_eq!(ctl.session().log.len(), before);
    assert_eq!(llm.calls().len(), 2);
}

#[tokio::test]
async fn new_submission_clears_previous_session() {
    let llm = ScriptedClient::new(vec![
        ok("no steps here"),
        ok("also no steps"),
    ]);
    let mut ctl = SessionController::new(llm);

    ctl.submit("first").await.unwrap();
    let first_len = ctl.session().log.len();
    ctl.submit("second").await.unwrap();

    // 日志重来，不是接着第一次的追加
    assert_eq!(ctl.session().log.len(), first_len);
    assert_eq!(ctl.session().task, "second");
}
