//! 任务层：Planner（任务拆解与计划解析）与 StepExecutor（单步执行与哨兵识别）

pub mod executor;
pub mod planner;

pub use executor::{parse_outcome, StepExecutor, StepOutcome, NEED_INPUT_MARKER};
pub use planner::{parse_plan, Planner, Step};
