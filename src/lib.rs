//! # Auto Solver
//!
//! 读取题库和参考资料，借助 LLM 切分题目并逐题解答，最后生成答案文档
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 模型提供方，统一实现 `LlmBackend`
//! - `CloudClient` - Gemini（OpenAI 兼容接口）
//! - `LocalClient` - 本地 Ollama
//!
//! ### ② 业务能力层（Services）
//! - `LlmService` - 按 `Provider` 分派 Segment / Answer
//! - `document_reader` - 抽取 `.docx` 和纯文本
//! - `DocumentWriter` - 编译答案文档
//!
//! ### ③ 流程层（Workflow）
//! - `QuestionCtx` - 上下文封装（题号 + 提供方）
//! - `QuestionFlow` - 单题解答
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pipeline` - 状态机、题目列表、日志与进度
//!
//! ### ⑤ 视图层（UI）
//! - `ui/terminal` - 订阅流水线事件并渲染到终端
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod ui;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CloudClient, LlmBackend, LocalClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{PipelineState, Provider, Question, QuestionStatus};
pub use orchestrator::{Pipeline, PipelineEvent};
pub use services::LlmService;
pub use workflow::{ProcessResult, QuestionCtx, QuestionFlow};
