//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::Pipeline (状态机，处理 Vec<Question>)
//!     ↓
//! workflow::QuestionFlow (处理单个 Question)
//!     ↓
//! services (能力层：llm / document_reader / document_writer)
//!     ↓
//! clients (基础设施：云端 / 本地 Ollama)
//! ```
//!
//! 编排层只做调度、状态迁移和统计，不做具体业务判断。

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineEvent, RunStats};
