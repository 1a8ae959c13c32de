//! LLM 客户端
//!
//! 两个后端（云端 / 本地 Ollama）实现同一个 [`LlmBackend`] trait，
//! 对外只暴露两个逻辑操作：切分题目、回答题目。

pub mod cloud_client;
pub mod local_client;
pub mod prompts;

use futures::future::BoxFuture;

use crate::error::AppResult;

pub use cloud_client::CloudClient;
pub use local_client::LocalClient;

/// 模型返回空内容时的占位答案
pub const NO_ANSWER_PLACEHOLDER: &str = "Could not generate answer.";
/// 调用失败时的占位答案
pub const ANSWER_ERROR_PLACEHOLDER: &str = "Error generating answer.";

/// 是否是占位答案
pub fn is_placeholder(answer: &str) -> bool {
    answer == NO_ANSWER_PLACEHOLDER || answer == ANSWER_ERROR_PLACEHOLDER
}

/// LLM 后端
pub trait LlmBackend: Send + Sync {
    /// 后端名称（用于日志）
    fn name(&self) -> &'static str;

    /// 把题库原文切分成独立题目，保持原顺序
    fn segment<'a>(&'a self, raw_text: &'a str) -> BoxFuture<'a, AppResult<Vec<String>>>;

    /// 基于上下文回答一道题
    ///
    /// 单题失败不会返回错误，而是返回占位答案；
    /// 只有缺少凭据这类配置问题才会返回 `Err`。
    fn answer<'a>(&'a self, question: &'a str, context: &'a str)
        -> BoxFuture<'a, AppResult<String>>;

    /// 存活探测，默认总是可用
    fn probe(&self) -> BoxFuture<'_, bool> {
        Box::pin(async { true })
    }
}
