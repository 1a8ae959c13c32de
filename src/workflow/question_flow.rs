//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的解题流程
//!
//! 流程顺序：
//! 1. 调用 LLM 回答（基于完整的资料上下文）
//! 2. 区分真实答案与占位答案
//!
//! 状态变更和进度统计由编排层负责，这里只产出答案。

use tracing::{debug, info, warn};

use crate::clients::is_placeholder;
use crate::error::AppResult;
use crate::services::LlmService;
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 题目处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 模型给出了答案
    Answered(String),
    /// 模型失败或返回空，使用了占位答案
    Fallback(String),
}

impl ProcessResult {
    pub fn answer(&self) -> &str {
        match self {
            ProcessResult::Answered(a) | ProcessResult::Fallback(a) => a,
        }
    }

    pub fn into_answer(self) -> String {
        match self {
            ProcessResult::Answered(a) | ProcessResult::Fallback(a) => a,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ProcessResult::Fallback(_))
    }
}

/// 题目处理流程
///
/// - 不持有任何可变状态
/// - 只依赖业务能力（services）
pub struct QuestionFlow<'a> {
    llm_service: &'a LlmService,
    verbose_logging: bool,
}

impl<'a> QuestionFlow<'a> {
    /// 创建新的题目处理流程
    pub fn new(llm_service: &'a LlmService, verbose_logging: bool) -> Self {
        Self {
            llm_service,
            verbose_logging,
        }
    }

    /// 解一道题
    ///
    /// 只有配置类错误（如缺少 API Key）会返回 `Err`，单题失败以占位答案返回。
    pub async fn run(
        &self,
        question: &str,
        context: &str,
        ctx: &QuestionCtx,
    ) -> AppResult<ProcessResult> {
        info!("{} 🤖 正在解题: {}", ctx, truncate_text(question, 80));

        let answer = self
            .llm_service
            .answer(ctx.provider, question, context)
            .await?;

        if is_placeholder(&answer) {
            warn!("{} ⚠️ 未能生成答案，使用占位: {}", ctx, answer);
            return Ok(ProcessResult::Fallback(answer));
        }

        if self.verbose_logging {
            debug!("{} 答案预览: {}", ctx, truncate_text(&answer, 120));
        }
        info!("{} ✓ 解题完成 ({} 字符)", ctx, answer.chars().count());

        Ok(ProcessResult::Answered(answer))
    }
}
