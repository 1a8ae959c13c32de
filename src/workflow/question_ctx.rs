//! 题目处理上下文
//!
//! 封装"我正在用哪个后端解第几题"这一信息

use std::fmt::Display;

use crate::models::Provider;

/// 题目处理上下文
#[derive(Debug, Clone, Copy)]
pub struct QuestionCtx {
    /// 题目序号（从1开始，仅用于日志显示）
    pub question_number: usize,

    /// 题目总数
    pub total: usize,

    /// 本次调用使用的模型提供方
    pub provider: Provider,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(question_number: usize, total: usize, provider: Provider) -> Self {
        Self {
            question_number,
            total,
            provider,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[题目 {}/{} 后端#{}]",
            self.question_number, self.total, self.provider
        )
    }
}
