use serde::{Deserialize, Serialize};
use std::fmt;

/// 题目处理状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Pending,
    Solving,
    Done,
    Error,
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuestionStatus::Pending => "pending",
            QuestionStatus::Solving => "solving",
            QuestionStatus::Done => "done",
            QuestionStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// 切分后的一道题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// 本次运行内唯一，`q-0`、`q-1`……
    pub id: String,
    pub original_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub status: QuestionStatus,
}

impl Question {
    /// 按切分顺序创建题目
    pub fn new(index: usize, original_text: impl Into<String>) -> Self {
        Self {
            id: format!("q-{}", index),
            original_text: original_text.into(),
            answer: None,
            status: QuestionStatus::Pending,
        }
    }

    /// 批量创建，编号与切分结果顺序一致
    pub fn from_segments(segments: Vec<String>) -> Vec<Self> {
        segments
            .into_iter()
            .enumerate()
            .map(|(i, text)| Self::new(i, text))
            .collect()
    }

    pub fn is_done(&self) -> bool {
        self.status == QuestionStatus::Done
    }
}

/// 解题进度
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub total: usize,
    pub current: usize,
}

impl Progress {
    /// 根据题目列表重新计算（current = 已完成题数）
    pub fn recompute(questions: &[Question]) -> Self {
        Self {
            total: questions.len(),
            current: questions.iter().filter(|q| q.is_done()).count(),
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_segment_order() {
        let questions =
            Question::from_segments(vec!["What is X?".to_string(), "What is Y?".to_string()]);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "q-0");
        assert_eq!(questions[1].id, "q-1");
        assert_eq!(questions[1].original_text, "What is Y?");
        assert!(questions
            .iter()
            .all(|q| q.status == QuestionStatus::Pending && q.answer.is_none()));
    }

    #[test]
    fn progress_counts_only_done() {
        let mut questions = Question::from_segments(vec!["a".into(), "b".into(), "c".into()]);
        questions[0].status = QuestionStatus::Done;
        questions[1].status = QuestionStatus::Solving;

        let progress = Progress::recompute(&questions);
        assert_eq!(progress, Progress { total: 3, current: 1 });
        assert_eq!(progress.to_string(), "1 / 3");
    }
}
