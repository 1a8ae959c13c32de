//! 文档生成服务 - 业务能力层
//!
//! 只负责把题目和答案写成 `.docx`，不关心流程状态。

use docx_rs::{Docx, Paragraph, Run};
use std::path::PathBuf;
use tracing::info;

use crate::error::{AppResult, FileError};
use crate::models::Question;

const TITLE: &str = "Solved Question Bank";
const MISSING_ANSWER: &str = "(no answer)";

/// 文档生成服务
pub struct DocumentWriter {
    output_path: PathBuf,
}

impl DocumentWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// 生成文档并写入磁盘
    ///
    /// # 返回
    /// 返回写入的文件路径
    pub fn compile(&self, questions: &[Question]) -> AppResult<PathBuf> {
        let path = self.output_path.display().to_string();
        let write_failed = |reason: String| FileError::WriteFailed {
            path: path.clone(),
            reason,
        };

        let docx = build_document(questions);

        let file = std::fs::File::create(&self.output_path).map_err(|e| write_failed(e.to_string()))?;
        docx.build()
            .pack(file)
            .map_err(|e| write_failed(e.to_string()))?;

        info!("📝 已生成文档: {} ({} 道题)", path, questions.len());
        Ok(self.output_path.clone())
    }
}

/// 标题 + 每题一个加粗题干 + 答案段落
fn build_document(questions: &[Question]) -> Docx {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new().add_run(Run::new().add_text(TITLE).bold().size(32)),
    );

    for (idx, question) in questions.iter().enumerate() {
        docx = docx.add_paragraph(Paragraph::new().add_run(
            Run::new()
                .add_text(format!("Q{}. {}", idx + 1, question.original_text))
                .bold(),
        ));

        let answer = question.answer.as_deref().unwrap_or(MISSING_ANSWER);
        for line in answer.lines().map(str::trim).filter(|l| !l.is_empty()) {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
        }

        docx = docx.add_paragraph(Paragraph::new());
    }

    docx
}
