use std::path::{Path, PathBuf};

/// 输入文件角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    QuestionBank,
    SourceMaterial,
}

impl FileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::QuestionBank => "question-bank",
            FileRole::SourceMaterial => "source-material",
        }
    }
}

/// 文档类型，按文件后缀判断
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Docx,
    Text,
}

/// 一个待处理的输入文件
///
/// 只保存路径，文本在每次运行时重新抽取，不缓存。
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub role: FileRole,
    pub path: PathBuf,
}

impl InputFile {
    pub fn new(path: impl Into<PathBuf>, role: FileRole) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { name, role, path }
    }

    pub fn question_bank(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref(), FileRole::QuestionBank)
    }

    pub fn source_material(path: impl AsRef<Path>) -> Self {
        Self::new(path.as_ref(), FileRole::SourceMaterial)
    }

    /// `.docx` 走 docx 解析，其余一律按纯文本处理
    pub fn kind(&self) -> DocumentKind {
        if self.name.to_lowercase().ends_with(".docx") {
            DocumentKind::Docx
        } else {
            DocumentKind::Text
        }
    }
}
