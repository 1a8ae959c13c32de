//! 文档读取服务 - 业务能力层
//!
//! 只负责"把一个输入文件变成纯文本"，按后缀选择解析方式：
//! `.docx` 用 `docx-rs` 解析，其余按 UTF-8 文本读取（非法字节做有损替换）。

use docx_rs::{DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent};
use tracing::debug;

use crate::error::{AppResult, FileError};
use crate::models::{DocumentKind, InputFile};

/// 抽取文件文本
pub async fn extract_text(file: &InputFile) -> AppResult<String> {
    let path = file.path.display().to_string();

    let bytes = tokio::fs::read(&file.path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound { path: path.clone() }
        } else {
            FileError::ReadFailed {
                path: path.clone(),
                source,
            }
        }
    })?;

    let text = match file.kind() {
        DocumentKind::Docx => extract_docx(&bytes, &path)?,
        DocumentKind::Text => String::from_utf8_lossy(&bytes).into_owned(),
    };

    debug!("已读取 {} ({} 字符)", file.name, text.chars().count());
    Ok(text)
}

fn extract_docx(bytes: &[u8], path: &str) -> AppResult<String> {
    let doc = docx_rs::read_docx(bytes).map_err(|e| FileError::ParseFailed {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    let mut output = String::new();
    for child in &doc.document.children {
        match child {
            DocumentChild::Paragraph(para) => {
                push_paragraph_text(para, &mut output);
                output.push('\n');
            }
            DocumentChild::Table(table) => {
                for row in &table.rows {
                    let docx_rs::TableChild::TableRow(tr) = row;
                    for cell in &tr.cells {
                        let docx_rs::TableRowChild::TableCell(tc) = cell;
                        for content in &tc.children {
                            if let TableCellContent::Paragraph(para) = content {
                                push_paragraph_text(para, &mut output);
                                output.push_str(" | ");
                            }
                        }
                    }
                    output.push('\n');
                }
            }
            _ => {}
        }
    }

    Ok(output)
}

/// 段落中的文本（包括超链接里的文字）
fn push_paragraph_text(para: &Paragraph, output: &mut String) {
    for child in &para.children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    if let RunChild::Text(text) = run_child {
                        output.push_str(&text.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let ParagraphChild::Run(run) = inner {
                        for run_child in &run.children {
                            if let RunChild::Text(text) = run_child {
                                output.push_str(&text.text);
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run, Table, TableCell, TableRow};

    #[tokio::test]
    async fn reads_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "X is the 24th letter.\nY follows X.").unwrap();

        let text = extract_text(&InputFile::source_material(&path)).await.unwrap();
        assert_eq!(text, "X is the 24th letter.\nY follows X.");
    }

    #[tokio::test]
    async fn reads_docx_paragraphs_and_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.docx");

        let file = std::fs::File::create(&path).unwrap();
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("1. What is X?")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("2. What is Y?")))
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new()
                    .add_paragraph(Paragraph::new().add_run(Run::new().add_text("cell"))),
            ])]))
            .build()
            .pack(file)
            .unwrap();

        let text = extract_text(&InputFile::question_bank(&path)).await.unwrap();
        assert!(text.contains("1. What is X?\n"));
        assert!(text.contains("2. What is Y?\n"));
        assert!(text.contains("cell | "));
    }

    #[tokio::test]
    async fn broken_docx_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        std::fs::write(&path, "definitely not a zip archive").unwrap();

        let err = extract_text(&InputFile::question_bank(&path)).await.unwrap_err();
        assert!(err.to_string().starts_with("failed to parse"));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let err = extract_text(&InputFile::source_material("/no/such/file.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "file not found: /no/such/file.txt");
    }
}
