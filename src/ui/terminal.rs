use tokio::sync::mpsc;
use tracing::warn;

use crate::models::{PipelineState, Progress, Question, QuestionStatus};
use crate::orchestrator::PipelineEvent;
use crate::utils::logging::append_log_line;

/// 终端视图
///
/// 在独立任务中运行，发送端全部释放后退出。
pub struct TerminalView {
    log_file: Option<String>,
    last_progress: Progress,
}

impl TerminalView {
    /// # 参数
    /// - `log_file`: 运行日志文件路径，`None` 时只输出到终端
    pub fn new(log_file: Option<String>) -> Self {
        Self {
            log_file,
            last_progress: Progress::default(),
        }
    }

    /// 把一个事件渲染为一行文本，不需要显示时返回 `None`
    pub fn render(&mut self, event: &PipelineEvent) -> Option<String> {
        match event {
            PipelineEvent::StateChanged(state) => Some(format!("── STATUS: {} ──", state)),
            PipelineEvent::Log(entry) => Some(entry.to_string()),
            PipelineEvent::QuestionUpdated { index, status } => match status {
                QuestionStatus::Done | QuestionStatus::Error => {
                    Some(format!("   Q{} {}", index + 1, status))
                }
                _ => None,
            },
            PipelineEvent::Progress(progress) => {
                if *progress == self.last_progress {
                    return None;
                }
                self.last_progress = *progress;
                if progress.total == 0 {
                    return None;
                }
                Some(format!("   Progress: {}", progress))
            }
        }
    }

    /// 消费事件直到 channel 关闭
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<PipelineEvent>) {
        while let Some(event) = rx.recv().await {
            let Some(line) = self.render(&event) else {
                continue;
            };
            println!("{}", line);

            if let (PipelineEvent::Log(_), Some(path)) = (&event, &self.log_file) {
                if let Err(e) = append_log_line(path, &line) {
                    warn!("⚠️ 写入日志文件失败: {}", e);
                }
            }

            if let PipelineEvent::StateChanged(PipelineState::Error) = event {
                println!("   (reset to start over)");
            }
        }
    }
}

/// 渲染最终结果汇总
pub fn render_summary(questions: &[Question]) -> String {
    if questions.is_empty() {
        return "No questions were identified.\n".to_string();
    }

    let mut out = String::new();
    for (i, question) in questions.iter().enumerate() {
        out.push_str(&format!("Q{}. {}\n", i + 1, question.original_text));
        match &question.answer {
            Some(answer) => out.push_str(&format!("   {}\n", answer)),
            None => out.push_str(&format!("   ({})\n", question.status)),
        }
    }
    out
}
