//! 终端视图
//!
//! 订阅 [`crate::orchestrator::PipelineEvent`] 并渲染到终端，同时把日志追加到运行日志文件。

pub mod terminal;

pub use terminal::{render_summary, TerminalView};
