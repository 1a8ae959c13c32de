use chrono::{DateTime, Local};
use std::fmt;

/// 日志来源阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reader,
    Analyst,
    Solver,
    Writer,
    System,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Reader => "READER",
            Stage::Analyst => "ANALYST",
            Stage::Solver => "SOLVER",
            Stage::Writer => "WRITER",
            Stage::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

/// 流水线日志条目，只追加不修改
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub stage: Stage,
    pub message: String,
}

impl LogEntry {
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            stage,
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.stage,
            self.message
        )
    }
}
