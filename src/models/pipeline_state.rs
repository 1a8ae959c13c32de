use std::fmt;

/// 流水线状态
///
/// 同一时刻只有一个状态，迁移由调用方驱动：
///
/// ```text
/// Idle -> ReadingFiles -> AnalyzingQuestions -> Solving -> Completed
/// Completed -> Compiling -> Completed
/// Completed | Error -> Idle
/// * -> Error
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ReadingFiles,
    AnalyzingQuestions,
    Solving,
    Compiling,
    Completed,
    Error,
}

impl PipelineState {
    /// 是否允许从当前状态迁移到 `next`
    pub fn can_transition_to(self, next: PipelineState) -> bool {
        use PipelineState as S;

        if next == S::Error {
            return self != S::Error;
        }

        matches!(
            (self, next),
            (S::Idle, S::ReadingFiles)
                | (S::ReadingFiles, S::AnalyzingQuestions)
                | (S::AnalyzingQuestions, S::Solving)
                // 切分结果为空时直接完成，不进入 Solving
                | (S::AnalyzingQuestions, S::Completed)
                | (S::Solving, S::Completed)
                | (S::Completed, S::Compiling)
                | (S::Compiling, S::Completed)
                | (S::Completed, S::Idle)
                | (S::Error, S::Idle)
        )
    }

    /// 流水线正在运行
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            PipelineState::ReadingFiles
                | PipelineState::AnalyzingQuestions
                | PipelineState::Solving
                | PipelineState::Compiling
        )
    }

    /// 只有空闲时才接受文件输入和启动
    pub fn accepts_input(self) -> bool {
        self == PipelineState::Idle
    }

    pub fn can_reset(self) -> bool {
        matches!(self, PipelineState::Completed | PipelineState::Error)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Idle => "IDLE",
            PipelineState::ReadingFiles => "READING_FILES",
            PipelineState::AnalyzingQuestions => "ANALYZING_QUESTIONS",
            PipelineState::Solving => "SOLVING",
            PipelineState::Compiling => "COMPILING",
            PipelineState::Completed => "COMPLETED",
            PipelineState::Error => "ERROR",
        };
        f.write_str(s)
    }
}
