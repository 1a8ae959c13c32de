//! 流水线编排器 - 编排层
//!
//! ## 职责
//!
//! 驱动一次完整的解题流程，并维护所有共享状态（状态机、题目、日志、进度）。
//!
//! ## 核心流程
//!
//! 1. **读取**：抽取题库和所有资料文件的文本，资料拼接为一个上下文
//! 2. **切分**：对题库文本调用一次 Segment
//! 3. **解题**：按切分顺序逐题调用 Answer，严格串行，题与题之间固定等待
//! 4. **生成**：用户请求下载时编译为 `.docx`
//!
//! ## 设计特点
//!
//! - **显式状态机**：所有迁移经过 [`PipelineState::can_transition_to`] 校验
//! - **分阶段结果**：每个阶段返回 `AppResult`，由编排器决定停止还是继续
//! - **事件输出**：状态、日志、进度通过 channel 推送给视图层，编排器不依赖任何 UI

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, PipelineError};
use crate::models::{
    InputFile, LogEntry, PipelineState, Progress, Provider, Question, QuestionStatus, Stage,
};
use crate::services::{document_reader, DocumentWriter, LlmService};
use crate::clients::prompts::truncate_chars;
use crate::workflow::{QuestionCtx, QuestionFlow};

/// 推送给视图层的事件
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    Log(LogEntry),
    QuestionUpdated {
        index: usize,
        status: QuestionStatus,
    },
    Progress(Progress),
}

/// 单次运行统计
#[derive(Debug, Clone, Copy, Default)]
pub struct RunStats {
    pub started_at: Option<DateTime<Local>>,
    pub finished_at: Option<DateTime<Local>>,
    /// 使用占位答案的题数
    pub fallback_answers: usize,
}

impl RunStats {
    pub fn elapsed_secs(&self) -> Option<f64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds() as f64 / 1000.0),
            _ => None,
        }
    }
}

/// 流水线编排器
pub struct Pipeline {
    state: PipelineState,
    provider: Provider,
    /// 配置或用户指定的提供方；本地在探测成功前不生效
    preferred_provider: Provider,
    local_available: bool,
    question_bank: Option<InputFile>,
    source_files: Vec<InputFile>,
    questions: Vec<Question>,
    logs: Vec<LogEntry>,
    progress: Progress,
    stats: RunStats,
    llm_service: LlmService,
    writer: DocumentWriter,
    solve_delay: Duration,
    verbose_logging: bool,
    events: Option<mpsc::UnboundedSender<PipelineEvent>>,
}

impl Pipeline {
    /// 按配置创建
    pub fn new(config: &Config) -> Self {
        Self::with_service(config, LlmService::new(config))
    }

    /// 使用指定的 LLM 服务创建
    pub fn with_service(config: &Config, llm_service: LlmService) -> Self {
        Self {
            state: PipelineState::Idle,
            provider: Provider::Cloud,
            preferred_provider: config.provider,
            local_available: false,
            question_bank: None,
            source_files: Vec::new(),
            questions: Vec::new(),
            logs: Vec::new(),
            progress: Progress::default(),
            stats: RunStats::default(),
            llm_service,
            writer: DocumentWriter::new(&config.output_docx),
            solve_delay: Duration::from_millis(config.solve_delay_ms),
            verbose_logging: config.verbose_logging,
            events: None,
        }
    }

    /// 订阅事件流，重复订阅会替换之前的订阅者
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PipelineEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.events = Some(tx);
        rx
    }

    // ========== 只读访问 ==========

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn local_available(&self) -> bool {
        self.local_available
    }

    pub fn question_bank(&self) -> Option<&InputFile> {
        self.question_bank.as_ref()
    }

    pub fn source_files(&self) -> &[InputFile] {
        &self.source_files
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    // ========== 用户命令 ==========

    /// 探测本地 Ollama 是否可用，决定本地选项能否被选择
    pub async fn detect_local_provider(&mut self) -> bool {
        let available = self.llm_service.probe(Provider::Local).await;
        self.local_available = available;

        if available {
            self.add_log(Stage::System, "🟢 Ollama detected - Local AI available!");
            if self.preferred_provider == Provider::Local && self.provider != Provider::Local {
                self.select_provider(Provider::Local);
            }
        } else {
            self.add_log(Stage::System, "🔵 Using cloud API (Ollama not detected)");
        }
        available
    }

    /// 切换模型提供方
    ///
    /// 运行中不允许切换；本地未探测成功时不允许选择本地。
    pub fn select_provider(&mut self, provider: Provider) -> bool {
        if self.state.is_busy() {
            warn!("⚠️ 流水线运行中 ({})，忽略切换请求", self.state);
            return false;
        }

        if provider == Provider::Local && !self.local_available {
            warn!("⚠️ 本地 Ollama 不可用，保持 {}", self.provider);
            self.add_log(
                Stage::System,
                "Local provider unavailable (Ollama not detected).",
            );
            return false;
        }

        self.provider = provider;
        self.preferred_provider = provider;
        self.add_log(
            Stage::System,
            format!("Switched to {}", provider.describe()),
        );
        true
    }

    /// 载入题库文件（替换之前的题库）
    pub fn load_question_bank(&mut self, path: impl AsRef<Path>) -> bool {
        if !self.state.accepts_input() {
            warn!("⚠️ 当前状态 {} 不接受文件输入", self.state);
            return false;
        }

        let file = InputFile::question_bank(path);
        self.add_log(
            Stage::System,
            format!("Question Bank loaded: {}", file.name),
        );
        self.question_bank = Some(file);
        true
    }

    /// 追加资料文件
    ///
    /// # 返回
    /// 返回本次加入的文件数
    pub fn add_source_materials<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> usize {
        if !self.state.accepts_input() {
            warn!("⚠️ 当前状态 {} 不接受文件输入", self.state);
            return 0;
        }

        let new_files: Vec<InputFile> = paths.into_iter().map(InputFile::source_material).collect();
        let added = new_files.len();
        if added > 0 {
            self.source_files.extend(new_files);
            self.add_log(Stage::System, format!("Added {} source file(s).", added));
        }
        added
    }

    /// 是否满足启动条件
    pub fn can_start(&self) -> bool {
        self.state == PipelineState::Idle
            && self.question_bank.is_some()
            && !self.source_files.is_empty()
    }

    /// 启动流水线
    ///
    /// 不满足启动条件时什么也不做。
    ///
    /// # 返回
    /// 返回运行结束后的状态（`Completed` 或 `Error`）
    pub async fn start(&mut self) -> PipelineState {
        if !self.can_start() {
            warn!(
                "⚠️ 无法启动：状态 {}，题库 {}，资料 {} 个",
                self.state,
                if self.question_bank.is_some() { "已载入" } else { "缺失" },
                self.source_files.len()
            );
            return self.state;
        }

        self.stats = RunStats {
            started_at: Some(Local::now()),
            ..RunStats::default()
        };

        if let Err(e) = self.run_stages().await {
            self.fail(e);
        }

        self.state
    }

    /// 编译答案文档
    ///
    /// 只在 `Completed` 下可用；无论生成是否成功都回到 `Completed`。
    pub fn download(&mut self) -> Option<PathBuf> {
        if self.state != PipelineState::Completed {
            warn!("⚠️ 当前状态 {} 不能生成文档", self.state);
            return None;
        }

        self.transition(PipelineState::Compiling).ok()?;
        self.add_log(Stage::Writer, "Compiling final DOCX document...");

        let path = match self.writer.compile(&self.questions) {
            Ok(path) => {
                self.add_log(
                    Stage::Writer,
                    format!("Document generated: {}", path.display()),
                );
                Some(path)
            }
            Err(e) => {
                error!("❌ 文档生成失败: {}", e);
                self.add_log(Stage::Writer, format!("Document generation failed: {}", e));
                None
            }
        };

        if let Err(e) = self.transition(PipelineState::Completed) {
            warn!("⚠️ {}", e);
        }
        path
    }

    /// 重置所有数据回到 `Idle`
    pub fn reset(&mut self) -> bool {
        if !self.state.can_reset() {
            warn!("⚠️ 当前状态 {} 不能重置", self.state);
            return false;
        }

        self.question_bank = None;
        self.source_files.clear();
        self.questions.clear();
        self.logs.clear();
        self.progress = Progress::default();
        self.stats = RunStats::default();

        if let Err(e) = self.transition(PipelineState::Idle) {
            warn!("⚠️ {}", e);
            return false;
        }
        self.emit(PipelineEvent::Progress(self.progress));
        info!("🔄 已重置");
        true
    }

    // ========== 各阶段 ==========

    async fn run_stages(&mut self) -> AppResult<()> {
        self.transition(PipelineState::ReadingFiles)?;
        let (question_bank_text, context) = self.read_files().await?;

        self.transition(PipelineState::AnalyzingQuestions)?;
        self.analyze(&question_bank_text).await?;

        if self.questions.is_empty() {
            self.add_log(
                Stage::Analyst,
                "No questions identified; nothing to solve.",
            );
            self.transition(PipelineState::Completed)?;
            self.finish_run();
            return Ok(());
        }

        self.transition(PipelineState::Solving)?;
        self.solve_all(&context).await?;

        self.transition(PipelineState::Completed)?;
        self.add_log(Stage::Writer, "All questions processed. Ready to compile.");
        self.finish_run();
        Ok(())
    }

    /// 读取阶段：返回 (题库文本, 拼接后的资料上下文)
    async fn read_files(&mut self) -> AppResult<(String, String)> {
        self.add_log(Stage::Reader, "Initiating document ingestion sequence...");

        let Some(question_bank) = self.question_bank.clone() else {
            return Err(AppError::Other("no question bank loaded".to_string()));
        };
        let question_bank_text = document_reader::extract_text(&question_bank).await?;
        self.add_log(
            Stage::Reader,
            format!(
                "Question Bank ingested ({} chars).",
                question_bank_text.chars().count()
            ),
        );

        let mut context = String::new();
        for source in self.source_files.clone() {
            let text = document_reader::extract_text(&source).await?;
            context.push_str(&format!("\n--- SOURCE: {} ---\n{}", source.name, text));
            self.add_log(Stage::Reader, format!("Ingested source: {}", source.name));
        }

        Ok((question_bank_text, context))
    }

    /// 切分阶段
    async fn analyze(&mut self, question_bank_text: &str) -> AppResult<()> {
        self.add_log(Stage::Analyst, "Scanning Question Bank for distinct queries...");

        let segments = self
            .llm_service
            .segment(self.provider, question_bank_text)
            .await?;

        self.add_log(
            Stage::Analyst,
            format!("Identified {} distinct questions.", segments.len()),
        );

        self.questions = Question::from_segments(segments);
        self.progress = Progress::recompute(&self.questions);
        self.emit(PipelineEvent::Progress(self.progress));
        Ok(())
    }

    /// 解题阶段：严格按顺序逐题处理
    async fn solve_all(&mut self, context: &str) -> AppResult<()> {
        self.add_log(
            Stage::Solver,
            format!("Solving questions sequentially via {}...", self.provider.describe()),
        );

        let total = self.questions.len();
        for index in 0..total {
            let text = self.questions[index].original_text.clone();
            self.add_log(
                Stage::Solver,
                format!("Solving Q{}: \"{}...\"", index + 1, truncate_chars(&text, 40)),
            );
            self.set_question_status(index, QuestionStatus::Solving);

            let ctx = QuestionCtx::new(index + 1, total, self.provider);
            let flow = QuestionFlow::new(&self.llm_service, self.verbose_logging);
            let outcome = flow.run(&text, context, &ctx).await;
            let result = match outcome {
                Ok(result) => result,
                Err(e) => {
                    self.set_question_status(index, QuestionStatus::Error);
                    return Err(e);
                }
            };

            if result.is_fallback() {
                self.stats.fallback_answers += 1;
            }
            self.questions[index].answer = Some(result.into_answer());
            self.set_question_status(index, QuestionStatus::Done);

            self.progress = Progress::recompute(&self.questions);
            self.emit(PipelineEvent::Progress(self.progress));

            if !self.solve_delay.is_zero() {
                tokio::time::sleep(self.solve_delay).await;
            }
        }

        Ok(())
    }

    // ========== 内部辅助 ==========

    fn finish_run(&mut self) {
        self.stats.finished_at = Some(Local::now());
        let elapsed = self.stats.elapsed_secs().unwrap_or_default();
        let answered = self.questions.iter().filter(|q| q.is_done()).count();

        info!("{}", "=".repeat(60));
        info!("📊 处理完成: {} 道题，耗时 {:.1}s", answered, elapsed);
        info!("⚠️ 占位答案: {}", self.stats.fallback_answers);
        info!("{}", "=".repeat(60));

        self.add_log(
            Stage::System,
            format!(
                "Run finished in {:.1}s: {} answered, {} fallback.",
                elapsed, answered, self.stats.fallback_answers
            ),
        );
    }

    fn fail(&mut self, err: AppError) {
        error!("❌ 流水线失败 ({}): {}", self.state, err);
        if self.state != PipelineState::Error {
            self.set_state(PipelineState::Error);
        }
        self.stats.finished_at = Some(Local::now());
        self.add_log(Stage::System, format!("Critical Error: {}", err));
    }

    fn transition(&mut self, next: PipelineState) -> AppResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.state,
                to: next,
            }
            .into());
        }
        self.set_state(next);
        Ok(())
    }

    fn set_state(&mut self, next: PipelineState) {
        debug!("状态迁移: {} -> {}", self.state, next);
        self.state = next;
        self.emit(PipelineEvent::StateChanged(next));
    }

    fn set_question_status(&mut self, index: usize, status: QuestionStatus) {
        if let Some(question) = self.questions.get_mut(index) {
            question.status = status;
            self.emit(PipelineEvent::QuestionUpdated { index, status });
        }
    }

    fn add_log(&mut self, stage: Stage, message: impl Into<String>) {
        let entry = LogEntry::new(stage, message);
        debug!("[{}] {}", entry.stage, entry.message);
        self.logs.push(entry.clone());
        self.emit(PipelineEvent::Log(entry));
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(tx) = &self.events {
            // 订阅者已退出时静默丢弃
            let _ = tx.send(event);
        }
    }
}
