use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use auto_solver::models::{PipelineState, Provider};
use auto_solver::ui::{render_summary, TerminalView};
use auto_solver::utils::logging;
use auto_solver::{Config, LocalClient, Pipeline};

/// 读取题库和参考资料，逐题生成答案文档
#[derive(Parser, Debug)]
#[command(name = "auto-solver", version, about)]
struct Cli {
    /// 题库文件（.docx 或纯文本）
    #[arg(short = 'q', long)]
    question_bank: PathBuf,

    /// 参考资料文件，可重复
    #[arg(short, long = "source", required = true)]
    sources: Vec<PathBuf>,

    /// 模型提供方：cloud / local
    #[arg(short, long)]
    provider: Option<Provider>,

    /// 输出的 .docx 路径
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 运行前拉取本地模型
    #[arg(long)]
    pull_model: bool,

    /// 输出详细日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::load(cli.config.as_deref())?;
    if cli.verbose {
        config.verbose_logging = true;
    }
    if let Some(output) = &cli.output {
        config.output_docx = output.display().to_string();
    }

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::init_log_file(&config.output_log_file)?;
    logging::log_startup(&config);

    if cli.pull_model {
        let local = LocalClient::new(&config);
        local.pull_model(local.model_name()).await?;
    }

    let mut pipeline = Pipeline::new(&config);
    let view = TerminalView::new(Some(config.output_log_file.clone()));
    let view_handle = tokio::spawn(view.run(pipeline.subscribe()));

    pipeline.detect_local_provider().await;
    if pipeline.local_available() {
        let local = LocalClient::new(&config);
        let models = local.list_models().await;
        if !models.iter().any(|m| m == local.model_name()) {
            warn!(
                "⚠️ 本地未找到模型 {}，可使用 --pull-model 拉取",
                local.model_name()
            );
        }
    }

    let wanted = cli.provider.unwrap_or(config.provider);
    if let Some(provider) = cli.provider {
        pipeline.select_provider(provider);
    }
    if pipeline.provider() != wanted {
        warn!("⚠️ {} 不可用，回退到 {}", wanted.describe(), pipeline.provider().describe());
    }

    pipeline.load_question_bank(&cli.question_bank);
    pipeline.add_source_materials(&cli.sources);

    let final_state = pipeline.start().await;
    if final_state == PipelineState::Completed {
        if let Some(path) = pipeline.download() {
            info!("📄 答案文档: {}", path.display());
        }
    }

    let summary = render_summary(pipeline.questions());
    drop(pipeline);
    let _ = view_handle.await;

    if final_state == PipelineState::Error {
        anyhow::bail!(
            "pipeline stopped with an error, see {}",
            config.output_log_file
        );
    }

    println!("\n{}", summary);
    Ok(())
}
