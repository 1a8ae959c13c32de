use serde::Deserialize;
use std::path::Path;

use crate::error::{AppResult, ConfigError};
use crate::models::Provider;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 默认使用的模型提供方
    pub provider: Provider,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 运行日志文件
    pub output_log_file: String,
    /// 生成的答案文档
    pub output_docx: String,
    /// 每道题之间的固定等待（毫秒），用来避开限流
    pub solve_delay_ms: u64,
    // --- 云端 LLM 配置 ---
    /// 显式指定的 API Key，优先于环境变量
    pub cloud_api_key: Option<String>,
    /// 调用时读取 API Key 的环境变量名
    pub cloud_api_key_env: String,
    pub cloud_api_base_url: String,
    pub cloud_model_name: String,
    // --- 本地 Ollama 配置 ---
    pub local_base_url: String,
    pub local_model_name: String,
    /// 存活探测超时（毫秒）
    pub probe_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: Provider::Cloud,
            verbose_logging: false,
            output_log_file: "auto_solver_log.txt".to_string(),
            output_docx: "solved_questions.docx".to_string(),
            solve_delay_ms: 500,
            cloud_api_key: None,
            cloud_api_key_env: "API_KEY".to_string(),
            cloud_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            cloud_model_name: "gemini-2.5-flash".to_string(),
            local_base_url: "http://localhost:11434".to_string(),
            local_model_name: "gemma2:2b".to_string(),
            probe_timeout_ms: 2000,
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileLoad {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: path.display().to_string(),
            source,
        })?;

        Ok(config)
    }

    /// 先读配置文件（如果有），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 用环境变量覆盖已有字段
    pub fn with_env_overrides(self) -> Self {
        Self {
            provider: std::env::var("LLM_PROVIDER").ok().and_then(|v| v.parse().ok()).unwrap_or(self.provider),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
            output_docx: std::env::var("OUTPUT_DOCX").unwrap_or(self.output_docx),
            solve_delay_ms: std::env::var("SOLVE_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.solve_delay_ms),
            cloud_api_key: std::env::var("LLM_API_KEY").ok().or(self.cloud_api_key),
            cloud_api_key_env: std::env::var("API_KEY_ENV").unwrap_or(self.cloud_api_key_env),
            cloud_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.cloud_api_base_url),
            cloud_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.cloud_model_name),
            local_base_url: std::env::var("OLLAMA_BASE_URL").unwrap_or(self.local_base_url),
            local_model_name: std::env::var("OLLAMA_MODEL").unwrap_or(self.local_model_name),
            probe_timeout_ms: std::env::var("PROBE_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.probe_timeout_ms),
        }
    }
}
