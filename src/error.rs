//! 错误类型定义
//!
//! 按来源分层：配置 / LLM / 文件 / 流程。
//! 所有子错误都以 `transparent` 方式挂到 `AppError` 上，
//! 这样流水线日志里看到的就是最内层的原始消息。

use thiserror::Error;

use crate::models::PipelineState;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// LLM 服务错误
    #[error(transparent)]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
    /// 流程状态错误
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// 其他错误
    #[error("{0}")]
    Other(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 云端 API Key 缺失
    #[error("API Key not set")]
    ApiKeyNotSet,
    /// 无法识别的模型提供方
    #[error("unknown provider '{value}' (expected 'cloud' or 'local')")]
    InvalidProvider { value: String },
    /// 读取配置文件失败
    #[error("failed to read config file {path}: {source}")]
    FileLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("failed to parse config file {path}: {source}")]
    TomlParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 题目切分失败（解析或调用失败统一归到这里）
    #[error("Failed to analyze question bank.")]
    SegmentationFailed {
        provider: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 请求发送失败
    #[error("{provider} request failed: {message}")]
    RequestFailed {
        provider: &'static str,
        message: String,
    },
    /// 非 2xx 响应
    #[error("{provider} returned HTTP {status}")]
    BadStatus { provider: &'static str, status: u16 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("file not found: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文档解析失败
    #[error("failed to parse {path}: {reason}")]
    ParseFailed { path: String, reason: String },
    /// 写入文件失败
    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

/// 流程状态错误
#[derive(Debug, Error)]
pub enum PipelineError {
    /// 非法状态迁移
    #[error("illegal pipeline transition {from:?} -> {to:?}")]
    InvalidTransition {
        from: PipelineState,
        to: PipelineState,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建题目切分失败错误
    pub fn segmentation_failed(
        provider: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Llm(LlmError::SegmentationFailed {
            provider,
            source: Box::new(source),
        })
    }

    /// 创建请求失败错误
    pub fn request_failed(provider: &'static str, message: impl Into<String>) -> Self {
        AppError::Llm(LlmError::RequestFailed {
            provider,
            message: message.into(),
        })
    }

    /// 是否是缺少 API Key
    pub fn is_missing_api_key(&self) -> bool {
        matches!(self, AppError::Config(ConfigError::ApiKeyNotSet))
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
