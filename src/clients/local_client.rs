//! 本地 Ollama 客户端
//!
//! 直接用 `reqwest` 调用 Ollama 的 HTTP 接口：
//! - `GET  /api/tags`      存活探测 / 模型列表
//! - `POST /api/generate`  非流式生成
//! - `POST /api/pull`      拉取模型（只看状态码，忽略流式进度）

use futures::future::BoxFuture;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::prompts::{self, LOCAL_CONTEXT_LIMIT};
use super::{LlmBackend, ANSWER_ERROR_PLACEHOLDER, NO_ANSWER_PLACEHOLDER};
use crate::config::Config;
use crate::error::{AppError, AppResult, LlmError};

const PROVIDER: &str = "local";

const SEGMENT_TEMPERATURE: f32 = 0.3;
const ANSWER_TEMPERATURE: f32 = 0.7;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    created_at: String,
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

/// 本地 Ollama 客户端
#[derive(Debug, Clone)]
pub struct LocalClient {
    http: reqwest::Client,
    base_url: String,
    model_name: String,
    probe_timeout: Duration,
}

impl LocalClient {
    /// 创建新的本地客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.local_base_url.trim_end_matches('/').to_string(),
            model_name: config.local_model_name.clone(),
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// 检查 Ollama 是否可达：2xx 为 true，其余（包括网络错误）为 false
    pub async fn check_status(&self) -> bool {
        match self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!("Ollama 未运行: {}", e);
                false
            }
        }
    }

    /// 列出本地已有模型，失败时返回空列表
    pub async fn list_models(&self) -> Vec<String> {
        let resp = match self
            .http
            .get(self.url("/api/tags"))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!("获取模型列表失败: HTTP {}", resp.status());
                return Vec::new();
            }
            Err(e) => {
                warn!("获取模型列表失败: {}", e);
                return Vec::new();
            }
        };

        match resp.json::<TagsResponse>().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(e) => {
                warn!("模型列表解析失败: {}", e);
                Vec::new()
            }
        }
    }

    /// 触发模型拉取，只确认请求被接受，不等待下载完成
    pub async fn pull_model(&self, model_name: &str) -> AppResult<()> {
        let resp = self
            .http
            .post(self.url("/api/pull"))
            .json(&serde_json::json!({ "name": model_name }))
            .send()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::BadStatus {
                provider: PROVIDER,
                status: resp.status().as_u16(),
            }
            .into());
        }

        info!("📥 模型 {} 拉取已开始", model_name);
        Ok(())
    }

    /// 非流式生成
    async fn generate(&self, prompt: &str, temperature: f32) -> AppResult<String> {
        debug!("调用 Ollama，模型: {}", self.model_name);

        let request = GenerateRequest {
            model: &self.model_name,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature,
                top_p: 0.9,
                top_k: 40,
            },
        };

        let resp = self
            .http
            .post(self.url("/api/generate"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(LlmError::BadStatus {
                provider: PROVIDER,
                status: resp.status().as_u16(),
            }
            .into());
        }

        let data: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| AppError::request_failed(PROVIDER, e.to_string()))?;

        debug!(
            "Ollama 生成完成: model={} created_at={} done={}",
            data.model, data.created_at, data.done
        );

        Ok(data.response)
    }
}

/// 匹配第一个 `[` 到最后一个 `]`（跨行）
fn json_array_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("静态正则必然合法"))
}

/// 从自由文本中提取 JSON 数组
///
/// 找不到方括号时返回 `Ok(None)`，括号内 JSON 非法时返回解析错误。
fn extract_json_array(response: &str) -> Result<Option<Vec<String>>, serde_json::Error> {
    match json_array_pattern().find(response) {
        Some(m) => serde_json::from_str(m.as_str()).map(Some),
        None => Ok(None),
    }
}

impl LlmBackend for LocalClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn segment<'a>(&'a self, raw_text: &'a str) -> BoxFuture<'a, AppResult<Vec<String>>> {
        Box::pin(async move {
            let prompt = prompts::segment_prompt(raw_text);
            let response = self
                .generate(&prompt, SEGMENT_TEMPERATURE)
                .await
                .map_err(|e| AppError::segmentation_failed(PROVIDER, e))?;

            match extract_json_array(&response) {
                Ok(Some(questions)) => Ok(questions),
                Ok(None) => {
                    warn!("⚠️ 无法从 Ollama 响应中提取 JSON 数组");
                    Ok(Vec::new())
                }
                Err(e) => Err(AppError::segmentation_failed(PROVIDER, e)),
            }
        })
    }

    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> BoxFuture<'a, AppResult<String>> {
        Box::pin(async move {
            let prompt = prompts::answer_prompt(question, context, LOCAL_CONTEXT_LIMIT);

            match self.generate(&prompt, ANSWER_TEMPERATURE).await {
                Ok(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
                Ok(_) => Ok(NO_ANSWER_PLACEHOLDER.to_string()),
                Err(e) => {
                    warn!("Ollama 解题失败，使用占位答案: {}", e);
                    Ok(ANSWER_ERROR_PLACEHOLDER.to_string())
                }
            }
        })
    }

    fn probe(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.check_status())
    }
}
