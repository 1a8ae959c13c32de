//! 云端 LLM 客户端
//!
//! 使用 `async-openai` 调用兼容 OpenAI 协议的服务，默认指向 Gemini 的兼容端点。
//! API Key 在每次调用时解析：配置里的显式值优先，其次读环境变量。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
    Client,
};
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::{debug, warn};

use super::prompts::{self, CLOUD_CONTEXT_LIMIT};
use super::{LlmBackend, ANSWER_ERROR_PLACEHOLDER, NO_ANSWER_PLACEHOLDER};
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};

const PROVIDER: &str = "cloud";

/// 云端 LLM 客户端
#[derive(Debug, Clone)]
pub struct CloudClient {
    api_key: Option<String>,
    api_key_env: String,
    api_base_url: String,
    model_name: String,
}

impl CloudClient {
    /// 创建新的云端客户端
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.cloud_api_key.clone(),
            api_key_env: config.cloud_api_key_env.clone(),
            api_base_url: config.cloud_api_base_url.clone(),
            model_name: config.cloud_model_name.clone(),
        }
    }

    /// 解析当前可用的 API Key
    fn resolve_api_key(&self) -> AppResult<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::ApiKeyNotSet.into())
    }

    /// 构建 OpenAI 客户端，缺少 Key 时在发请求前直接失败
    ///
    /// 关闭 async-openai 默认的指数退避：5xx / 429 只请求一次，失败直接交给调用方。
    fn client(&self) -> AppResult<Client<OpenAIConfig>> {
        let api_key = self.resolve_api_key()?;
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&self.api_base_url);
        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };
        Ok(Client::with_config(openai_config).with_backoff(no_retry))
    }

    /// 发送单条用户消息，返回去掉首尾空白的文本（可能为空）
    async fn complete(
        &self,
        client: &Client<OpenAIConfig>,
        prompt: &str,
        response_format: Option<ResponseFormat>,
    ) -> AppResult<String> {
        debug!("调用云端 LLM，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| AppError::request_failed(PROVIDER, e.to_string()))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)]);
        if let Some(format) = response_format {
            builder.response_format(format);
        }
        let request = builder
            .build()
            .map_err(|e| AppError::request_failed(PROVIDER, e.to_string()))?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("云端 LLM 调用失败: {}", e);
            AppError::request_failed(PROVIDER, e.to_string())
        })?;

        debug!("云端 LLM 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

/// 切分结果的结构化输出约束：字符串数组
fn questions_schema() -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            description: Some("Ordered list of the questions found in the document".to_string()),
            name: "questions".to_string(),
            schema: Some(serde_json::json!({
                "type": "array",
                "items": { "type": "string" }
            })),
            strict: None,
        },
    }
}

/// 解析结构化输出；空响应视为没有题目
fn parse_segments(content: &str) -> Result<Vec<String>, serde_json::Error> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(content)
}

impl LlmBackend for CloudClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn segment<'a>(&'a self, raw_text: &'a str) -> BoxFuture<'a, AppResult<Vec<String>>> {
        Box::pin(async move {
            let client = self.client()?;
            let prompt = prompts::segment_prompt(raw_text);

            let content = self
                .complete(&client, &prompt, Some(questions_schema()))
                .await
                .map_err(|e| AppError::segmentation_failed(PROVIDER, e))?;

            parse_segments(&content).map_err(|e| {
                warn!("无法解析切分结果: {}", e);
                AppError::segmentation_failed(PROVIDER, e)
            })
        })
    }

    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> BoxFuture<'a, AppResult<String>> {
        Box::pin(async move {
            let client = self.client()?;
            let prompt = prompts::answer_prompt(question, context, CLOUD_CONTEXT_LIMIT);

            match self.complete(&client, &prompt, None).await {
                Ok(text) if !text.is_empty() => Ok(text),
                Ok(_) => Ok(NO_ANSWER_PLACEHOLDER.to_string()),
                Err(e) => {
                    warn!("云端解题失败，使用占位答案: {}", e);
                    Ok(ANSWER_ERROR_PLACEHOLDER.to_string())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// 指向一个从不设置的环境变量，保证测试不依赖本机配置
    fn test_config(base_url: &str, api_key: Option<&str>) -> Config {
        Config {
            cloud_api_key: api_key.map(str::to_string),
            cloud_api_key_env: "AUTO_SOLVER_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            cloud_api_base_url: base_url.to_string(),
            ..Config::default()
        }
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gemini-2.5-flash",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), None));

        let err = client.segment("1. What is X?").await.unwrap_err();
        assert_eq!(err.to_string(), "API Key not set");

        let err = client.answer("What is X?", "notes").await.unwrap_err();
        assert_eq!(err.to_string(), "API Key not set");
    }

    #[tokio::test]
    async fn blank_key_counts_as_missing() {
        let client = CloudClient::new(&test_config("http://127.0.0.1:9", Some("   ")));
        let err = client.segment("text").await.unwrap_err();
        assert!(err.is_missing_api_key());
    }

    #[tokio::test]
    async fn segment_parses_structured_output() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion_body(r#"["What is X?", "What is Y?"]"#)),
            )
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let questions = client.segment("1. What is X? 2. What is Y?").await.unwrap();
        assert_eq!(questions, vec!["What is X?", "What is Y?"]);
    }

    #[tokio::test]
    async fn segment_with_malformed_json_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("[\"broken")))
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let err = client.segment("raw").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze question bank.");
    }

    #[tokio::test]
    async fn answer_falls_back_to_placeholder_on_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {
                    "message": "bad request",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": null
                }
            })))
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let answer = client.answer("What is X?", "notes").await.unwrap();
        assert_eq!(answer, ANSWER_ERROR_PLACEHOLDER);
    }

    fn server_error_body() -> serde_json::Value {
        serde_json::json!({
            "error": {
                "message": "model overloaded",
                "type": "server_error",
                "param": null,
                "code": null
            }
        })
    }

    #[tokio::test]
    async fn server_error_is_not_retried_for_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_json(server_error_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let answer = tokio::time::timeout(
            Duration::from_secs(5),
            client.answer("What is X?", "notes"),
        )
        .await
        .expect("503 应立即返回，不应重试")
        .unwrap();
        assert_eq!(answer, ANSWER_ERROR_PLACEHOLDER);
    }

    #[tokio::test]
    async fn rate_limit_is_not_retried_for_segment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "slow down",
                    "type": "rate_limit_error",
                    "param": null,
                    "code": null
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let err = tokio::time::timeout(Duration::from_secs(5), client.segment("raw"))
            .await
            .expect("429 应立即返回，不应重试")
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze question bank.");
    }

    #[tokio::test]
    async fn empty_answer_becomes_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("   ")))
            .mount(&server)
            .await;

        let client = CloudClient::new(&test_config(&server.uri(), Some("test-key")));
        let answer = client.answer("What is X?", "notes").await.unwrap();
        assert_eq!(answer, NO_ANSWER_PLACEHOLDER);
    }

    #[test]
    fn empty_structured_output_means_no_questions() {
        assert!(parse_segments("").unwrap().is_empty());
        assert!(parse_segments("{}").is_err());
    }

    /// 真实 API 测试
    ///
    /// 运行方式：
    /// ```bash
    /// API_KEY=... cargo test cloud_client::tests::live_segment -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn live_segment() {
        let _ = tracing_subscriber::fmt::try_init();

        let client = CloudClient::new(&Config::from_env());
        let questions = client
            .segment("Chapter 1 Quiz\n1. What is photosynthesis?\n2. Name two noble gases.")
            .await
            .unwrap();
        println!("{:#?}", questions);
        assert_eq!(questions.len(), 2);
    }
}
