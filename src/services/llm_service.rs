//! LLM 服务 - 业务能力层
//!
//! 只负责"切分题目"和"回答题目"两个能力，按调用方传入的 [`Provider`] 分发到对应后端。
//! 提供方是显式参数，不是全局开关，所以每次调用都是独立可测的。

use tracing::debug;

use crate::clients::{CloudClient, LlmBackend, LocalClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::Provider;

/// LLM 服务
pub struct LlmService {
    cloud: Box<dyn LlmBackend>,
    local: Box<dyn LlmBackend>,
}

impl LlmService {
    /// 按配置创建云端和本地两个后端
    pub fn new(config: &Config) -> Self {
        Self::with_backends(CloudClient::new(config), LocalClient::new(config))
    }

    /// 使用自定义后端（测试或替换实现时使用）
    pub fn with_backends(
        cloud: impl LlmBackend + 'static,
        local: impl LlmBackend + 'static,
    ) -> Self {
        Self {
            cloud: Box::new(cloud),
            local: Box::new(local),
        }
    }

    fn backend(&self, provider: Provider) -> &dyn LlmBackend {
        match provider {
            Provider::Cloud => self.cloud.as_ref(),
            Provider::Local => self.local.as_ref(),
        }
    }

    /// 切分题库文本
    pub async fn segment(&self, provider: Provider, raw_text: &str) -> AppResult<Vec<String>> {
        let backend = self.backend(provider);
        debug!("切分题目，后端: {}，原文 {} 字符", backend.name(), raw_text.chars().count());
        backend.segment(raw_text).await
    }

    /// 回答单道题目
    pub async fn answer(
        &self,
        provider: Provider,
        question: &str,
        context: &str,
    ) -> AppResult<String> {
        let backend = self.backend(provider);
        debug!("解题，后端: {}", backend.name());
        backend.answer(question, context).await
    }

    /// 存活探测
    pub async fn probe(&self, provider: Provider) -> bool {
        self.backend(provider).probe().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;

    /// 固定返回自己名字的假后端
    struct Named(&'static str);

    impl LlmBackend for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn segment<'a>(&'a self, _raw_text: &'a str) -> BoxFuture<'a, AppResult<Vec<String>>> {
            Box::pin(async move { Ok(vec![self.0.to_string()]) })
        }

        fn answer<'a>(
            &'a self,
            question: &'a str,
            _context: &'a str,
        ) -> BoxFuture<'a, AppResult<String>> {
            Box::pin(async move { Ok(format!("{}:{}", self.0, question)) })
        }

        fn probe(&self) -> BoxFuture<'_, bool> {
            let up = self.0 == "cloud";
            Box::pin(async move { up })
        }
    }

    #[tokio::test]
    async fn dispatches_on_explicit_provider() {
        let service = LlmService::with_backends(Named("cloud"), Named("local"));

        assert_eq!(service.segment(Provider::Cloud, "x").await.unwrap(), vec!["cloud"]);
        assert_eq!(service.segment(Provider::Local, "x").await.unwrap(), vec!["local"]);
        assert_eq!(service.answer(Provider::Local, "Q", "ctx").await.unwrap(), "local:Q");
        assert!(service.probe(Provider::Cloud).await);
        assert!(!service.probe(Provider::Local).await);
    }
}
