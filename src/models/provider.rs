use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// 模型提供方
///
/// 作为显式参数传给每一次 LLM 调用，不做全局状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// 云端 API
    #[default]
    Cloud,
    /// 本地 Ollama
    Local,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Cloud => "cloud",
            Provider::Local => "local",
        }
    }

    /// 给用户看的描述
    pub fn describe(self) -> &'static str {
        match self {
            Provider::Cloud => "Cloud API (Gemini)",
            Provider::Local => "Ollama (Local)",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloud" | "gemini" => Ok(Provider::Cloud),
            "local" | "ollama" => Ok(Provider::Local),
            other => Err(ConfigError::InvalidProvider {
                value: other.to_string(),
            }),
        }
    }
}
