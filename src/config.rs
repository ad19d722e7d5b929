use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::models::{Language, TranslationMode};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 后端 API 根地址
    pub api_base_url: String,
    /// 本地持久化存储文件（试用次数、凭证）
    pub store_path: String,
    /// 登录用户上传文件大小上限（字节）
    pub max_upload_bytes: u64,
    /// 免费试用上传文件大小上限（字节）
    pub trial_max_upload_bytes: u64,
    /// 容量受限时，错误提示与示例摘要之间的间隔（毫秒）
    pub fallback_delay_ms: u64,
    /// 请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 默认摘要语言
    pub default_language: Language,
    /// 默认翻译模式
    pub translation_mode: TranslationMode,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            store_path: ".summary_session_store.json".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            trial_max_upload_bytes: 10 * 1024 * 1024,
            fallback_delay_ms: 1500,
            request_timeout_secs: 60,
            default_language: Language::English,
            translation_mode: TranslationMode::Remote,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值 → `SUMMARY_CONFIG` 指向的 TOML 文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let base = match std::env::var("SUMMARY_CONFIG") {
            Ok(path) => Self::from_toml_file(&path)?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 只从环境变量读取（未设置的项使用默认值）
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取，缺失字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Ok(toml::from_str(content)?)
    }

    fn with_env_overrides(self) -> Self {
        Self {
            api_base_url: std::env::var("API_BASE_URL").unwrap_or(self.api_base_url),
            store_path: std::env::var("STORE_PATH").unwrap_or(self.store_path),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_upload_bytes),
            trial_max_upload_bytes: std::env::var("TRIAL_MAX_UPLOAD_BYTES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.trial_max_upload_bytes),
            fallback_delay_ms: std::env::var("FALLBACK_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.fallback_delay_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            default_language: std::env::var("DEFAULT_LANGUAGE").ok().and_then(|v| Language::parse(&v)).unwrap_or(self.default_language),
            translation_mode: std::env::var("TRANSLATION_MODE").ok().and_then(|v| TranslationMode::parse(&v)).unwrap_or(self.translation_mode),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    pub fn fallback_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.fallback_delay_ms)
    }
}
