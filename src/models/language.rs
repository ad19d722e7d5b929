//! 语言与翻译模式

use serde::{Deserialize, Serialize};

/// 摘要语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hindi,
}

impl Language {
    /// 后端查询参数使用的名称
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "hindi" | "hi" => Some(Language::Hindi),
            _ => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 翻译模式（用户可切换）
///
/// 切换模式会让已缓存的译文失效。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// 远程 AI 翻译，失败时逐级降级
    #[default]
    Remote,
    /// 只使用本地词典
    Dictionary,
}

impl TranslationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "ai" => Some(TranslationMode::Remote),
            "dictionary" | "local" => Some(TranslationMode::Dictionary),
            _ => None,
        }
    }
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationMode::Remote => f.write_str("AI"),
            TranslationMode::Dictionary => f.write_str("Dictionary"),
        }
    }
}

/// 翻译级联中的一层，按优先级排序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TranslationTier {
    RemoteBatch,
    RemotePerField,
    LocalDictionary,
}

impl std::fmt::Display for TranslationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TranslationTier::RemoteBatch => "remote-batch",
            TranslationTier::RemotePerField => "remote-per-field",
            TranslationTier::LocalDictionary => "local-dictionary",
        };
        f.write_str(name)
    }
}
