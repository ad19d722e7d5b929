//! 摘要数据模型

use serde::{Deserialize, Deserializer, Serialize};

use super::language::Language;

/// 结构化摘要
///
/// 同一次分析中会同时存在两份：原文（创建后不再修改）和当前显示的版本（可能是译文）。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    #[serde(default)]
    pub document_overview: String,
    #[serde(default)]
    pub key_parties: Vec<String>,
    #[serde(default)]
    pub important_clauses: Vec<String>,
    #[serde(default)]
    pub critical_dates: Vec<String>,
    #[serde(default)]
    pub potential_concerns: Vec<String>,
    #[serde(default)]
    pub plain_language_summary: String,
    #[serde(default, deserialize_with = "lenient_language")]
    pub language: Language,
}

/// 摘要中的字段标识，列表字段带下标（从 0 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    DocumentOverview,
    KeyParty(usize),
    ImportantClause(usize),
    CriticalDate(usize),
    PotentialConcern(usize),
    PlainLanguageSummary,
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldId::DocumentOverview => write!(f, "Document Overview"),
            FieldId::KeyParty(i) => write!(f, "Key Party {}", i + 1),
            FieldId::ImportantClause(i) => write!(f, "Important Clause {}", i + 1),
            FieldId::CriticalDate(i) => write!(f, "Critical Date {}", i + 1),
            FieldId::PotentialConcern(i) => write!(f, "Potential Concern {}", i + 1),
            FieldId::PlainLanguageSummary => write!(f, "Plain Language Summary"),
        }
    }
}

impl SummaryRecord {
    /// 按固定顺序列出所有文本字段
    pub fn fields(&self) -> Vec<(FieldId, &str)> {
        let mut out = Vec::with_capacity(2 + self.list_len());
        out.push((FieldId::DocumentOverview, self.document_overview.as_str()));
        out.extend(self.key_parties.iter().enumerate().map(|(i, s)| (FieldId::KeyParty(i), s.as_str())));
        out.extend(self.important_clauses.iter().enumerate().map(|(i, s)| (FieldId::ImportantClause(i), s.as_str())));
        out.extend(self.critical_dates.iter().enumerate().map(|(i, s)| (FieldId::CriticalDate(i), s.as_str())));
        out.extend(self.potential_concerns.iter().enumerate().map(|(i, s)| (FieldId::PotentialConcern(i), s.as_str())));
        out.push((FieldId::PlainLanguageSummary, self.plain_language_summary.as_str()));
        out
    }

    /// 用 `fields()` 同样顺序的文本重建摘要
    ///
    /// `texts` 的数量必须与 `fields()` 一致，否则返回 `None`。
    pub fn rebuild(&self, texts: Vec<String>, language: Language) -> Option<SummaryRecord> {
        if texts.len() != 2 + self.list_len() {
            return None;
        }
        let mut iter = texts.into_iter();
        let mut take = |n: usize| -> Vec<String> { iter.by_ref().take(n).collect() };

        let document_overview = take(1).pop()?;
        let key_parties = take(self.key_parties.len());
        let important_clauses = take(self.important_clauses.len());
        let critical_dates = take(self.critical_dates.len());
        let potential_concerns = take(self.potential_concerns.len());
        let plain_language_summary = take(1).pop()?;

        Some(SummaryRecord {
            document_overview,
            key_parties,
            important_clauses,
            critical_dates,
            potential_concerns,
            plain_language_summary,
            language,
        })
    }

    /// 对每个字段做同一种变换
    pub fn map_fields<F>(&self, language: Language, mut f: F) -> SummaryRecord
    where
        F: FnMut(&str) -> String,
    {
        SummaryRecord {
            document_overview: f(&self.document_overview),
            key_parties: self.key_parties.iter().map(|s| f(s)).collect(),
            important_clauses: self.important_clauses.iter().map(|s| f(s)).collect(),
            critical_dates: self.critical_dates.iter().map(|s| f(s)).collect(),
            potential_concerns: self.potential_concerns.iter().map(|s| f(s)).collect(),
            plain_language_summary: f(&self.plain_language_summary),
            language,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, text)| text.trim().is_empty())
    }

    /// 后端在模型不熟悉文档类型时会返回通用的示例内容
    pub fn looks_like_placeholder(&self) -> bool {
        self.fields().iter().any(|(_, text)| {
            text.contains("sample key point") || text.contains("This is a sample")
        })
    }

    fn list_len(&self) -> usize {
        self.key_parties.len()
            + self.important_clauses.len()
            + self.critical_dates.len()
            + self.potential_concerns.len()
    }
}

/// 旧版免费试用接口返回的格式：`{ keyPoints: [...], summary: "..." }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyKeyPointsRecord {
    pub key_points: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_language")]
    pub language: Language,
}

impl From<LegacyKeyPointsRecord> for SummaryRecord {
    fn from(legacy: LegacyKeyPointsRecord) -> Self {
        SummaryRecord {
            document_overview: legacy.summary.clone(),
            important_clauses: legacy.key_points,
            plain_language_summary: legacy.summary,
            language: legacy.language,
            ..Default::default()
        }
    }
}

/// 接口返回的摘要，兼容新旧两种格式
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireSummary {
    Legacy(LegacyKeyPointsRecord),
    Structured(SummaryRecord),
}

impl WireSummary {
    pub fn into_record(self) -> SummaryRecord {
        match self {
            WireSummary::Legacy(legacy) => legacy.into(),
            WireSummary::Structured(record) => record,
        }
    }
}

/// 未知的语言标记按英文处理
fn lenient_language<'de, D>(deserializer: D) -> Result<Language, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Language::parse).unwrap_or_default())
}
