//! 翻译级联 - 业务能力层
//!
//! 把一份结构化摘要翻译成印地语。按优先级依次尝试：
//! 1. 远程整体翻译（一次请求，结构化返回）
//! 2. 远程逐字段翻译（每个字段一次请求，保持列表顺序）
//! 3. 本地词典（一定可用，但不完整）
//!
//! 第一个成功的层级胜出。结果再扫描一遍残留的英文，残留只会产生提示，不算错误。

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::clients::SummaryBackend;
use crate::error::{AppError, AppResult, RemoteFailure};
use crate::models::{FieldId, Language, SummaryRecord, TranslationMode, TranslationTier};
use crate::services::dictionary;

/// 级联中的一种翻译策略
#[async_trait]
pub trait TranslationStrategy: Send + Sync {
    fn tier(&self) -> TranslationTier;

    async fn translate(&self, original: &SummaryRecord, target: Language) -> AppResult<SummaryRecord>;
}

/// 级联翻译的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationOutcome {
    pub record: SummaryRecord,
    /// 实际产出结果的层级
    pub tier: TranslationTier,
    /// 仍含连续拉丁字母的字段
    pub residual_latin_fields: Vec<FieldId>,
}

impl TranslationOutcome {
    pub fn is_complete(&self) -> bool {
        self.residual_latin_fields.is_empty()
    }
}

/// 整体翻译时发送/接收的结构（不含语言标记）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchFields {
    document_overview: String,
    key_parties: Vec<String>,
    important_clauses: Vec<String>,
    critical_dates: Vec<String>,
    potential_concerns: Vec<String>,
    plain_language_summary: String,
}

impl BatchFields {
    fn from_record(record: &SummaryRecord) -> Self {
        Self {
            document_overview: record.document_overview.clone(),
            key_parties: record.key_parties.clone(),
            important_clauses: record.important_clauses.clone(),
            critical_dates: record.critical_dates.clone(),
            potential_concerns: record.potential_concerns.clone(),
            plain_language_summary: record.plain_language_summary.clone(),
        }
    }

    fn into_record(self, language: Language) -> SummaryRecord {
        SummaryRecord {
            document_overview: self.document_overview,
            key_parties: self.key_parties,
            important_clauses: self.important_clauses,
            critical_dates: self.critical_dates,
            potential_concerns: self.potential_concerns,
            plain_language_summary: self.plain_language_summary,
            language,
        }
    }
}

/// 模型有时会用 ``` 包裹 JSON
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix("```") {
        Some(rest) => {
            let rest = rest.strip_prefix("json").unwrap_or(rest);
            rest.strip_suffix("```").unwrap_or(rest).trim()
        }
        None => trimmed,
    }
}

/// 校验整体翻译的结果：列表长度一致，原文非空的字段译文也不能为空
fn verify_shape(original: &SummaryRecord, translated: &SummaryRecord) -> AppResult<()> {
    let lengths = |r: &SummaryRecord| {
        (
            r.key_parties.len(),
            r.important_clauses.len(),
            r.critical_dates.len(),
            r.potential_concerns.len(),
        )
    };
    if lengths(original) != lengths(translated) {
        return Err(AppError::parse("译文列表长度与原文不一致"));
    }
    let omitted = original
        .fields()
        .iter()
        .zip(translated.fields().iter())
        .find(|((_, src), (_, dst))| !src.trim().is_empty() && dst.trim().is_empty())
        .map(|((id, _), _)| *id);
    match omitted {
        Some(id) => Err(AppError::parse(format!("译文缺少字段: {}", id))),
        None => Ok(()),
    }
}

// ========== 第 1 层：远程整体翻译 ==========

/// 把所有字段序列化成一段 JSON，通过 `/translate/term` 一次翻译
pub struct TermBatchStrategy {
    backend: Arc<dyn SummaryBackend>,
}

impl TermBatchStrategy {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl TranslationStrategy for TermBatchStrategy {
    fn tier(&self) -> TranslationTier {
        TranslationTier::RemoteBatch
    }

    async fn translate(&self, original: &SummaryRecord, target: Language) -> AppResult<SummaryRecord> {
        let payload = serde_json::to_string(&BatchFields::from_record(original))?;
        let response = self.backend.translate_term(&payload).await?;

        let fields: BatchFields = serde_json::from_str(strip_code_fence(&response))
            .map_err(|e| AppError::parse(format!("整体翻译返回无法解析: {}", e)))?;
        let translated = fields.into_record(target);
        verify_shape(original, &translated)?;
        Ok(translated)
    }
}

/// 登录用户已保存的文档：由服务端翻译整份摘要
pub struct DocumentBatchStrategy {
    backend: Arc<dyn SummaryBackend>,
    document_id: String,
}

impl DocumentBatchStrategy {
    pub fn new(backend: Arc<dyn SummaryBackend>, document_id: impl Into<String>) -> Self {
        Self {
            backend,
            document_id: document_id.into(),
        }
    }
}

#[async_trait]
impl TranslationStrategy for DocumentBatchStrategy {
    fn tier(&self) -> TranslationTier {
        TranslationTier::RemoteBatch
    }

    async fn translate(&self, original: &SummaryRecord, target: Language) -> AppResult<SummaryRecord> {
        let mut translated = self.backend.translate_document(&self.document_id, true).await?;
        translated.language = target;
        verify_shape(original, &translated)?;
        Ok(translated)
    }
}

// ========== 第 2 层：远程逐字段翻译 ==========

/// 每个字段单独请求
///
/// 单个字段失败时该字段改用词典；所有字段都失败说明远程不可用，交给下一层。
pub struct PerFieldStrategy {
    backend: Arc<dyn SummaryBackend>,
}

impl PerFieldStrategy {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self { backend }
    }

    async fn translate_field(&self, text: &str) -> Option<Result<String, RemoteFailure>> {
        if text.trim().is_empty() {
            return None;
        }
        Some(self.backend.translate_term(text).await)
    }
}

#[async_trait]
impl TranslationStrategy for PerFieldStrategy {
    fn tier(&self) -> TranslationTier {
        TranslationTier::RemotePerField
    }

    async fn translate(&self, original: &SummaryRecord, target: Language) -> AppResult<SummaryRecord> {
        let fields = original.fields();
        let results = join_all(fields.iter().map(|(_, text)| self.translate_field(text))).await;

        let attempted = results.iter().filter(|r| r.is_some()).count();
        let mut failed = 0;
        let mut last_failure = None;
        let mut texts = Vec::with_capacity(fields.len());

        for ((id, text), result) in fields.iter().zip(results) {
            match result {
                None => texts.push(text.to_string()),
                Some(Ok(translated)) if !translated.trim().is_empty() => texts.push(translated),
                Some(Ok(_)) => {
                    debug!("字段 {} 远程返回空译文，改用词典", id);
                    failed += 1;
                    last_failure = Some(RemoteFailure::envelope("/translate/term", "empty translation"));
                    texts.push(dictionary::translate_text(text)?);
                }
                Some(Err(failure)) => {
                    debug!("字段 {} 远程翻译失败，改用词典: {}", id, failure);
                    failed += 1;
                    last_failure = Some(failure);
                    texts.push(dictionary::translate_text(text)?);
                }
            }
        }

        if let Some(failure) = last_failure {
            if failed == attempted {
                return Err(failure.into());
            }
        }

        original
            .rebuild(texts, target)
            .ok_or_else(|| AppError::parse("逐字段翻译结果数量不一致"))
    }
}

// ========== 第 3 层：本地词典 ==========

pub struct DictionaryStrategy;

#[async_trait]
impl TranslationStrategy for DictionaryStrategy {
    fn tier(&self) -> TranslationTier {
        TranslationTier::LocalDictionary
    }

    async fn translate(&self, original: &SummaryRecord, target: Language) -> AppResult<SummaryRecord> {
        let texts = original
            .fields()
            .iter()
            .map(|(_, text)| dictionary::translate_text(text))
            .collect::<AppResult<Vec<_>>>()?;
        original
            .rebuild(texts, target)
            .ok_or_else(|| AppError::parse("词典翻译结果数量不一致"))
    }
}

// ========== 级联 ==========

/// 依次执行策略，第一个成功的结果胜出
pub async fn first_success(
    strategies: &[Box<dyn TranslationStrategy>],
    original: &SummaryRecord,
    target: Language,
) -> AppResult<(TranslationTier, SummaryRecord)> {
    let mut last_error = AppError::Config("没有可用的翻译策略".to_string());

    for strategy in strategies {
        match strategy.translate(original, target).await {
            Ok(record) => return Ok((strategy.tier(), record)),
            Err(e) => {
                warn!("翻译层级 {} 失败，尝试下一层: {}", strategy.tier(), e);
                last_error = e;
            }
        }
    }

    Err(AppError::AllTiersFailed {
        last: Box::new(last_error),
    })
}

/// 翻译级联
pub struct TranslationCascade {
    backend: Arc<dyn SummaryBackend>,
}

impl TranslationCascade {
    pub fn new(backend: Arc<dyn SummaryBackend>) -> Self {
        Self { backend }
    }

    /// 按模式构造有序的策略列表
    ///
    /// 远程模式从整体翻译开始；有文档 id 时整体翻译由服务端完成。
    pub fn strategies(&self, mode: TranslationMode, document_id: Option<&str>) -> Vec<Box<dyn TranslationStrategy>> {
        let mut strategies: Vec<Box<dyn TranslationStrategy>> = Vec::new();
        if mode == TranslationMode::Remote {
            match document_id {
                Some(id) => strategies.push(Box::new(DocumentBatchStrategy::new(self.backend.clone(), id))),
                None => strategies.push(Box::new(TermBatchStrategy::new(self.backend.clone()))),
            }
            strategies.push(Box::new(PerFieldStrategy::new(self.backend.clone())));
        }
        strategies.push(Box::new(DictionaryStrategy));
        strategies
    }

    /// 把英文原文翻译成目标语言
    pub async fn translate(
        &self,
        original: &SummaryRecord,
        target: Language,
        mode: TranslationMode,
        document_id: Option<&str>,
    ) -> AppResult<TranslationOutcome> {
        if original.language != Language::English || target != Language::Hindi {
            return Err(AppError::UnsupportedLanguage {
                from: original.language.to_string(),
                to: target.to_string(),
            });
        }

        let strategies = self.strategies(mode, document_id);
        let (tier, record) = first_success(&strategies, original, target).await?;
        let residual_latin_fields = dictionary::residual_latin_fields(&record);

        if residual_latin_fields.is_empty() {
            info!("✓ 翻译完成 (层级: {})", tier);
        } else {
            warn!(
                "翻译完成 (层级: {})，{} 个字段仍含英文: {:?}",
                tier,
                residual_latin_fields.len(),
                residual_latin_fields.iter().map(|f| f.to_string()).collect::<Vec<_>>()
            );
        }

        Ok(TranslationOutcome {
            record,
            tier,
            residual_latin_fields,
        })
    }
}
