//! 分析会话 - 流程层
//!
//! 核心职责：执行状态机要求的副作用，把结果作为事件送回状态机
//!
//! 流程顺序：
//! 1. 用户动作 → `reduce` → `Effect`
//! 2. `IssueAnalyze` → 远程分析 →（匿名成功时先消耗试用次数）→ 结果事件
//! 3. 容量受限（匿名）→ 立即提示错误 → 延迟 → 示例摘要
//! 4. `RunTranslation` → 翻译级联 → 结果事件

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::clients::SummaryBackend;
use crate::config::Config;
use crate::error::{AppError, ErrorInfo, ErrorKind, ValidationError};
use crate::models::{Language, SelectedDocument, TranslationMode};
use crate::services::failure_classifier::{self, AUTH_MESSAGE};
use crate::services::sample_summary::sample_summary;
use crate::services::{CredentialStore, Notice, Notifier, TranslationCascade, TrialQuota};
use crate::utils::logging::truncate_text;
use crate::workflow::attempt::{
    reduce, AnalysisAttempt, AttemptEvent, AttemptStatus, Effect, SessionVariant, Transition,
};

pub const REGISTRATION_MESSAGE: &str =
    "You have used all your free trials. Register now for unlimited document analysis.";
pub const READY_MESSAGE: &str = "Ready for a new document";
pub const SAMPLE_NOTICE: &str =
    "Showing sample data while the AI service is busy. Register for full access with higher limits.";
pub const QUOTA_WRITE_WARNING: &str =
    "Could not record this free trial. The remaining count shown may be out of date.";
pub const PLACEHOLDER_WARNING: &str =
    "The summary may be generic. The AI could not fully analyze this document type.";

/// 分析会话
///
/// - 每个会话同时最多一个分析尝试
/// - 状态锁只在同步代码中持有，绝不跨越 await
/// - 只依赖业务能力（services）与远程接口（clients）
pub struct AnalysisSession {
    config: Config,
    backend: Arc<dyn SummaryBackend>,
    credentials: Arc<CredentialStore>,
    quota: TrialQuota,
    cascade: TranslationCascade,
    notifier: Arc<dyn Notifier>,
    state: Mutex<AnalysisAttempt>,
}

impl AnalysisSession {
    /// 创建新的分析会话
    pub fn new(
        config: Config,
        backend: Arc<dyn SummaryBackend>,
        credentials: Arc<CredentialStore>,
        quota: TrialQuota,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let variant = variant_of(&credentials);
        let attempt = AnalysisAttempt::new(
            1,
            variant,
            upload_limit(&config, variant),
            config.translation_mode,
        );
        Self {
            cascade: TranslationCascade::new(backend.clone()),
            config,
            backend,
            credentials,
            quota,
            notifier,
            state: Mutex::new(attempt),
        }
    }

    /// 当前状态的快照
    pub fn snapshot(&self) -> AnalysisAttempt {
        self.lock().clone()
    }

    pub fn remaining_trials(&self) -> u32 {
        self.quota.remaining()
    }

    /// 选择文档（本地校验，不访问远程）
    pub fn select_document(&self, document: SelectedDocument) -> AnalysisAttempt {
        let name = document.file_name.clone();
        let transition = self.dispatch(AttemptEvent::Select(document));
        match &transition.effect {
            Effect::None => info!("[尝试 #{}] 📄 已选择文档: {}", transition.next.id, name),
            Effect::ShowError(e) => self.notify_error(e),
            _ => {}
        }
        transition.next
    }

    /// 提交分析
    pub async fn submit(&self) -> AnalysisAttempt {
        let transition = self.dispatch(AttemptEvent::Submit {
            remaining_trials: self.quota.remaining(),
        });
        self.drive(transition.effect).await;
        self.snapshot()
    }

    /// 登录用户重新生成摘要
    pub async fn regenerate(&self) -> AnalysisAttempt {
        let transition = self.dispatch(AttemptEvent::Regenerate);
        if transition.is_ignored() {
            debug!("[尝试 #{}] 当前状态不能重新生成", transition.next.id);
        }
        self.drive(transition.effect).await;
        self.snapshot()
    }

    /// 打开已保存的文档（仅登录用户）
    pub async fn open_document(&self, document_id: &str) -> AnalysisAttempt {
        let reset = self.reset_attempt();
        let attempt_id = reset.next.id;

        if reset.next.variant != SessionVariant::Authenticated {
            let error = ErrorInfo::new(ErrorKind::Auth, AUTH_MESSAGE);
            let transition = self.dispatch(AttemptEvent::DocumentOpenFailed { attempt_id, error });
            self.drive(transition.effect).await;
            return self.snapshot();
        }

        info!("[尝试 #{}] 📂 打开文档: {}", attempt_id, document_id);
        let event = match self.backend.fetch_document(document_id).await {
            Ok(document) => {
                info!(
                    "[尝试 #{}] ✓ 文档已加载: {}",
                    attempt_id,
                    document.original_name.as_deref().unwrap_or(&document.id)
                );
                AttemptEvent::DocumentOpened {
                    attempt_id,
                    summary: document.summary(),
                    document_id: document.id,
                }
            }
            Err(failure) => {
                let error = self.classify(&AppError::Remote(failure));
                AttemptEvent::DocumentOpenFailed { attempt_id, error }
            }
        };
        let transition = self.dispatch(event);
        self.drive(transition.effect).await;
        self.snapshot()
    }

    /// 在原文与译文之间切换
    pub async fn toggle_language(&self) -> AnalysisAttempt {
        let transition = self.dispatch(AttemptEvent::ToggleLanguage);
        if transition.is_ignored() {
            debug!("[尝试 #{}] 当前状态不能切换语言", transition.next.id);
        }
        self.drive(transition.effect).await;
        self.snapshot()
    }

    /// 切换翻译模式，已缓存的译文失效
    pub fn set_translation_mode(&self, mode: TranslationMode) -> AnalysisAttempt {
        let before = self.snapshot().translation.mode;
        let transition = self.dispatch(AttemptEvent::SetTranslationMode(mode));
        if transition.is_ignored() {
            debug!("翻译进行中，忽略模式切换");
        } else if before != mode {
            self.notifier
                .notify(Notice::info(format!("Translation mode: {}", mode)));
        }
        transition.next
    }

    /// 开始新的文档；进行中的请求结果会被丢弃
    pub fn reset(&self) -> AnalysisAttempt {
        let transition = self.reset_attempt();
        self.notifier.notify(Notice::info(READY_MESSAGE));
        transition.next
    }

    // ========== 副作用执行 ==========

    async fn drive(&self, mut effect: Effect) {
        loop {
            effect = match effect {
                Effect::None | Effect::Ignored => return,
                Effect::ShowError(error) => {
                    self.notify_error(&error);
                    return;
                }
                Effect::PromptRegistration => {
                    info!("试用次数已用完，引导注册");
                    self.notifier.notify(Notice::warning(REGISTRATION_MESSAGE));
                    return;
                }
                Effect::IssueAnalyze { attempt_id } => self.analyze(attempt_id).await,
                Effect::ScheduleFallback {
                    attempt_id,
                    submission,
                    error,
                } => self.fallback(attempt_id, submission, &error).await,
                Effect::RunTranslation {
                    attempt_id,
                    mode,
                    target,
                } => self.translate(attempt_id, mode, target).await,
            };
        }
    }

    /// 发起一次远程分析，返回结果事件产生的副作用
    async fn analyze(&self, attempt_id: u64) -> Effect {
        let attempt = self.snapshot();
        info!("[尝试 #{}] 📤 正在提交分析...", attempt_id);

        let event = match attempt.variant {
            SessionVariant::Anonymous => self.analyze_anonymous(&attempt).await,
            SessionVariant::Authenticated => self.analyze_authenticated(&attempt).await,
        };

        let transition = self.dispatch(event);
        if transition.is_ignored() {
            debug!("[尝试 #{}] 结果已过期，丢弃", attempt_id);
            return Effect::None;
        }
        if transition.next.status == AttemptStatus::Result {
            self.notify_success(&transition.next);
        }
        transition.effect
    }

    async fn analyze_anonymous(&self, attempt: &AnalysisAttempt) -> AttemptEvent {
        let attempt_id = attempt.id;
        let Some(document) = &attempt.selected_document else {
            return self.failed(attempt_id, AppError::Validation(ValidationError::NoDocument), None);
        };

        match self
            .backend
            .analyze_anonymous(document, self.config.default_language)
            .await
        {
            Ok(record) => {
                // 先记次数，再更新界面
                match self.quota.consume() {
                    Ok(left) => debug!("[尝试 #{}] 剩余试用次数: {}", attempt_id, left),
                    Err(e) => {
                        warn!("[尝试 #{}] 试用次数写入失败: {}", attempt_id, e);
                        self.notifier.notify(Notice::warning(QUOTA_WRITE_WARNING));
                    }
                }
                AttemptEvent::AnalyzeSucceeded {
                    attempt_id,
                    record,
                    document_id: None,
                }
            }
            Err(failure) => self.failed(attempt_id, failure.into(), None),
        }
    }

    async fn analyze_authenticated(&self, attempt: &AnalysisAttempt) -> AttemptEvent {
        let attempt_id = attempt.id;
        if !self.credentials.is_valid() {
            return self.failed(attempt_id, AppError::Auth(AUTH_MESSAGE.to_string()), None);
        }

        let document_id = match (&attempt.document_id, &attempt.selected_document) {
            (Some(id), _) => id.clone(),
            (None, Some(document)) => match self.backend.upload_document(document).await {
                Ok(record) => {
                    info!("[尝试 #{}] ✓ 上传完成，文档 id: {}", attempt_id, record.id);
                    record.id
                }
                Err(failure) => return self.failed(attempt_id, failure.into(), None),
            },
            (None, None) => {
                return self.failed(attempt_id, AppError::Validation(ValidationError::NoDocument), None)
            }
        };

        match self.backend.summarize_document(&document_id).await {
            Ok(record) => AttemptEvent::AnalyzeSucceeded {
                attempt_id,
                record,
                document_id: Some(document_id),
            },
            Err(failure) => self.failed(attempt_id, failure.into(), Some(document_id)),
        }
    }

    /// 分类失败；认证失败会立即登出
    fn failed(&self, attempt_id: u64, err: AppError, document_id: Option<String>) -> AttemptEvent {
        warn!("[尝试 #{}] ❌ 分析失败: {}", attempt_id, err);
        AttemptEvent::AnalyzeFailed {
            attempt_id,
            error: self.classify(&err),
            document_id,
        }
    }

    fn classify(&self, err: &AppError) -> ErrorInfo {
        let info = failure_classifier::describe(err);
        if info.kind == ErrorKind::Auth {
            if let Err(e) = self.credentials.clear() {
                warn!("清除凭证失败: {}", e);
            }
        }
        info
    }

    /// 容量受限：先提示错误，延迟后显示示例摘要
    async fn fallback(&self, attempt_id: u64, submission: u32, error: &ErrorInfo) -> Effect {
        self.notify_error(error);
        tokio::time::sleep(self.config.fallback_delay()).await;

        let transition = self.dispatch(AttemptEvent::FallbackReady {
            attempt_id,
            submission,
            sample: sample_summary(),
        });
        if transition.is_ignored() {
            debug!("[尝试 #{}] 尝试已变化，不再显示示例摘要", attempt_id);
        } else {
            info!("[尝试 #{}] 显示示例摘要", attempt_id);
            self.notifier.notify(Notice::info(SAMPLE_NOTICE));
        }
        transition.effect
    }

    async fn translate(&self, attempt_id: u64, mode: TranslationMode, target: Language) -> Effect {
        let attempt = self.snapshot();
        let Some(view) = attempt.result.as_ref() else {
            let error = ErrorInfo::new(ErrorKind::Unknown, "Nothing to translate");
            return self.dispatch(AttemptEvent::TranslationFailed { attempt_id, error }).effect;
        };
        let document_id = match attempt.variant {
            SessionVariant::Authenticated => attempt.document_id.as_deref(),
            SessionVariant::Anonymous => None,
        };

        info!("[尝试 #{}] 🌐 开始翻译 ({} 模式)", attempt_id, mode);
        let event = match self
            .cascade
            .translate(&view.original, target, mode, document_id)
            .await
        {
            Ok(outcome) => {
                let transition = self.dispatch(AttemptEvent::TranslationSucceeded {
                    attempt_id,
                    mode,
                    record: outcome.record,
                });
                if transition.is_ignored() {
                    debug!("[尝试 #{}] 译文已过期，丢弃", attempt_id);
                } else if outcome.residual_latin_fields.is_empty() {
                    self.notifier
                        .notify(Notice::success(format!("Translated to {} successfully", target)));
                } else {
                    self.notifier.notify(Notice::warning(format!(
                        "Translation partially complete: {} section(s) still contain English text",
                        outcome.residual_latin_fields.len()
                    )));
                }
                return transition.effect;
            }
            Err(e) => {
                warn!("[尝试 #{}] 翻译失败: {}", attempt_id, e);
                AttemptEvent::TranslationFailed {
                    attempt_id,
                    error: failure_classifier::describe(&e),
                }
            }
        };
        self.dispatch(event).effect
    }

    // ========== 辅助 ==========

    fn dispatch(&self, event: AttemptEvent) -> Transition {
        let mut state = self.lock();
        let transition = reduce(&state, event);
        if state.status != transition.next.status {
            debug!(
                "[尝试 #{}] 状态: {} → {}",
                transition.next.id, state.status, transition.next.status
            );
        }
        *state = transition.next.clone();
        transition
    }

    fn reset_attempt(&self) -> Transition {
        let variant = variant_of(&self.credentials);
        self.dispatch(AttemptEvent::Reset {
            variant,
            upload_limit: upload_limit(&self.config, variant),
        })
    }

    fn notify_success(&self, attempt: &AnalysisAttempt) {
        let Some(record) = attempt.displayed() else {
            return;
        };
        if self.config.verbose_logging {
            debug!(
                "[尝试 #{}] 摘要预览: {}",
                attempt.id,
                truncate_text(&record.document_overview, 80)
            );
        }
        if record.looks_like_placeholder() {
            self.notifier.notify(Notice::warning(PLACEHOLDER_WARNING));
            return;
        }
        let message = match attempt.variant {
            SessionVariant::Anonymous => format!(
                "Document analyzed successfully! {} free trial(s) remaining.",
                self.quota.remaining()
            ),
            SessionVariant::Authenticated => "Document summarized successfully!".to_string(),
        };
        info!("[尝试 #{}] ✓ 分析完成", attempt.id);
        self.notifier.notify(Notice::success(message));
    }

    fn notify_error(&self, error: &ErrorInfo) {
        self.notifier.notify(Notice::error(error.message.clone()));
    }

    fn lock(&self) -> MutexGuard<'_, AnalysisAttempt> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

fn variant_of(credentials: &CredentialStore) -> SessionVariant {
    if credentials.is_valid() {
        SessionVariant::Authenticated
    } else {
        SessionVariant::Anonymous
    }
}

fn upload_limit(config: &Config, variant: SessionVariant) -> u64 {
    match variant {
        SessionVariant::Anonymous => config.trial_max_upload_bytes,
        SessionVariant::Authenticated => config.max_upload_bytes,
    }
}
