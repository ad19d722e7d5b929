//! 分析尝试状态机 - 流程层
//!
//! 一次分析尝试的全部状态收拢在 `AnalysisAttempt` 里，所有状态变化都经过纯函数 `reduce`：
//!
//! ```text
//! Idle ──选择文档──▶ Selecting ──提交──▶ Submitting ──▶ Result | Failed
//!   ▲                                                     │
//!   └──────────────────────── Reset ◀─────────────────────┘
//! ```
//!
//! `reduce` 不做任何 IO，只返回下一个状态和需要执行的副作用（`Effect`），
//! 由 `AnalysisSession` 负责执行副作用并把结果作为新事件送回。

use std::fmt;

use crate::error::{ErrorInfo, ErrorKind, ValidationError};
use crate::models::{Language, SelectedDocument, SummaryRecord, TranslationMode};
use crate::services::failure_classifier::TRIAL_EXHAUSTED_MESSAGE;

/// 会话类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionVariant {
    /// 匿名试用，受试用次数限制
    Anonymous,
    /// 已登录，上传后由服务端保存
    Authenticated,
}

/// 尝试所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptStatus {
    Idle,
    Selecting,
    Submitting,
    Result,
    Failed,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttemptStatus::Idle => "idle",
            AttemptStatus::Selecting => "selecting",
            AttemptStatus::Submitting => "submitting",
            AttemptStatus::Result => "result",
            AttemptStatus::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// 摘要的两份副本
///
/// `original` 在尝试的生命周期内不变，切回原文只是查表。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub original: SummaryRecord,
    pub displayed: SummaryRecord,
    /// 容量受限时生成的示例摘要
    pub is_sample: bool,
}

impl SummaryView {
    fn genuine(record: SummaryRecord) -> Self {
        Self {
            original: record.clone(),
            displayed: record,
            is_sample: false,
        }
    }

    fn sample(record: SummaryRecord) -> Self {
        Self {
            original: record.clone(),
            displayed: record,
            is_sample: true,
        }
    }

    /// 当前显示的是否为译文
    pub fn is_translated(&self) -> bool {
        self.displayed.language != self.original.language
    }
}

/// 翻译相关状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationState {
    pub mode: TranslationMode,
    /// 已缓存的译文，切换模式或重置时失效
    pub cache: Option<SummaryRecord>,
    /// 翻译进行中，期间拒绝再次切换
    pub loading: bool,
}

impl TranslationState {
    fn new(mode: TranslationMode) -> Self {
        Self {
            mode,
            cache: None,
            loading: false,
        }
    }
}

/// 一次分析尝试
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisAttempt {
    /// 每次重置递增，用于丢弃过期的异步结果
    pub id: u64,
    /// 同一尝试内的提交序号，重试与重新生成时递增
    pub submission: u32,
    pub variant: SessionVariant,
    /// 本次尝试允许的最大文件字节数
    pub upload_limit: u64,
    pub status: AttemptStatus,
    pub selected_document: Option<SelectedDocument>,
    /// 登录用户：服务端保存的文档 id
    pub document_id: Option<String>,
    pub result: Option<SummaryView>,
    pub error: Option<ErrorInfo>,
    pub translation: TranslationState,
}

impl AnalysisAttempt {
    pub fn new(id: u64, variant: SessionVariant, upload_limit: u64, mode: TranslationMode) -> Self {
        Self {
            id,
            submission: 0,
            variant,
            upload_limit,
            status: AttemptStatus::Idle,
            selected_document: None,
            document_id: None,
            result: None,
            error: None,
            translation: TranslationState::new(mode),
        }
    }

    /// 当前显示的摘要
    pub fn displayed(&self) -> Option<&SummaryRecord> {
        self.result.as_ref().map(|view| &view.displayed)
    }

    fn can_select(&self) -> bool {
        matches!(
            self.status,
            AttemptStatus::Idle | AttemptStatus::Selecting | AttemptStatus::Failed
        )
    }

    fn has_input(&self) -> bool {
        self.selected_document.is_some() || self.document_id.is_some()
    }
}

/// 送入状态机的事件
#[derive(Debug, Clone)]
pub enum AttemptEvent {
    /// 用户选择了文档
    Select(SelectedDocument),
    /// 用户点击分析；匿名会话需要剩余试用次数
    Submit { remaining_trials: u32 },
    /// 登录用户重新生成摘要
    Regenerate,
    AnalyzeSucceeded {
        attempt_id: u64,
        record: SummaryRecord,
        document_id: Option<String>,
    },
    AnalyzeFailed {
        attempt_id: u64,
        error: ErrorInfo,
        document_id: Option<String>,
    },
    /// 延迟结束，显示示例摘要
    FallbackReady {
        attempt_id: u64,
        submission: u32,
        sample: SummaryRecord,
    },
    /// 登录用户打开已保存的文档
    DocumentOpened {
        attempt_id: u64,
        document_id: String,
        summary: Option<SummaryRecord>,
    },
    DocumentOpenFailed {
        attempt_id: u64,
        error: ErrorInfo,
    },
    /// 在原文与译文之间切换
    ToggleLanguage,
    TranslationSucceeded {
        attempt_id: u64,
        mode: TranslationMode,
        record: SummaryRecord,
    },
    TranslationFailed {
        attempt_id: u64,
        error: ErrorInfo,
    },
    SetTranslationMode(TranslationMode),
    /// 开始新的文档；任何状态都可以重置
    Reset {
        variant: SessionVariant,
        upload_limit: u64,
    },
}

/// 状态机要求执行的副作用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// 事件已接受，无需额外动作
    None,
    /// 事件被忽略（过期结果、重复提交、当前状态不允许）
    Ignored,
    /// 显示错误提示
    ShowError(ErrorInfo),
    /// 试用次数用完，引导注册
    PromptRegistration,
    /// 发起一次远程分析
    IssueAnalyze { attempt_id: u64 },
    /// 先显示错误，延迟后生成示例摘要
    ScheduleFallback {
        attempt_id: u64,
        submission: u32,
        error: ErrorInfo,
    },
    /// 执行翻译级联
    RunTranslation {
        attempt_id: u64,
        mode: TranslationMode,
        target: Language,
    },
}

/// 一次状态转换
#[derive(Debug, Clone)]
pub struct Transition {
    pub next: AnalysisAttempt,
    pub effect: Effect,
}

impl Transition {
    fn to(next: AnalysisAttempt, effect: Effect) -> Self {
        Self { next, effect }
    }

    fn ignored(state: &AnalysisAttempt) -> Self {
        Self::to(state.clone(), Effect::Ignored)
    }

    pub fn is_ignored(&self) -> bool {
        self.effect == Effect::Ignored
    }
}

/// 状态转换函数
///
/// # 参数
/// - `state`: 当前状态
/// - `event`: 事件
///
/// # 返回
/// 下一个状态与需要执行的副作用
pub fn reduce(state: &AnalysisAttempt, event: AttemptEvent) -> Transition {
    match event {
        AttemptEvent::Select(document) => select(state, document),
        AttemptEvent::Submit { remaining_trials } => submit(state, remaining_trials),
        AttemptEvent::Regenerate => regenerate(state),
        AttemptEvent::AnalyzeSucceeded {
            attempt_id,
            record,
            document_id,
        } => {
            if attempt_id != state.id || state.status != AttemptStatus::Submitting {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.status = AttemptStatus::Result;
            next.result = Some(SummaryView::genuine(record));
            next.document_id = document_id.or(next.document_id);
            next.error = None;
            next.translation.cache = None;
            next.translation.loading = false;
            Transition::to(next, Effect::None)
        }
        AttemptEvent::AnalyzeFailed {
            attempt_id,
            error,
            document_id,
        } => {
            if attempt_id != state.id || state.status != AttemptStatus::Submitting {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.status = AttemptStatus::Failed;
            next.document_id = document_id.or(next.document_id);
            // 重新生成失败时保留之前的结果
            next.error = Some(error.clone());
            let effect = if state.variant == SessionVariant::Anonymous
                && error.kind == ErrorKind::CapacityLimited
            {
                Effect::ScheduleFallback {
                    attempt_id,
                    submission: state.submission,
                    error,
                }
            } else {
                Effect::ShowError(error)
            };
            Transition::to(next, effect)
        }
        AttemptEvent::FallbackReady {
            attempt_id,
            submission,
            sample,
        } => {
            let applies = attempt_id == state.id
                && submission == state.submission
                && state.status == AttemptStatus::Failed
                && state.result.is_none()
                && matches!(&state.error, Some(e) if e.kind == ErrorKind::CapacityLimited);
            if !applies {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.result = Some(SummaryView::sample(sample));
            Transition::to(next, Effect::None)
        }
        AttemptEvent::DocumentOpened {
            attempt_id,
            document_id,
            summary,
        } => {
            if attempt_id != state.id
                || state.variant != SessionVariant::Authenticated
                || state.status != AttemptStatus::Idle
            {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.document_id = Some(document_id);
            next.error = None;
            match summary {
                Some(record) => {
                    next.status = AttemptStatus::Result;
                    next.result = Some(SummaryView::genuine(record));
                }
                // 还没有摘要：等待生成
                None => next.status = AttemptStatus::Selecting,
            }
            Transition::to(next, Effect::None)
        }
        AttemptEvent::DocumentOpenFailed { attempt_id, error } => {
            if attempt_id != state.id || state.status != AttemptStatus::Idle {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.error = Some(error.clone());
            Transition::to(next, Effect::ShowError(error))
        }
        AttemptEvent::ToggleLanguage => toggle_language(state),
        AttemptEvent::TranslationSucceeded {
            attempt_id,
            mode,
            record,
        } => {
            if attempt_id != state.id || !state.translation.loading || state.result.is_none() {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.translation.loading = false;
            if mode != state.translation.mode {
                return Transition::to(next, Effect::Ignored);
            }
            next.translation.cache = Some(record.clone());
            if let Some(view) = next.result.as_mut() {
                view.displayed = record;
            }
            Transition::to(next, Effect::None)
        }
        AttemptEvent::TranslationFailed { attempt_id, error } => {
            if attempt_id != state.id || !state.translation.loading {
                return Transition::ignored(state);
            }
            let mut next = state.clone();
            next.translation.loading = false;
            Transition::to(next, Effect::ShowError(error))
        }
        AttemptEvent::SetTranslationMode(mode) => {
            if state.translation.loading {
                return Transition::ignored(state);
            }
            if mode == state.translation.mode {
                return Transition::to(state.clone(), Effect::None);
            }
            let mut next = state.clone();
            next.translation.mode = mode;
            next.translation.cache = None;
            // 正在显示的译文出自旧模式，回到原文
            if let Some(view) = next.result.as_mut() {
                view.displayed = view.original.clone();
            }
            Transition::to(next, Effect::None)
        }
        AttemptEvent::Reset {
            variant,
            upload_limit,
        } => {
            let next = AnalysisAttempt::new(
                state.id + 1,
                variant,
                upload_limit,
                state.translation.mode,
            );
            Transition::to(next, Effect::None)
        }
    }
}

fn select(state: &AnalysisAttempt, document: SelectedDocument) -> Transition {
    if !state.can_select() {
        return Transition::ignored(state);
    }

    let mut next = state.clone();
    match document.validate(state.upload_limit) {
        Ok(_) => {
            next.status = AttemptStatus::Selecting;
            next.selected_document = Some(document);
            next.document_id = None;
            next.result = None;
            next.error = None;
            next.translation.cache = None;
            Transition::to(next, Effect::None)
        }
        Err(e) => {
            let info = ErrorInfo::from(e);
            next.error = Some(info.clone());
            Transition::to(next, Effect::ShowError(info))
        }
    }
}

fn submit(state: &AnalysisAttempt, remaining_trials: u32) -> Transition {
    let retry = state.status == AttemptStatus::Failed && state.has_input();
    if state.status != AttemptStatus::Selecting && !retry {
        if state.status == AttemptStatus::Idle {
            let info = ErrorInfo::from(ValidationError::NoDocument);
            let mut next = state.clone();
            next.error = Some(info.clone());
            return Transition::to(next, Effect::ShowError(info));
        }
        return Transition::ignored(state);
    }

    if state.variant == SessionVariant::Anonymous && remaining_trials == 0 {
        let mut next = state.clone();
        next.error = Some(ErrorInfo::new(ErrorKind::TrialExhausted, TRIAL_EXHAUSTED_MESSAGE));
        return Transition::to(next, Effect::PromptRegistration);
    }

    let mut next = state.clone();
    next.status = AttemptStatus::Submitting;
    next.submission += 1;
    next.error = None;
    if retry && next.result.as_ref().is_some_and(|view| view.is_sample) {
        next.result = None;
    }
    Transition::to(next, Effect::IssueAnalyze { attempt_id: state.id })
}

fn regenerate(state: &AnalysisAttempt) -> Transition {
    let allowed = state.variant == SessionVariant::Authenticated
        && state.document_id.is_some()
        && !state.translation.loading
        && matches!(state.status, AttemptStatus::Result | AttemptStatus::Failed);
    if !allowed {
        return Transition::ignored(state);
    }

    // 新结果到达前保留当前显示的摘要
    let mut next = state.clone();
    next.status = AttemptStatus::Submitting;
    next.submission += 1;
    next.error = None;
    Transition::to(next, Effect::IssueAnalyze { attempt_id: state.id })
}

fn toggle_language(state: &AnalysisAttempt) -> Transition {
    let view = match &state.result {
        Some(view) if state.status == AttemptStatus::Result && !view.is_sample => view,
        _ => return Transition::ignored(state),
    };
    // 只支持英文到印地语
    if view.original.language != Language::English {
        return Transition::ignored(state);
    }
    if state.translation.loading {
        return Transition::ignored(state);
    }

    let mut next = state.clone();
    if view.is_translated() {
        if let Some(view) = next.result.as_mut() {
            view.displayed = view.original.clone();
        }
        return Transition::to(next, Effect::None);
    }

    if let Some(cached) = &state.translation.cache {
        if let Some(view) = next.result.as_mut() {
            view.displayed = cached.clone();
        }
        return Transition::to(next, Effect::None);
    }

    next.translation.loading = true;
    Transition::to(
        next,
        Effect::RunTranslation {
            attempt_id: state.id,
            mode: state.translation.mode,
            target: Language::Hindi,
        },
    )
}
