use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value as JsonValue;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;

use summary_session::clients::SummaryBackend;
use summary_session::error::{AppError, AppResult, ErrorKind, RemoteFailure};
use summary_session::infrastructure::{KvStore, MemoryStore};
use summary_session::models::{DocumentRecord, Language, SelectedDocument, SummaryRecord, TranslationMode};
use summary_session::services::credential_store::TOKEN_KEY;
use summary_session::services::sample_summary::{is_sample, SAMPLE_MARKER};
use summary_session::services::trial_quota::TRIAL_USED_KEY;
use summary_session::services::{ChannelNotifier, CredentialStore, Notice, NoticeLevel, TrialQuota};
use summary_session::workflow::session::QUOTA_WRITE_WARNING;
use summary_session::workflow::{AnalysisSession, AttemptStatus, SessionVariant};
use summary_session::Config;

const TRANSLATED: &str = "अनुवादित";

/// `/translate/term` 的模拟行为
#[derive(Clone, Copy, PartialEq, Eq)]
enum TermBehavior {
    Working,
    MalformedBatch,
    Down,
}

/// 内存中的后端
struct FakeBackend {
    analyze_results: Mutex<VecDeque<Result<SummaryRecord, RemoteFailure>>>,
    summarize_results: Mutex<VecDeque<Result<SummaryRecord, RemoteFailure>>>,
    term: Mutex<TermBehavior>,
    gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn new() -> Self {
        Self {
            analyze_results: Mutex::new(VecDeque::new()),
            summarize_results: Mutex::new(VecDeque::new()),
            term: Mutex::new(TermBehavior::Working),
            gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new()
        }
    }

    fn push_analyze(&self, result: Result<SummaryRecord, RemoteFailure>) {
        self.analyze_results.lock().unwrap().push_back(result);
    }

    fn push_summarize(&self, result: Result<SummaryRecord, RemoteFailure>) {
        self.summarize_results.lock().unwrap().push_back(result);
    }

    fn set_term(&self, behavior: TermBehavior) {
        *self.term.lock().unwrap() = behavior;
    }

    fn record_call(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }

    fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == name).count()
    }
}

/// 把 JSON 中的每个字符串都替换成译文，结构保持不变
fn translate_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::String(_) => JsonValue::String(TRANSLATED.to_string()),
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(translate_json).collect()),
        JsonValue::Object(map) => JsonValue::Object(
            map.into_iter().map(|(k, v)| (k, translate_json(v))).collect(),
        ),
        other => other,
    }
}

#[async_trait]
impl SummaryBackend for FakeBackend {
    async fn analyze_anonymous(
        &self,
        _document: &SelectedDocument,
        _language: Language,
    ) -> Result<SummaryRecord, RemoteFailure> {
        self.record_call("analyze");
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let next = self.analyze_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(lease_summary()))
    }

    async fn upload_document(&self, document: &SelectedDocument) -> Result<DocumentRecord, RemoteFailure> {
        self.record_call("upload");
        let body = format!(r#"{{"_id":"doc-1","originalName":"{}"}}"#, document.file_name);
        Ok(serde_json::from_str(&body).unwrap())
    }

    async fn summarize_document(&self, _document_id: &str) -> Result<SummaryRecord, RemoteFailure> {
        self.record_call("summarize");
        let next = self.summarize_results.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(lease_summary()))
    }

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentRecord, RemoteFailure> {
        self.record_call("fetch");
        match document_id {
            "with-summary" => {
                let body = serde_json::json!({ "_id": "with-summary", "summary": saved_summary() });
                Ok(serde_json::from_value(body).unwrap())
            }
            "without-summary" => Ok(serde_json::from_str(r#"{"_id":"without-summary"}"#).unwrap()),
            _ => Err(RemoteFailure::http("/documents/x", 404, "Document not found")),
        }
    }

    async fn translate_document(&self, _document_id: &str, _use_ai: bool) -> Result<SummaryRecord, RemoteFailure> {
        self.record_call("translate_document");
        Ok(lease_summary().map_fields(Language::Hindi, |_| TRANSLATED.to_string()))
    }

    async fn translate_term(&self, term: &str) -> Result<String, RemoteFailure> {
        self.record_call("term");
        let behavior = *self.term.lock().unwrap();
        let is_batch = term.trim_start().starts_with('{');
        match behavior {
            TermBehavior::Down => Err(RemoteFailure::transport("/translate/term", "connection refused")),
            TermBehavior::MalformedBatch if is_batch => Ok("I'm sorry, here is the translation: ...".to_string()),
            _ if is_batch => {
                let value: JsonValue = serde_json::from_str(term).unwrap();
                Ok(translate_json(value).to_string())
            }
            _ => Ok(TRANSLATED.to_string()),
        }
    }
}

fn lease_summary() -> SummaryRecord {
    SummaryRecord {
        document_overview: "Residential lease agreement".to_string(),
        key_parties: vec!["Landlord".to_string(), "Tenant".to_string()],
        important_clauses: vec!["Rent is due monthly".to_string(), "Deposit is refundable".to_string()],
        critical_dates: vec!["Lease starts 1 March".to_string()],
        potential_concerns: vec!["Indemnity exposure".to_string()],
        plain_language_summary: "You rent a flat for one year.".to_string(),
        language: Language::English,
    }
}

fn saved_summary() -> SummaryRecord {
    SummaryRecord {
        document_overview: "Saved lease".to_string(),
        ..lease_summary()
    }
}

fn pdf() -> SelectedDocument {
    SelectedDocument::new("lease.pdf", b"%PDF-1.4 lease".to_vec())
}

fn make_token(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"u1","exp":{}}}"#, exp));
    format!("{}.{}.sig", header, payload)
}

fn test_config() -> Config {
    Config {
        fallback_delay_ms: 50,
        ..Config::default()
    }
}

struct Harness {
    backend: Arc<FakeBackend>,
    store: Arc<MemoryStore>,
    credentials: Arc<CredentialStore>,
    quota: TrialQuota,
    session: Arc<AnalysisSession>,
    notices: UnboundedReceiver<Notice>,
}

impl Harness {
    fn build(backend: FakeBackend, store: Arc<MemoryStore>) -> Self {
        let backend = Arc::new(backend);
        let credentials = Arc::new(CredentialStore::new(store.clone()));
        let quota = TrialQuota::new(store.clone());
        let (notifier, notices) = ChannelNotifier::new();
        let session = Arc::new(AnalysisSession::new(
            test_config(),
            backend.clone(),
            credentials.clone(),
            quota.clone(),
            Arc::new(notifier),
        ));
        Self {
            backend,
            store,
            credentials,
            quota,
            session,
            notices,
        }
    }

    fn anonymous() -> Self {
        Self::build(FakeBackend::new(), Arc::new(MemoryStore::new()))
    }

    fn authenticated() -> Self {
        let store = Arc::new(MemoryStore::new());
        let token = make_token(chrono::Utc::now().timestamp() + 3600);
        store.set(TOKEN_KEY, &token).unwrap();
        Self::build(FakeBackend::new(), store)
    }

    fn drain(&mut self) -> Vec<Notice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }

    async fn analyze_once(&self) {
        self.session.select_document(pdf());
        self.session.submit().await;
    }
}

async fn wait_for_call(backend: &FakeBackend, name: &str) {
    for _ in 0..200 {
        if backend.count(name) > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} 未被调用", name);
}

// ========== 试用次数 ==========

#[tokio::test]
async fn test_successful_anonymous_analysis_consumes_one_trial() {
    let mut h = Harness::anonymous();
    assert_eq!(h.session.remaining_trials(), 15);

    h.analyze_once().await;

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Result);
    assert_eq!(attempt.displayed(), Some(&lease_summary()));
    assert_eq!(h.session.remaining_trials(), 14);

    let notices = h.drain();
    let last = notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Success);
    assert!(last.message.contains("14"));
}

/// 试用次数写不进去的存储
struct ReadOnlyQuotaStore {
    inner: MemoryStore,
}

impl KvStore for ReadOnlyQuotaStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if key == TRIAL_USED_KEY {
            return Err(AppError::storage(key, "disk full"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.inner.remove(key)
    }
}

#[tokio::test]
async fn test_quota_write_failure_is_reported_to_user() {
    let store: Arc<dyn KvStore> = Arc::new(ReadOnlyQuotaStore {
        inner: MemoryStore::new(),
    });
    let (notifier, mut notices) = ChannelNotifier::new();
    let quota = TrialQuota::new(store.clone());
    let session = AnalysisSession::new(
        test_config(),
        Arc::new(FakeBackend::new()),
        Arc::new(CredentialStore::new(store)),
        quota.clone(),
        Arc::new(notifier),
    );

    session.select_document(pdf());
    session.submit().await;

    assert_eq!(session.snapshot().status, AttemptStatus::Result);
    assert_eq!(quota.remaining(), 15);

    let mut received = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        received.push(notice);
    }
    assert!(received
        .iter()
        .any(|n| n.level == NoticeLevel::Warning && n.message == QUOTA_WRITE_WARNING));
}

#[tokio::test]
async fn test_failed_submit_never_changes_remaining() {
    let mut h = Harness::anonymous();
    h.backend
        .push_analyze(Err(RemoteFailure::transport("/free-trial/upload", "connection refused")));

    h.analyze_once().await;

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Failed);
    assert_eq!(attempt.error.unwrap().kind, ErrorKind::RemoteUnavailable);
    assert!(attempt.result.is_none());
    assert_eq!(h.session.remaining_trials(), 15);

    let notices = h.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("try again"));
}

#[tokio::test]
async fn test_zero_quota_refuses_submit_without_remote_call() {
    let mut h = Harness::anonymous();
    h.store.set("freeTrialsUsed", "15").unwrap();

    h.analyze_once().await;

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Selecting);
    assert_eq!(attempt.error.unwrap().kind, ErrorKind::TrialExhausted);
    assert_eq!(h.backend.count("analyze"), 0);

    let notices = h.drain();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Warning && n.message.contains("Register")));
}

#[tokio::test]
async fn test_quota_runs_out_after_fifteen_analyses() {
    let h = Harness::anonymous();
    for n in 1..=15u32 {
        h.session.reset();
        h.analyze_once().await;
        assert_eq!(h.quota.remaining(), 15 - n);
    }

    h.session.reset();
    h.analyze_once().await;
    assert_eq!(h.backend.count("analyze"), 15);
    assert_eq!(h.session.snapshot().status, AttemptStatus::Selecting);
}

// ========== 容量受限兜底 ==========

#[tokio::test]
async fn test_rate_limit_shows_error_then_sample() {
    let mut h = Harness::anonymous();
    h.backend.push_analyze(Err(RemoteFailure::http(
        "/free-trial/upload",
        500,
        "Upstream rate limit reached",
    )));

    let started = Instant::now();
    h.analyze_once().await;
    let elapsed = started.elapsed();

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Failed);
    assert_eq!(attempt.error.as_ref().unwrap().kind, ErrorKind::CapacityLimited);
    let view = attempt.result.as_ref().unwrap();
    assert!(view.is_sample);
    assert!(is_sample(&view.displayed));
    assert!(view.displayed.document_overview.contains(SAMPLE_MARKER));
    assert!(elapsed >= Duration::from_millis(50));

    // 容量受限不消耗次数
    assert_eq!(h.session.remaining_trials(), 15);

    let notices = h.drain();
    assert_eq!(notices.len(), 2);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert!(notices[0].message.contains("high demand"));
    assert_eq!(notices[1].level, NoticeLevel::Info);
}

#[tokio::test]
async fn test_reset_during_fallback_delay_drops_sample() {
    let mut h = Harness::anonymous();
    h.backend
        .push_analyze(Err(RemoteFailure::http("/free-trial/upload", 429, "Too Many Requests")));

    let session = h.session.clone();
    let task = tokio::spawn(async move {
        session.select_document(pdf());
        session.submit().await;
    });

    wait_for_call(&h.backend, "analyze").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    h.session.reset();
    task.await.unwrap();

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Idle);
    assert!(attempt.result.is_none());
    assert!(h.drain().iter().all(|n| n.level != NoticeLevel::Info || n.message == "Ready for a new document"));
}

// ========== 并发与过期结果 ==========

#[tokio::test]
async fn test_reentrant_submit_is_ignored() {
    let gate = Arc::new(Notify::new());
    let h = Harness::build(FakeBackend::gated(gate.clone()), Arc::new(MemoryStore::new()));

    h.session.select_document(pdf());
    let session = h.session.clone();
    let task = tokio::spawn(async move { session.submit().await });

    wait_for_call(&h.backend, "analyze").await;
    let during = h.session.submit().await;
    assert_eq!(during.status, AttemptStatus::Submitting);

    gate.notify_one();
    let done = task.await.unwrap();
    assert_eq!(done.status, AttemptStatus::Result);
    assert_eq!(h.backend.count("analyze"), 1);
    assert_eq!(h.session.remaining_trials(), 14);
}

#[tokio::test]
async fn test_late_result_for_superseded_attempt_is_dropped() {
    let gate = Arc::new(Notify::new());
    let h = Harness::build(FakeBackend::gated(gate.clone()), Arc::new(MemoryStore::new()));

    h.session.select_document(pdf());
    let session = h.session.clone();
    let task = tokio::spawn(async move { session.submit().await });

    wait_for_call(&h.backend, "analyze").await;
    h.session.reset();
    h.session
        .select_document(SelectedDocument::new("other.txt", b"plain text".to_vec()));

    gate.notify_one();
    task.await.unwrap();

    let attempt = h.session.snapshot();
    assert_eq!(attempt.id, 2);
    assert_eq!(attempt.status, AttemptStatus::Selecting);
    assert!(attempt.result.is_none());
    assert_eq!(attempt.selected_document.unwrap().file_name, "other.txt");
}

// ========== 校验 ==========

#[tokio::test]
async fn test_invalid_document_never_contacts_remote() {
    let mut h = Harness::anonymous();
    let attempt = h
        .session
        .select_document(SelectedDocument::new("scan.png", vec![0; 16]));
    assert_eq!(attempt.status, AttemptStatus::Idle);

    let too_big = vec![0u8; 10 * 1024 * 1024 + 1];
    let attempt = h.session.select_document(SelectedDocument::new("big.pdf", too_big));
    assert_eq!(attempt.status, AttemptStatus::Idle);
    assert_eq!(attempt.error.unwrap().kind, ErrorKind::Validation);

    h.session.submit().await;
    assert_eq!(h.backend.count("analyze"), 0);
    assert!(h.drain().iter().all(|n| n.level == NoticeLevel::Error));
}

// ========== 翻译 ==========

#[tokio::test]
async fn test_translation_cache_reuse_and_mode_change() {
    let mut h = Harness::anonymous();
    h.analyze_once().await;

    let first = h.session.toggle_language().await;
    let first_translation = first.displayed().unwrap().clone();
    assert_eq!(first_translation.language, Language::Hindi);
    let calls_after_first = h.backend.count("term");
    assert_eq!(calls_after_first, 1);

    let back = h.session.toggle_language().await;
    assert_eq!(back.displayed(), Some(&lease_summary()));

    let again = h.session.toggle_language().await;
    assert_eq!(again.displayed(), Some(&first_translation));
    assert_eq!(h.backend.count("term"), calls_after_first);

    // 切换模式后重新计算
    let switched = h.session.set_translation_mode(TranslationMode::Dictionary);
    assert!(switched.translation.cache.is_none());
    assert_eq!(switched.displayed(), Some(&lease_summary()));

    let dictionary = h.session.toggle_language().await;
    assert_eq!(dictionary.displayed().unwrap().key_parties, vec!["मकान मालिक", "किरायेदार"]);
    assert_eq!(h.backend.count("term"), calls_after_first);

    let notices = h.drain();
    assert!(notices.iter().any(|n| n.message == "Translation mode: Dictionary"));
    // 词典无法翻译 "Indemnity exposure"
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Warning);
}

#[tokio::test]
async fn test_malformed_batch_falls_back_to_per_field() {
    let mut h = Harness::anonymous();
    h.analyze_once().await;
    h.backend.set_term(TermBehavior::MalformedBatch);

    let attempt = h.session.toggle_language().await;
    let translated = attempt.displayed().unwrap();

    let original = lease_summary();
    assert_eq!(translated.fields().len(), original.fields().len());
    assert!(translated.fields().iter().all(|(_, text)| *text == TRANSLATED));
    // 1 次整体 + 每个字段 1 次
    assert_eq!(h.backend.count("term"), 1 + original.fields().len());

    let notices = h.drain();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_remote_translation_down_uses_dictionary() {
    let mut h = Harness::anonymous();
    h.analyze_once().await;
    h.backend.set_term(TermBehavior::Down);

    let attempt = h.session.toggle_language().await;
    let translated = attempt.displayed().unwrap();
    assert_eq!(translated.language, Language::Hindi);
    assert_eq!(translated.key_parties, vec!["मकान मालिक", "किरायेदार"]);
    assert!(!attempt.translation.loading);

    let notices = h.drain();
    let last = notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Warning);
    assert!(last.message.contains("partially"));
}

// ========== 重置 ==========

#[tokio::test]
async fn test_reset_from_result_clears_attempt() {
    let mut h = Harness::anonymous();
    h.analyze_once().await;
    h.session.toggle_language().await;

    let attempt = h.session.reset();
    assert_eq!(attempt.status, AttemptStatus::Idle);
    assert!(attempt.selected_document.is_none());
    assert!(attempt.result.is_none());
    assert!(attempt.error.is_none());
    assert!(attempt.translation.cache.is_none());

    let notices = h.drain();
    assert_eq!(notices.last().unwrap().message, "Ready for a new document");
}

// ========== 登录用户 ==========

#[tokio::test]
async fn test_authenticated_upload_then_summarize() {
    let h = Harness::authenticated();
    assert_eq!(h.session.snapshot().variant, SessionVariant::Authenticated);

    h.analyze_once().await;

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Result);
    assert_eq!(attempt.document_id.as_deref(), Some("doc-1"));
    assert_eq!(h.backend.count("upload"), 1);
    assert_eq!(h.backend.count("summarize"), 1);
    // 登录用户不消耗试用次数
    assert_eq!(h.session.remaining_trials(), 15);
}

#[tokio::test]
async fn test_regenerate_keeps_previous_result_on_failure() {
    let h = Harness::authenticated();
    h.analyze_once().await;

    h.backend.push_summarize(Err(RemoteFailure::http(
        "/documents/doc-1/summarize",
        503,
        "Service Unavailable",
    )));
    let attempt = h.session.regenerate().await;

    assert_eq!(attempt.status, AttemptStatus::Failed);
    assert_eq!(attempt.displayed(), Some(&lease_summary()));
    assert_eq!(h.backend.count("upload"), 1);
    assert_eq!(h.backend.count("summarize"), 2);

    let mut updated = lease_summary();
    updated.document_overview = "Updated overview".to_string();
    h.backend.push_summarize(Ok(updated.clone()));
    let attempt = h.session.regenerate().await;
    assert_eq!(attempt.status, AttemptStatus::Result);
    assert_eq!(attempt.displayed(), Some(&updated));
}

#[tokio::test]
async fn test_authenticated_capacity_failure_has_no_sample() {
    let h = Harness::authenticated();
    h.backend
        .push_summarize(Err(RemoteFailure::envelope("/documents/doc-1/summarize", "Failed to generate summary")));

    h.analyze_once().await;

    let attempt = h.session.snapshot();
    assert_eq!(attempt.status, AttemptStatus::Failed);
    assert_eq!(attempt.error.unwrap().kind, ErrorKind::CapacityLimited);
    assert!(attempt.result.is_none());
}

#[tokio::test]
async fn test_auth_failure_clears_credential() {
    let mut h = Harness::authenticated();
    h.backend
        .push_summarize(Err(RemoteFailure::http("/documents/doc-1/summarize", 401, "Token is not valid")));

    h.analyze_once().await;

    assert_eq!(h.session.snapshot().error.unwrap().kind, ErrorKind::Auth);
    assert!(!h.credentials.is_valid());
    assert_eq!(h.store.get(TOKEN_KEY).unwrap(), None);
    assert!(h.drain().iter().any(|n| n.message.contains("log in again")));

    // 下一次尝试回到匿名流程
    assert_eq!(h.session.reset().variant, SessionVariant::Anonymous);
}

#[tokio::test]
async fn test_expired_credential_means_anonymous_session() {
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, &make_token(1_000)).unwrap();
    let h = Harness::build(FakeBackend::new(), store);

    assert_eq!(h.session.snapshot().variant, SessionVariant::Anonymous);
    assert_eq!(h.store.get(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_open_document_with_and_without_summary() {
    let h = Harness::authenticated();

    let attempt = h.session.open_document("with-summary").await;
    assert_eq!(attempt.status, AttemptStatus::Result);
    assert_eq!(attempt.displayed(), Some(&saved_summary()));

    let attempt = h.session.open_document("without-summary").await;
    assert_eq!(attempt.status, AttemptStatus::Selecting);
    let attempt = h.session.submit().await;
    assert_eq!(attempt.status, AttemptStatus::Result);
    assert_eq!(h.backend.count("upload"), 0);

    let attempt = h.session.open_document("missing").await;
    assert_eq!(attempt.status, AttemptStatus::Idle);
    assert_eq!(attempt.error.unwrap().kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_saved_document_translation_uses_server_endpoint() {
    let h = Harness::authenticated();
    h.session.open_document("with-summary").await;

    let attempt = h.session.toggle_language().await;
    assert_eq!(attempt.displayed().unwrap().language, Language::Hindi);
    assert_eq!(h.backend.count("translate_document"), 1);
    assert_eq!(h.backend.count("term"), 0);
}
