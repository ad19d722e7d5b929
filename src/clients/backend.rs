//! 远程服务接口
//!
//! 会话状态机只依赖这里的 trait，测试时替换为内存实现

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::RemoteFailure;
use crate::models::{DocumentRecord, Language, SelectedDocument, SummaryRecord};

/// 摘要与翻译服务
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// 匿名试用：上传并直接生成摘要
    async fn analyze_anonymous(
        &self,
        document: &SelectedDocument,
        language: Language,
    ) -> Result<SummaryRecord, RemoteFailure>;

    /// 登录用户：第一步上传
    async fn upload_document(&self, document: &SelectedDocument) -> Result<DocumentRecord, RemoteFailure>;

    /// 登录用户：第二步生成摘要
    async fn summarize_document(&self, document_id: &str) -> Result<SummaryRecord, RemoteFailure>;

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentRecord, RemoteFailure>;

    /// 服务端整篇翻译已保存的摘要
    async fn translate_document(&self, document_id: &str, use_ai: bool) -> Result<SummaryRecord, RemoteFailure>;

    /// 翻译一段文本；文本本身可以是序列化后的结构化数据
    async fn translate_term(&self, term: &str) -> Result<String, RemoteFailure>;
}

/// 登录成功的返回
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: JsonValue,
}

/// 注册请求
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 认证服务
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, RemoteFailure>;

    /// 返回服务端的提示消息
    async fn register(&self, request: &RegisterRequest) -> Result<String, RemoteFailure>;

    /// 使用当前凭证获取用户信息
    async fn current_user(&self) -> Result<JsonValue, RemoteFailure>;
}
