/// 后端 API 客户端
///
/// 封装所有与后端 HTTP 接口相关的调用逻辑
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::clients::backend::{AuthBackend, LoginResponse, RegisterRequest, SummaryBackend};
use crate::config::Config;
use crate::error::{AppError, AppResult, RemoteFailure};
use crate::models::{DocumentRecord, Language, SelectedDocument, SummaryRecord, WireSummary};
use crate::services::CredentialStore;

const FREE_TRIAL_UPLOAD: &str = "/free-trial/upload";
const DOCUMENTS: &str = "/documents";
const TRANSLATE: &str = "/translate";
const AUTH: &str = "/auth";

/// 失败时的响应信封
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    success: Option<bool>,
    message: Option<String>,
    summary: Option<WireSummary>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentResponse {
    success: Option<bool>,
    message: Option<String>,
    document: Option<DocumentRecord>,
    summary: Option<WireSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateDocumentResponse {
    success: Option<bool>,
    message: Option<String>,
    translated_summary: Option<SummaryRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTermResponse {
    success: Option<bool>,
    message: Option<String>,
    translated_term: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

/// 后端 API 客户端
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl ApiClient {
    /// 创建新的 API 客户端
    pub fn new(config: &Config, credentials: Arc<CredentialStore>) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("无法创建 HTTP 客户端: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 发送请求并解析 JSON 响应
    ///
    /// 非 2xx 响应会尽量取出信封中的 `message`。
    async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T, RemoteFailure> {
        debug!("请求后端接口: {}", endpoint);

        let response = request.send().await.map_err(|e| {
            warn!("请求 {} 失败: {}", endpoint, e);
            RemoteFailure::transport(endpoint, e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteFailure::transport(endpoint, e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());
            warn!("接口 {} 返回 {}: {}", endpoint, status, message);
            return Err(RemoteFailure::http(endpoint, status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            RemoteFailure::envelope(
                endpoint,
                format!("Invalid response format received from the server: {}", e),
            )
        })
    }

    fn document_part(&self, endpoint: &str, document: &SelectedDocument) -> Result<Part, RemoteFailure> {
        let mime = document
            .kind()
            .map(|k| k.mime_type())
            .unwrap_or("application/octet-stream");
        Part::bytes(document.bytes.clone())
            .file_name(document.file_name.clone())
            .mime_str(mime)
            .map_err(|e| RemoteFailure::transport(endpoint, e.to_string()))
    }
}

/// `success: false` 的响应按失败处理
fn check_success(endpoint: &str, success: Option<bool>, message: Option<String>) -> Result<(), RemoteFailure> {
    if success == Some(false) {
        return Err(RemoteFailure::envelope(
            endpoint,
            message.unwrap_or_else(|| "Request failed".to_string()),
        ));
    }
    Ok(())
}

#[async_trait]
impl SummaryBackend for ApiClient {
    async fn analyze_anonymous(
        &self,
        document: &SelectedDocument,
        language: Language,
    ) -> Result<SummaryRecord, RemoteFailure> {
        let endpoint = FREE_TRIAL_UPLOAD;
        let form = Form::new()
            .part("document", self.document_part(endpoint, document)?)
            .text("language", language.as_str());
        let request = self
            .http
            .post(self.url(endpoint))
            .query(&[("language", language.as_str())])
            .multipart(form);

        let response: AnalyzeResponse = self.send_json(endpoint, request).await?;
        check_success(endpoint, response.success, response.message)?;

        let mut record = response
            .summary
            .map(WireSummary::into_record)
            .ok_or_else(|| RemoteFailure::envelope(endpoint, "Invalid summary format received from the server"))?;
        // 摘要里没有语言标记时，以外层的 language 为准
        if response.language.as_deref().and_then(Language::parse) == Some(Language::Hindi) {
            record.language = Language::Hindi;
        }
        Ok(record)
    }

    async fn upload_document(&self, document: &SelectedDocument) -> Result<DocumentRecord, RemoteFailure> {
        let endpoint = format!("{}/upload", DOCUMENTS);
        let form = Form::new().part("file", self.document_part(&endpoint, document)?);
        let request = self.credentials.attach(self.http.post(self.url(&endpoint)).multipart(form));

        let response: DocumentResponse = self.send_json(&endpoint, request).await?;
        check_success(&endpoint, response.success, response.message)?;
        response
            .document
            .ok_or_else(|| RemoteFailure::envelope(endpoint, "Upload response did not contain a document"))
    }

    async fn summarize_document(&self, document_id: &str) -> Result<SummaryRecord, RemoteFailure> {
        let endpoint = format!("{}/{}/summarize", DOCUMENTS, document_id);
        let request = self.credentials.attach(self.http.post(self.url(&endpoint)));

        let response: DocumentResponse = self.send_json(&endpoint, request).await?;
        check_success(&endpoint, response.success, response.message)?;
        response
            .document
            .and_then(|d| d.summary())
            .or_else(|| response.summary.map(WireSummary::into_record))
            .ok_or_else(|| RemoteFailure::envelope(endpoint, "Failed to generate summary"))
    }

    async fn fetch_document(&self, document_id: &str) -> Result<DocumentRecord, RemoteFailure> {
        let endpoint = format!("{}/{}", DOCUMENTS, document_id);
        let request = self.credentials.attach(self.http.get(self.url(&endpoint)));

        let response: DocumentResponse = self.send_json(&endpoint, request).await?;
        check_success(&endpoint, response.success, response.message)?;
        response
            .document
            .ok_or_else(|| RemoteFailure::http(endpoint, 404, "Document not found"))
    }

    async fn translate_document(&self, document_id: &str, use_ai: bool) -> Result<SummaryRecord, RemoteFailure> {
        let endpoint = format!("{}/documents/{}/translate", TRANSLATE, document_id);
        let request = self.credentials.attach(
            self.http
                .get(self.url(&endpoint))
                .query(&[("useAI", use_ai), ("completeTranslation", true)]),
        );

        let response: TranslateDocumentResponse = self.send_json(&endpoint, request).await?;
        check_success(&endpoint, response.success, response.message)?;
        let mut record = response
            .translated_summary
            .ok_or_else(|| RemoteFailure::envelope(endpoint, "Translation response did not contain a summary"))?;
        record.language = Language::Hindi;
        Ok(record)
    }

    async fn translate_term(&self, term: &str) -> Result<String, RemoteFailure> {
        let endpoint = format!("{}/term", TRANSLATE);
        let request = self
            .credentials
            .attach(self.http.post(self.url(&endpoint)).json(&json!({ "term": term })));

        let response: TranslateTermResponse = self.send_json(&endpoint, request).await?;
        if response.success != Some(true) {
            return Err(RemoteFailure::envelope(
                endpoint,
                response.message.unwrap_or_else(|| "Failed to translate term".to_string()),
            ));
        }
        response
            .translated_term
            .ok_or_else(|| RemoteFailure::envelope(endpoint, "Translation response did not contain a term"))
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, RemoteFailure> {
        let endpoint = format!("{}/login", AUTH);
        let request = self
            .http
            .post(self.url(&endpoint))
            .json(&json!({ "email": email, "password": password }));
        self.send_json(&endpoint, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<String, RemoteFailure> {
        let endpoint = format!("{}/register", AUTH);
        let builder = self.http.post(self.url(&endpoint)).json(request);
        let response: MessageResponse = self.send_json(&endpoint, builder).await?;
        Ok(response.message.unwrap_or_default())
    }

    async fn current_user(&self) -> Result<JsonValue, RemoteFailure> {
        let endpoint = format!("{}/user", AUTH);
        let request = self.credentials.attach(self.http.get(self.url(&endpoint)));
        self.send_json(&endpoint, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;

    #[test]
    fn test_url_joins_base_without_double_slash() {
        let config = Config {
            api_base_url: "http://localhost:5000/api/".to_string(),
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryStore::new())));
        let client = ApiClient::new(&config, credentials).unwrap();
        assert_eq!(client.url("/translate/term"), "http://localhost:5000/api/translate/term");
    }

    #[test]
    fn test_check_success() {
        assert!(check_success("/x", None, None).is_ok());
        assert!(check_success("/x", Some(true), None).is_ok());
        let failure = check_success("/x", Some(false), Some("quota exceeded".to_string())).unwrap_err();
        assert_eq!(failure.message, "quota exceeded");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_failure() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_secs: 2,
            ..Config::default()
        };
        let credentials = Arc::new(CredentialStore::new(Arc::new(MemoryStore::new())));
        let client = ApiClient::new(&config, credentials).unwrap();

        let failure = client.translate_term("contract").await.unwrap_err();
        assert_eq!(failure.status, crate::error::FailureStatus::Transport);
    }
}
