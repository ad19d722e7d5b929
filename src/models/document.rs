//! 待上传文档与服务端文档记录

use std::path::Path;

use serde::Deserialize;

use super::summary::WireSummary;
use super::SummaryRecord;
use crate::error::{AppError, AppResult, ValidationError};

/// 支持上传的文档类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Doc,
    Docx,
    Txt,
    Rtf,
}

impl DocumentKind {
    /// 根据扩展名识别（不区分大小写）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "doc" => Some(DocumentKind::Doc),
            "docx" => Some(DocumentKind::Docx),
            "txt" => Some(DocumentKind::Txt),
            "rtf" => Some(DocumentKind::Rtf),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Doc => "application/msword",
            DocumentKind::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Txt => "text/plain",
            DocumentKind::Rtf => "application/rtf",
        }
    }
}

/// 用户选择的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl SelectedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// 从磁盘读取
    pub async fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::storage(path.display().to_string(), e))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn extension(&self) -> &str {
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_extension(self.extension())
    }

    /// 校验类型与大小，`max_bytes` 为允许的最大字节数（含）
    pub fn validate(&self, max_bytes: u64) -> Result<DocumentKind, ValidationError> {
        let kind = self.kind().ok_or_else(|| ValidationError::UnsupportedType {
            extension: self.extension().to_string(),
        })?;
        if self.size() > max_bytes {
            return Err(ValidationError::TooLarge {
                size: self.size(),
                limit: max_bytes,
            });
        }
        Ok(kind)
    }
}

/// 登录用户的文档记录（`GET /documents/{id}` 与 summarize 接口返回）
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    summary: Option<WireSummary>,
}

impl DocumentRecord {
    pub fn summary(&self) -> Option<SummaryRecord> {
        self.summary
            .clone()
            .map(WireSummary::into_record)
            .filter(|record| !record.is_empty())
    }
}
