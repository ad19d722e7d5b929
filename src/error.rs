use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// 本地文件校验错误（不会离开本机）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 远程调用失败（需先分类再展示）
    #[error("远程错误: {0}")]
    Remote(#[from] RemoteFailure),
    /// 结构化响应解析失败
    #[error("解析错误: {0}")]
    Parse(String),
    /// 凭证失效或缺失
    #[error("认证错误: {0}")]
    Auth(String),
    /// 持久化存储读写失败
    #[error("存储错误 ({key}): {message}")]
    Storage { key: String, message: String },
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
    /// 不支持的翻译方向
    #[error("不支持的翻译方向: {from} -> {to}")]
    UnsupportedLanguage { from: String, to: String },
    /// 所有翻译层级都失败
    #[error("所有翻译层级均失败，最后错误: {last}")]
    AllTiersFailed { last: Box<AppError> },
}

/// 文件校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 未选择文档
    #[error("Please select a document to upload.")]
    NoDocument,
    /// 不支持的文件类型
    #[error("Unsupported file type '{extension}'. Please upload a PDF, DOC, DOCX, RTF, or TXT file.")]
    UnsupportedType { extension: String },
    /// 文件过大
    #[error("File is too large ({size} bytes). Maximum file size is {limit} bytes.")]
    TooLarge { size: u64, limit: u64 },
}

/// 远程调用失败时的状态信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStatus {
    /// 服务器返回了 HTTP 错误码
    Http(u16),
    /// 请求未能送达（网络错误、超时）
    Transport,
    /// HTTP 成功，但响应信封标记了失败或格式无效
    Envelope,
}

impl fmt::Display for FailureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStatus::Http(code) => write!(f, "HTTP {}", code),
            FailureStatus::Transport => write!(f, "transport"),
            FailureStatus::Envelope => write!(f, "envelope"),
        }
    }
}

/// 远程调用失败
///
/// 与具体传输方式无关，分类器只看 `status` 和 `message`。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{endpoint} 调用失败 ({status}): {message}")]
pub struct RemoteFailure {
    pub endpoint: String,
    pub status: FailureStatus,
    pub message: String,
}

impl RemoteFailure {
    pub fn new(endpoint: impl Into<String>, status: FailureStatus, message: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
        }
    }

    /// 网络层失败
    pub fn transport(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(endpoint, FailureStatus::Transport, message)
    }

    /// HTTP 错误码
    pub fn http(endpoint: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self::new(endpoint, FailureStatus::Http(code), message)
    }

    /// 响应信封失败
    pub fn envelope(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(endpoint, FailureStatus::Envelope, message)
    }
}

/// 错误分类
///
/// 状态机里保存的不是原始错误，而是分类后的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 文件类型/大小不合法
    Validation,
    /// 凭证过期或无效，强制登出
    Auth,
    /// 资源不存在
    NotFound,
    /// 上游 AI 服务容量受限（配额、限流）
    CapacityLimited,
    /// 网络错误或 5xx
    RemoteUnavailable,
    /// 免费试用次数已用完
    TrialExhausted,
    /// 无法归类
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Auth => "auth",
            ErrorKind::NotFound => "not-found",
            ErrorKind::CapacityLimited => "capacity-limited",
            ErrorKind::RemoteUnavailable => "remote-unavailable",
            ErrorKind::TrialExhausted => "trial-exhausted",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// 分类后的错误信息（面向用户）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for ErrorInfo {
    fn from(err: ValidationError) -> Self {
        ErrorInfo::new(ErrorKind::Validation, err.to_string())
    }
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储错误
    pub fn storage(key: impl Into<String>, source: impl fmt::Display) -> Self {
        AppError::Storage {
            key: key.into(),
            message: source.to_string(),
        }
    }

    /// 创建解析错误
    pub fn parse(message: impl Into<String>) -> Self {
        AppError::Parse(message.into())
    }

    /// 是否为远程失败
    pub fn as_remote(&self) -> Option<&RemoteFailure> {
        match self {
            AppError::Remote(failure) => Some(failure),
            AppError::AllTiersFailed { last } => last.as_remote(),
            _ => None,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
