//! 失败分类 - 业务能力层
//!
//! 只负责"这是哪一类失败"，纯函数，不关心失败来自哪个接口

use crate::error::{AppError, ErrorInfo, ErrorKind, FailureStatus, RemoteFailure};

/// 消息文本规则：按顺序匹配，忽略大小写
///
/// 上游 AI 服务的配额/限流错误只能从消息文本中识别。
const MESSAGE_RULES: &[(&str, ErrorKind)] = &[
    ("quota", ErrorKind::CapacityLimited),
    ("too many requests", ErrorKind::CapacityLimited),
    ("rate limit", ErrorKind::CapacityLimited),
    ("rate-limit", ErrorKind::CapacityLimited),
    ("failed to generate summary", ErrorKind::CapacityLimited),
];

pub const CAPACITY_MESSAGE: &str = "Our AI service is currently experiencing high demand. Please try again later or register for full access with higher limits.";
pub const UNAVAILABLE_MESSAGE: &str = "The service is currently unreachable. Please check your connection and try again.";
pub const AUTH_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const NOT_FOUND_MESSAGE: &str = "The requested document could not be found.";
pub const TRIAL_EXHAUSTED_MESSAGE: &str = "You have used all your free trials. Please register for full access.";
const UNKNOWN_MESSAGE: &str = "Failed to process document";

/// 只看消息文本
pub fn classify_message(message: &str) -> Option<ErrorKind> {
    let lower = message.to_lowercase();
    MESSAGE_RULES
        .iter()
        .find(|(pattern, _)| lower.contains(pattern))
        .map(|(_, kind)| *kind)
}

/// 只看状态（HTTP 码或传输层失败）
pub fn classify_status(status: FailureStatus) -> ErrorKind {
    match status {
        FailureStatus::Http(429) => ErrorKind::CapacityLimited,
        FailureStatus::Http(400 | 413 | 415 | 422) => ErrorKind::Validation,
        FailureStatus::Http(401 | 403) => ErrorKind::Auth,
        FailureStatus::Http(404) => ErrorKind::NotFound,
        FailureStatus::Http(500..=599) => ErrorKind::RemoteUnavailable,
        FailureStatus::Transport => ErrorKind::RemoteUnavailable,
        FailureStatus::Http(_) | FailureStatus::Envelope => ErrorKind::Unknown,
    }
}

/// 分类远程失败：消息规则优先，其次按状态映射
pub fn classify(failure: &RemoteFailure) -> ErrorKind {
    classify_message(&failure.message).unwrap_or_else(|| classify_status(failure.status))
}

/// 分类任意应用错误
pub fn classify_error(err: &AppError) -> ErrorKind {
    match err {
        AppError::Validation(_) => ErrorKind::Validation,
        AppError::Auth(_) => ErrorKind::Auth,
        AppError::Remote(failure) => classify(failure),
        AppError::AllTiersFailed { last } => classify_error(last),
        AppError::Parse(_)
        | AppError::Storage { .. }
        | AppError::Config(_)
        | AppError::UnsupportedLanguage { .. } => ErrorKind::Unknown,
    }
}

/// 面向用户的提示文本
pub fn user_message(kind: ErrorKind, raw: &str) -> String {
    match kind {
        ErrorKind::CapacityLimited => CAPACITY_MESSAGE.to_string(),
        ErrorKind::RemoteUnavailable => UNAVAILABLE_MESSAGE.to_string(),
        ErrorKind::Auth => AUTH_MESSAGE.to_string(),
        ErrorKind::TrialExhausted => TRIAL_EXHAUSTED_MESSAGE.to_string(),
        ErrorKind::NotFound if raw.trim().is_empty() => NOT_FOUND_MESSAGE.to_string(),
        _ if raw.trim().is_empty() => UNKNOWN_MESSAGE.to_string(),
        _ => raw.to_string(),
    }
}

/// 分类并生成状态机保存的错误信息
pub fn describe(err: &AppError) -> ErrorInfo {
    let kind = classify_error(err);
    let raw = match err {
        AppError::Remote(failure) => failure.message.clone(),
        AppError::Validation(v) => v.to_string(),
        AppError::UnsupportedLanguage { from, to } => {
            format!("Translation from {} to {} is not supported.", from, to)
        }
        other => other.to_string(),
    };
    ErrorInfo::new(kind, user_message(kind, &raw))
}
