//! 凭证存储 - 业务能力层
//!
//! 只负责"持有并附加 Bearer 凭证"能力，不关心登录流程

use std::sync::{Arc, RwLock};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::KvStore;

/// 持久化存储中保存凭证的键
pub const TOKEN_KEY: &str = "token";

/// Bearer 凭证
///
/// 只会被整体替换，不会原地修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    /// 无法解码时为 `None`，按已过期处理
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let expires_at = match decode_expiry(&token) {
            Ok(exp) => Some(exp),
            Err(e) => {
                debug!("凭证过期时间解码失败: {}", e);
                None
            }
        };
        Self { token, expires_at }
    }

    /// 过期时间早于 `now` 即视为失效
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if exp >= now)
    }
}

#[derive(Deserialize)]
struct Claims {
    exp: f64,
}

/// 从 JWT 的 payload 段解码 `exp` 声明
pub fn decode_expiry(token: &str) -> AppResult<DateTime<Utc>> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AppError::Auth("凭证不是 JWT 格式".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AppError::Auth(format!("凭证 payload 不是合法的 base64: {}", e)))?;
    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Auth(format!("凭证缺少 exp 声明: {}", e)))?;
    DateTime::from_timestamp(claims.exp as i64, 0)
        .ok_or_else(|| AppError::Auth(format!("exp 超出范围: {}", claims.exp)))
}

/// 凭证存储
///
/// 职责：
/// - 同时维护持久化存储和内存中的默认请求头
/// - 判断凭证是否有效，失效时立即清除（相当于登出）
/// - 永远不把过期凭证附加到请求上
pub struct CredentialStore {
    store: Arc<dyn KvStore>,
    current: RwLock<Option<Credential>>,
}

impl CredentialStore {
    /// 创建凭证存储，并从持久化存储恢复已有凭证
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let current = match store.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Some(Credential::from_token(token)),
            Ok(_) => None,
            Err(e) => {
                warn!("读取已保存的凭证失败: {}", e);
                None
            }
        };
        Self {
            store,
            current: RwLock::new(current),
        }
    }

    /// 保存新凭证（整体替换）
    pub fn set_credential(&self, token: &str) -> AppResult<()> {
        self.store.set(TOKEN_KEY, token)?;
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = Some(Credential::from_token(token));
        debug!("已保存新凭证");
        Ok(())
    }

    /// 清除凭证
    pub fn clear(&self) -> AppResult<()> {
        *self.current.write().unwrap_or_else(|p| p.into_inner()) = None;
        self.store.remove(TOKEN_KEY)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// 判断当前凭证是否有效，失效的凭证会被立即清除
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let credential = self.current.read().unwrap_or_else(|p| p.into_inner()).clone();
        match credential {
            None => false,
            Some(credential) if credential.is_valid_at(now) => true,
            Some(_) => {
                warn!("凭证已过期或无法解码，执行登出");
                if let Err(e) = self.clear() {
                    warn!("清除凭证失败: {}", e);
                }
                false
            }
        }
    }

    /// 当前有效的凭证
    pub fn credential(&self) -> Option<Credential> {
        if self.is_valid() {
            self.current.read().unwrap_or_else(|p| p.into_inner()).clone()
        } else {
            None
        }
    }

    /// 有效时返回 `Authorization` 头的值
    pub fn authorization_header(&self) -> Option<String> {
        self.credential().map(|c| format!("Bearer {}", c.token))
    }

    /// 给请求附加凭证，无有效凭证时原样返回
    pub fn attach(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.authorization_header() {
            Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
            None => request,
        }
    }
}
