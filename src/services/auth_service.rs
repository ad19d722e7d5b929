//! 认证服务 - 业务能力层
//!
//! 只负责"登录状态"能力：登录、注册、启动时恢复、登出

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{info, warn};

use crate::clients::{AuthBackend, RegisterRequest};
use crate::error::{AppError, AppResult};
use crate::services::CredentialStore;

/// 认证服务
///
/// 职责：
/// - 登录成功后把凭证交给 `CredentialStore`
/// - 启动时校验已保存的凭证，任何失败都视为登出
/// - 不关心摘要流程
pub struct AuthService {
    backend: Arc<dyn AuthBackend>,
    credentials: Arc<CredentialStore>,
}

impl AuthService {
    pub fn new(backend: Arc<dyn AuthBackend>, credentials: Arc<CredentialStore>) -> Self {
        Self { backend, credentials }
    }

    /// 登录
    ///
    /// # 返回
    /// 服务端返回的用户信息
    pub async fn login(&self, email: &str, password: &str) -> AppResult<JsonValue> {
        let response = self.backend.login(email, password).await?;
        if response.token.trim().is_empty() {
            return Err(AppError::Auth("登录响应中没有凭证".to_string()));
        }

        self.credentials.set_credential(&response.token)?;
        if !self.credentials.is_valid() {
            return Err(AppError::Auth("服务端返回的凭证已过期".to_string()));
        }

        info!("✓ 登录成功: {}", email);
        Ok(response.user)
    }

    /// 注册，返回服务端提示
    pub async fn register(&self, request: &RegisterRequest) -> AppResult<String> {
        let message = self.backend.register(request).await?;
        info!("✓ 注册成功: {}", request.email);
        Ok(message)
    }

    /// 启动时恢复登录状态
    ///
    /// # 返回
    /// 凭证有效且服务端确认时返回用户信息，否则为 `None`（已登出）
    pub async fn restore(&self) -> AppResult<Option<JsonValue>> {
        if !self.credentials.is_valid() {
            return Ok(None);
        }

        match self.backend.current_user().await {
            Ok(user) => {
                info!("✓ 已恢复登录状态");
                Ok(Some(user))
            }
            Err(e) => {
                warn!("恢复登录状态失败，执行登出: {}", e);
                self.logout()?;
                Ok(None)
            }
        }
    }

    pub fn logout(&self) -> AppResult<()> {
        self.credentials.clear()?;
        info!("已登出");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_valid()
    }
}
