//! 免费试用次数 - 业务能力层
//!
//! 只负责"记录匿名用户用了几次"，不关心何时调用

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::AppResult;
use crate::infrastructure::KvStore;

/// 持久化存储中保存已用次数的键
pub const TRIAL_USED_KEY: &str = "freeTrialsUsed";

/// 免费试用总次数
pub const TRIAL_LIMIT: u32 = 15;

/// 免费试用计数器
///
/// 只在客户端生效，不是安全控制。每次读写都会把值限制在 `[0, TRIAL_LIMIT]`。
#[derive(Clone)]
pub struct TrialQuota {
    store: Arc<dyn KvStore>,
}

impl TrialQuota {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// 已使用次数，读不到或无法解析时按 0 处理
    pub fn used(&self) -> u32 {
        let raw = match self.store.get(TRIAL_USED_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("读取试用次数失败: {}", e);
                None
            }
        };
        raw.and_then(|v| v.trim().parse::<i64>().ok())
            .map(|n| n.clamp(0, TRIAL_LIMIT as i64) as u32)
            .unwrap_or(0)
    }

    /// 剩余次数 = 15 - 已用，范围 [0, 15]
    pub fn remaining(&self) -> u32 {
        TRIAL_LIMIT.saturating_sub(self.used())
    }

    /// 消耗一次，只增不减，上限为 15
    ///
    /// 只能在匿名分析调用成功之后调用。
    pub fn consume(&self) -> AppResult<u32> {
        let used = (self.used() + 1).min(TRIAL_LIMIT);
        self.store.set(TRIAL_USED_KEY, &used.to_string())?;
        debug!("试用次数已更新: {}/{}", used, TRIAL_LIMIT);
        Ok(TRIAL_LIMIT - used)
    }

    /// 带外重置（例如用户注册后）
    pub fn reset(&self) -> AppResult<()> {
        self.store.remove(TRIAL_USED_KEY)
    }
}
