//! 用户提示 - 业务能力层
//!
//! 只负责"把提示送到界面"能力，不关心提示从哪个流程产生

use std::fmt;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// 提示级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// 一条非阻塞的用户提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// 提示的接收方
///
/// 发送不能失败，也不能阻塞会话。
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// 把提示写进日志（命令行默认使用）
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info => info!("💡 {}", notice.message),
            NoticeLevel::Success => info!("✓ {}", notice.message),
            NoticeLevel::Warning => warn!("⚠️ {}", notice.message),
            NoticeLevel::Error => error!("❌ {}", notice.message),
        }
    }
}

/// 通过通道把提示交给界面层
pub struct ChannelNotifier {
    sender: UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// 创建通知器及其接收端
    pub fn new() -> (Self, UnboundedReceiver<Notice>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(e) = self.sender.send(notice) {
            // 接收端已关闭，说明界面不再关心
            debug!("提示未送达: {}", e.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_preserves_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::error("first"));
        notifier.notify(Notice::info("second"));

        assert_eq!(rx.try_recv().unwrap(), Notice::error("first"));
        assert_eq!(rx.try_recv().unwrap().level, NoticeLevel::Info);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_channel_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::warning("nobody listening"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Notice::success("done").to_string(), "[success] done");
    }
}
