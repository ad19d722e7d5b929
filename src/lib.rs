//! # Summary Session
//!
//! 文档摘要客户端的会话控制核心：免费试用计数、凭证管理、分析状态机、翻译级联与失败兜底
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 设备本地的键值存储，只暴露 get/set/remove 能力
//! - `MemoryStore`（测试）/ `FileStore`（JSON 文件）
//!
//! ### ② 远程接口层（Clients）
//! - `clients/` - `SummaryBackend` / `AuthBackend` trait 与基于 reqwest 的 `ApiClient`
//!
//! ### ③ 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程顺序
//! - `CredentialStore` - 持有并附加 Bearer 凭证
//! - `TrialQuota` - 免费试用计数（0..15）
//! - `TranslationCascade` - 远程整体 → 远程逐字段 → 本地词典
//! - `failure_classifier` / `sample_summary` - 失败分类与示例摘要
//! - `AuthService` / `Notifier` - 登录状态与用户提示
//!
//! ### ④ 流程层（Workflow）
//! - `workflow/attempt` - 纯状态机 `reduce(state, event) -> (state', effect)`
//! - `workflow/session` - `AnalysisSession` 执行副作用并送回结果事件
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{ApiClient, AuthBackend, SummaryBackend};
pub use config::Config;
pub use error::{AppError, AppResult, ErrorInfo, ErrorKind, RemoteFailure};
pub use infrastructure::{FileStore, KvStore, MemoryStore};
pub use models::{Language, SelectedDocument, SummaryRecord, TranslationMode};
pub use services::{AuthService, CredentialStore, Notice, Notifier, TrialQuota};
pub use workflow::{AnalysisAttempt, AnalysisSession, AttemptStatus};
