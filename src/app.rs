use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clients::ApiClient;
use crate::config::Config;
use crate::infrastructure::{FileStore, KvStore};
use crate::models::{SelectedDocument, SummaryRecord};
use crate::services::{AuthService, CredentialStore, TracingNotifier, TrialQuota};
use crate::utils::logging::log_startup;
use crate::workflow::{AnalysisAttempt, AnalysisSession, AttemptStatus};

/// 命令行一次运行的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub file: PathBuf,
    /// 分析完成后切换到译文
    pub translate: bool,
}

/// 应用主结构
pub struct App {
    auth: AuthService,
    session: AnalysisSession,
}

impl App {
    /// 初始化应用：本地存储 → 凭证 → 后端客户端 → 会话
    pub async fn initialize(config: Config) -> Result<Self> {
        let store: Arc<dyn KvStore> = Arc::new(FileStore::new(&config.store_path));
        let credentials = Arc::new(CredentialStore::new(store.clone()));
        let client = Arc::new(
            ApiClient::new(&config, credentials.clone()).context("无法创建后端客户端")?,
        );

        let auth = AuthService::new(client.clone(), credentials.clone());
        if let Some(user) = auth.restore().await.context("恢复登录状态失败")? {
            info!("👤 当前用户: {}", user);
        }

        let quota = TrialQuota::new(store);
        log_startup(&config, quota.remaining());

        let session = AnalysisSession::new(config, client, credentials, quota, Arc::new(TracingNotifier));
        Ok(Self { auth, session })
    }

    /// 分析一个文件，可选地切换到译文，并打印最终显示的摘要
    pub async fn run(&self, options: &RunOptions) -> Result<()> {
        let document = SelectedDocument::from_path(&options.file)
            .await
            .with_context(|| format!("无法读取文件 {}", options.file.display()))?;

        if self.auth.is_authenticated() {
            info!("🔐 已登录，使用保存文档的流程");
        } else {
            info!("🎫 匿名试用，剩余 {} 次", self.session.remaining_trials());
        }

        let attempt = self.session.select_document(document);
        if attempt.status != AttemptStatus::Selecting {
            anyhow::bail!("文件未通过校验: {}", error_message(&attempt));
        }

        let attempt = self.session.submit().await;
        let attempt = match attempt.status {
            AttemptStatus::Result if options.translate => self.session.toggle_language().await,
            AttemptStatus::Result | AttemptStatus::Failed => attempt,
            other => {
                warn!("分析未完成，当前状态: {}", other);
                attempt
            }
        };

        match attempt.displayed() {
            Some(record) => print_record(record, attempt.result.as_ref().is_some_and(|v| v.is_sample))?,
            None => anyhow::bail!("分析失败: {}", error_message(&attempt)),
        }

        Ok(())
    }
}

fn error_message(attempt: &AnalysisAttempt) -> String {
    attempt
        .error
        .as_ref()
        .map(|e| format!("[{}] {}", e.kind, e.message))
        .unwrap_or_else(|| "unknown error".to_string())
}

fn print_record(record: &SummaryRecord, is_sample: bool) -> Result<()> {
    if is_sample {
        warn!("⚠️ 以下为示例数据，不是根据你的文档生成的");
    }
    let json = serde_json::to_string_pretty(record).context("摘要序列化失败")?;
    println!("{}", json);
    Ok(())
}
