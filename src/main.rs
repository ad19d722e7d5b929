use std::path::PathBuf;

use anyhow::{Context, Result};

use summary_session::app::{App, RunOptions};
use summary_session::models::Language;
use summary_session::utils::logging;
use summary_session::Config;

const USAGE: &str = "用法: summary-session <file> [--hindi] [--translate] [--dictionary]";

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let mut config = Config::load().context("加载配置失败")?;

    // 解析命令行参数
    let mut file = None;
    let mut translate = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--hindi" => config.default_language = Language::Hindi,
            "--translate" => translate = true,
            "--dictionary" => config.translation_mode = summary_session::TranslationMode::Dictionary,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other if file.is_none() => file = Some(PathBuf::from(other)),
            other => anyhow::bail!("未知参数: {}\n{}", other, USAGE),
        }
    }
    let file = file.context(USAGE)?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    app.run(&RunOptions { file, translate }).await?;

    Ok(())
}
