//! Tutor - 并排学习编程语言
//!
//! 入口：解析命令行、加载配置、初始化日志，按路由创建课程会话并运行 TUI。

use anyhow::Context;
use clap::Parser;
use tutor::cli::Cli;
use tutor::config::{load_config, AppConfig};
use tutor::core::SessionBuilder;
use tutor::ui::run_app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (cfg, config_err) = match load_config(cli.config.clone()) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    tutor::observability::init(Some(&cfg.app.data_dir().join("tutor.log")));
    if let Some(e) = config_err {
        tracing::warn!("Config load failed ({}), using defaults", e);
    }

    let builder = SessionBuilder::new(cfg).with_system_prompt_from_file();
    let flow = cli.flow(&builder);
    tracing::info!(flow = %flow, "Starting lesson");

    let (cmd_tx, view_rx, handle) = builder.spawn(flow);
    let outcome = run_app(cmd_tx, view_rx, handle)
        .await
        .context("Lesson run failed")?;

    if let Some(progress) = outcome.progress {
        let store = progress.store();
        tracing::info!(
            points = store.total_points,
            streak = store.streak.current,
            "Progress saved"
        );
    }
    Ok(())
}
