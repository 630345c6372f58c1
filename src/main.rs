use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use state_lottery::{
    AppError, AppResult,
    config::{Config, SourceKind},
    database::{DbPool, create_pool, run_migrations},
    external::{CandidateSource, RandomDataApi, SyntheticSource},
    services::{DrawOptions, DrawService, ReportService, SeaOrmWinnerStore, WinnerStore},
    utils::TokioPause,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stderr)
        .init();

    // 加载配置
    let config = Config::from_toml().context("Failed to load configuration")?;

    // 创建数据库连接
    let pool = create_pool(&config.database)
        .await
        .context("Failed to open winners database")?;

    let result = run(&config, pool.clone()).await;

    // 无论成功失败都关闭连接
    if let Err(e) = pool.close().await {
        log::warn!("Failed to close database connection: {e}");
    }

    match result {
        Ok(report) => {
            print!("{report}");
            Ok(())
        }
        Err(e) => {
            log::error!("Draw failed: {e}");
            Err(e.into())
        }
    }
}

async fn run(config: &Config, pool: DbPool) -> AppResult<String> {
    run_migrations(&pool).await?;

    let store: Arc<dyn WinnerStore> = Arc::new(SeaOrmWinnerStore::new(pool));
    let source: Arc<dyn CandidateSource> = match config.source.kind {
        SourceKind::Http => Arc::new(RandomDataApi::new(config.source.clone())?),
        SourceKind::Synthetic => Arc::new(SyntheticSource::new()),
    };

    let draw_service = DrawService::new(
        source,
        store.clone(),
        Arc::new(TokioPause),
        DrawOptions::from(&config.draw),
    );

    tokio::select! {
        summary = draw_service.draw(config.draw.quota) => {
            summary?;
        }
        _ = tokio::signal::ctrl_c() => {
            log::warn!("Interrupted, stopping draw");
            return Err(AppError::Cancelled);
        }
    }

    ReportService::new(store).report(config.report.format).await
}
