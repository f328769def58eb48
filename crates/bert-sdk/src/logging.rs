//! 日志初始化
//!
//! `tracing-subscriber` 输出，`RUST_LOG` 控制过滤；
//! 依赖 `log` 的第三方库的日志经 `tracing-log` 转发。

use tracing_subscriber::EnvFilter;

/// 初始化日志；重复调用时静默忽略
pub fn init_logger() {
    if let Err(e) = try_init_logger("info") {
        tracing::debug!("Logger already initialized: {}", e);
    }
}

/// 初始化日志，`RUST_LOG` 未设置时使用 `default_directive`（如 `"bert_driver=debug"`）
pub fn try_init_logger(default_directive: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::builder()
        .with_max_level(log::LevelFilter::Trace)
        .init()?;
    Ok(())
}
