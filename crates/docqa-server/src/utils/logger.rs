use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    // RUST_LOG wins over the configured level
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone());
    let filter = EnvFilter::try_new(&log_level)?;

    // logs/<dir>/docqa.YYYY-MM-DD.log, daily rotation
    let file_appender = match &config.directory {
        Some(dir) => Some(
            RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("docqa")
                .filename_suffix("log")
                .build(dir)?,
        ),
        None => None,
    };

    match config.format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_appender.map(|appender| {
                    fmt::layer()
                        .json()
                        .with_writer(appender)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true)
                }))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stdout)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(false),
                )
                .with(file_appender.map(|appender| {
                    fmt::layer()
                        .with_writer(appender)
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false)
                }))
                .try_init()?;
        }
    }

    Ok(())
}
