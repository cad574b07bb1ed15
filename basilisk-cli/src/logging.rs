//! CLI 日志系统初始化
//!
//! 基于 `tracing-subscriber` 实现分阶段日志控制。日志写到 stderr，
//! stdout 留给 token 流。

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use basilisk_config::Phase;
use tracing_subscriber::{
    filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

use crate::config::LogConfig;

/// 日志输出格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// 彩色格式化（开发使用）
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式（工具集成）
    Json,
}

/// 每个阶段一个 target
fn build_targets(log_config: &LogConfig) -> Targets {
    [Phase::Lexer, Phase::Parser, Phase::Pipeline, Phase::Cli]
        .into_iter()
        .fold(Targets::new().with_default(log_config.global), |targets, phase| {
            targets.with_target(phase.target(), log_config.level_for(phase))
        })
}

/// 使用指定格式和日志配置初始化日志系统
///
/// 指定了 `file` 时，日志同时追加写入该文件（无 ANSI 颜色）。
pub fn init_with_file(
    log_config: &LogConfig,
    format: LogFormat,
    file: Option<&Path>,
) -> Result<(), String> {
    let targets = build_targets(log_config);

    let file_layer = match file {
        Some(path) => {
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("cannot open log file '{}': {}", path.display(), e))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(handle))
                    .with_filter(targets.clone()),
            )
        }
        None => None,
    };

    let stderr_layer = create_format_layer(format, io::stderr).with_filter(targets);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| format!("cannot initialize logging: {e}"))
}

/// Create formatter layer based on format
fn create_format_layer<W, F>(
    format: LogFormat,
    make_writer: F,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: io::Write + Send + Sync + 'static,
    F: Fn() -> W + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .without_time()
            .with_writer(make_writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_timer(fmt::time::time())
            .with_writer(make_writer)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_targets_follow_phase_levels() {
        let log_config = LogConfig {
            global: Level::WARN,
            lexer: Some(Level::TRACE),
            ..LogConfig::default()
        };
        let targets = build_targets(&log_config);

        assert!(targets.would_enable("basilisk::lexer", &Level::TRACE));
        assert!(!targets.would_enable("basilisk::parser", &Level::INFO));
        assert!(targets.would_enable("basilisk::parser", &Level::WARN));
        assert_eq!(targets.default_level(), Some(LevelFilter::WARN));
    }
}
