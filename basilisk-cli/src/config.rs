//! CLI 配置
//!
//! 配置文件（JSON）先加载，再叠加命令行参数；另外把日志配置转换成 `tracing` 的级别。

use std::path::Path;

use basilisk_config::{BasiliskConfig, LogLevel, LoggingConfig, OverflowPolicy, Phase};
use tracing::Level;

use crate::Cli;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub lexer: Option<Level>,
    pub parser: Option<Level>,
    pub pipeline: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            lexer: None,
            parser: None,
            pipeline: None,
        }
    }
}

impl LogConfig {
    pub fn from_logging(logging: &LoggingConfig) -> Self {
        Self {
            global: to_level(logging.level),
            lexer: logging.lexer.map(to_level),
            parser: logging.parser.map(to_level),
            pipeline: logging.pipeline.map(to_level),
        }
    }

    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        match phase {
            Phase::Lexer => self.lexer.unwrap_or(self.global),
            Phase::Parser => self.parser.unwrap_or(self.global),
            Phase::Pipeline => self.pipeline.unwrap_or(self.global),
            Phase::Cli => self.global,
        }
    }
}

fn to_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Read the config file (if any) and apply command-line overrides
pub fn load(cli: &Cli) -> Result<BasiliskConfig, String> {
    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => BasiliskConfig::default(),
    };
    apply_overrides(&mut config, cli)?;
    Ok(config)
}

fn read_config_file(path: &Path) -> Result<BasiliskConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    serde_json::from_str(&content).map_err(|e| format!("invalid config '{}': {}", path.display(), e))
}

fn apply_overrides(config: &mut BasiliskConfig, cli: &Cli) -> Result<(), String> {
    let pipeline = &mut config.pipeline;

    if let Some(max) = cli.max_diagnostics {
        pipeline.diagnostics.max_diagnostics = max;
    }
    if cli.no_color {
        pipeline.diagnostics.color = false;
    }
    if let Some(route) = cli.route {
        pipeline.lexer.route = route.into();
    }
    if let Some(capacity) = cli.channel_capacity {
        pipeline.channel.capacity = Some(capacity);
    }
    if cli.reject_on_full {
        pipeline.channel.overflow = OverflowPolicy::Reject;
    }

    if let Some(level) = &cli.log_level {
        config.logging.level =
            LogLevel::parse(level).ok_or_else(|| format!("unknown log level '{level}'"))?;
    }
    if let Some(file) = &cli.log_file {
        config.logging.file = Some(file.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use basilisk_config::DiagnosticRoute;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("basilisk").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = load(&parse(&[])).unwrap();
        assert_eq!(config, BasiliskConfig::default());
    }

    #[test]
    fn test_flag_overrides() {
        let cli = parse(&[
            "--max-diagnostics",
            "3",
            "--route",
            "direct",
            "--channel-capacity",
            "64",
            "--reject-on-full",
            "--no-color",
            "--log-level",
            "debug",
            "input.bsk",
        ]);
        let config = load(&cli).unwrap();

        assert_eq!(cli.file.as_deref(), Some(Path::new("input.bsk")));
        assert_eq!(config.pipeline.diagnostics.max_diagnostics, 3);
        assert!(!config.pipeline.diagnostics.color);
        assert_eq!(config.pipeline.lexer.route, DiagnosticRoute::Direct);
        assert_eq!(config.pipeline.channel.capacity, Some(64));
        assert_eq!(config.pipeline.channel.overflow, OverflowPolicy::Reject);
        assert_eq!(config.logging.level, LogLevel::Debug);
    }

    #[test]
    fn test_unknown_log_level() {
        let err = load(&parse(&["--log-level", "loud"])).unwrap_err();
        assert_eq!(err, "unknown log level 'loud'");
    }

    #[test]
    fn test_missing_config_file() {
        let err = load(&parse(&["--config", "/nonexistent/basilisk.json"])).unwrap_err();
        assert!(err.starts_with("cannot read '/nonexistent/basilisk.json'"));
    }

    #[test]
    fn test_log_config_levels() {
        let logging = LoggingConfig {
            level: LogLevel::Info,
            parser: Some(LogLevel::Trace),
            ..LoggingConfig::default()
        };
        let log_config = LogConfig::from_logging(&logging);

        assert_eq!(log_config.level_for(Phase::Lexer), Level::INFO);
        assert_eq!(log_config.level_for(Phase::Parser), Level::TRACE);
        assert_eq!(LogConfig::default().global, Level::WARN);
    }
}
