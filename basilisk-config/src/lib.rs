//! Basilisk Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Basilisk crates.
//!
//! Every struct deserializes with `serde(default)`, so a config file only
//! needs to name the fields it overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, as read from a `basilisk.json` file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasiliskConfig {
    /// Lexer/parser pipeline configuration
    pub pipeline: PipelineConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Configuration consumed by the lexer/parser pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub diagnostics: DiagnosticConfig,
    pub channel: ChannelConfig,
    pub lexer: LexerConfig,
}

/// Diagnostic reporting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Errors + warnings allowed before the run aborts with a fatal diagnostic
    pub max_diagnostics: usize,
    /// Whether severity labels are rendered with ANSI colors
    pub color: bool,
}

/// Token channel configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Maximum number of unread tokens; `None` means unbounded
    pub capacity: Option<usize>,
    /// What the producer does when a bounded channel is full
    pub overflow: OverflowPolicy,
}

/// Backpressure policy for a bounded channel
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Producer waits until the consumer catches up
    #[default]
    Block,
    /// Push fails immediately
    Reject,
}

/// Lexer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerConfig {
    /// Initial size of the cursor buffer in bytes
    pub initial_capacity: usize,
    /// Bytes added each time the cursor buffer fills up
    pub grow_chunk: usize,
    /// Where lexical diagnostics go
    pub route: DiagnosticRoute,
}

/// Routing of lexical diagnostics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticRoute {
    /// Forward as synthetic error tokens through the token channel
    #[default]
    Forward,
    /// Render straight to the diagnostic stream from the lexer thread
    Direct,
}

/// Where the source text comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Name used as the prefix of every diagnostic
    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "stdin".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global default level
    pub level: LogLevel,
    /// Lexer level (None falls back to `level`)
    pub lexer: Option<LogLevel>,
    /// Parser level
    pub parser: Option<LogLevel>,
    /// Pipeline supervisor level
    pub pipeline: Option<LogLevel>,
    /// Optional log file, written in addition to stderr
    pub file: Option<PathBuf>,
}

/// Log level, mirrors `tracing::Level` without depending on it
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Pipeline,
    Cli,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Pipeline => "pipeline",
            Phase::Cli => "cli",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("basilisk::{}", self.as_str())
    }
}

impl LoggingConfig {
    /// Effective level of a phase: its own override, else the global level
    pub fn level_for(&self, phase: Phase) -> LogLevel {
        let specific = match phase {
            Phase::Lexer => self.lexer,
            Phase::Parser => self.parser,
            Phase::Pipeline => self.pipeline,
            Phase::Cli => None,
        };
        specific.unwrap_or(self.level)
    }
}

impl LogLevel {
    /// Parse a level name; "silent" is accepted as an alias of "error"
    pub fn parse(s: &str) -> Option<LogLevel> {
        match s.to_lowercase().as_str() {
            "silent" | "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            max_diagnostics: 10,
            color: true,
        }
    }
}

impl Default for LexerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 100,
            grow_chunk: 10,
            route: DiagnosticRoute::Forward,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
            lexer: None,
            parser: None,
            pipeline: None,
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pipeline_config() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.diagnostics.max_diagnostics, 10);
        assert_eq!(cfg.channel.capacity, None);
        assert_eq!(cfg.channel.overflow, OverflowPolicy::Block);
        assert_eq!(cfg.lexer.initial_capacity, 100);
        assert_eq!(cfg.lexer.grow_chunk, 10);
        assert_eq!(cfg.lexer.route, DiagnosticRoute::Forward);
    }

    #[test]
    fn test_phase_as_str() {
        assert_eq!(Phase::Lexer.as_str(), "lexer");
        assert_eq!(Phase::Pipeline.target(), "basilisk::pipeline");
    }

    #[test]
    fn test_log_level_for() {
        let cfg = LoggingConfig {
            level: LogLevel::Warn,
            lexer: Some(LogLevel::Debug),
            ..Default::default()
        };

        assert_eq!(cfg.level_for(Phase::Lexer), LogLevel::Debug);
        assert_eq!(cfg.level_for(Phase::Parser), LogLevel::Warn);
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("silent"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("loud"), None);
    }

    #[test]
    fn test_input_source_name() {
        assert_eq!(InputSource::Stdin.name(), "stdin");
        assert_eq!(InputSource::File(PathBuf::from("a.bsk")).name(), "a.bsk");
    }

    #[test]
    fn test_partial_json_overrides_defaults() {
        let json = r#"{
            "pipeline": {
                "diagnostics": { "max_diagnostics": 3 },
                "channel": { "capacity": 16, "overflow": "reject" },
                "lexer": { "route": "direct" }
            },
            "logging": { "level": "info" }
        }"#;
        let cfg: BasiliskConfig = serde_json::from_str(json).unwrap();

        assert_eq!(cfg.pipeline.diagnostics.max_diagnostics, 3);
        assert!(cfg.pipeline.diagnostics.color);
        assert_eq!(cfg.pipeline.channel.capacity, Some(16));
        assert_eq!(cfg.pipeline.channel.overflow, OverflowPolicy::Reject);
        assert_eq!(cfg.pipeline.lexer.route, DiagnosticRoute::Direct);
        assert_eq!(cfg.pipeline.lexer.grow_chunk, 10);
        assert_eq!(cfg.logging.level, LogLevel::Info);
    }
}
