//! Basilisk Core - concurrent lexer/parser pipeline
//!
//! Tokenizes and structurally validates a small parenthesized expression language.
//! The lexer and the parser run on two threads connected by a shared token channel;
//! lexical diagnostics travel through the same channel as synthetic error tokens.
//!
//! Configuration is passed explicitly via parameters, not via global state.
//! Diagnostics are written to the stream owned by the caller's [`DiagnosticEmitter`].

pub mod compiler;
pub mod kit;
pub mod pipeline;

// Re-export common types
pub use compiler::token::{Token, TokenKind, TokenWriter};
pub use kit::channel::{ChannelError, TokenChannel};
pub use kit::diagnostics::{DiagnosticEmitter, DiagnosticRecord, Severity};
pub use pipeline::{PipelineError, PipelineReport, PipelineSupervisor};

// Re-export config types from basilisk-config
pub use basilisk_config::{DiagnosticRoute, InputSource, OverflowPolicy, Phase, PipelineConfig};
