//! 词法器
//!
//! 在独立线程上逐字节运行的状态机，把 token 推入 [`TokenChannel`](crate::kit::channel::TokenChannel)。
//! 词法诊断先进入线程私有的 `DiagnosticStack`，每一步结束后刷出：
//! 转发模式下变成合成的 `Err` token，直连模式下直接渲染并计数。

pub mod engine;
pub mod state;

pub use engine::LexerEngine;
pub use state::LexState;

use std::io;
use thiserror::Error;

use crate::kit::channel::ChannelError;
use crate::kit::diagnostics::DiagnosticError;
use crate::kit::source::CursorError;

/// 词法器错误（不可恢复的部分；可恢复的问题都是诊断）
#[derive(Debug, Error)]
pub enum LexerError {
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),

    #[error("Token channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Diagnostic error: {0}")]
    Diagnostic(#[from] DiagnosticError),

    #[error("Failed to write token stream: {0}")]
    TokenOutput(#[source] io::Error),

    #[error("Too many diagnostics (limit {max})")]
    DiagnosticLimit { max: usize },
}

/// 词法器运行结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexReport {
    /// 推入通道的 token 数（含 `Err` 和 `End`）
    pub tokens_produced: usize,
    /// 产生的诊断条数
    pub diagnostics: usize,
    /// 输入结束时未闭合的 `(` 数量
    pub paren_depth: usize,
}
