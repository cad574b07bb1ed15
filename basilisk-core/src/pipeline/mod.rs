//! 词法器/语法器流水线
//!
//! 两个工作线程通过同一个 `TokenChannel` 连接，共享计数器和诊断输出流；
//! 两个线程都 join 之后共享资源才被释放。

pub mod supervisor;

pub use supervisor::PipelineSupervisor;

use std::io;
use thiserror::Error;

use crate::compiler::lexer::LexerError;
use crate::compiler::parser::ParserError;

/// 流水线错误
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{0} thread panicked")]
    WorkerPanicked(&'static str),

    #[error("Lexer failed: {0}")]
    Lexer(#[from] LexerError),

    #[error("Parser failed: {0}")]
    Parser(#[from] ParserError),

    /// errors + warnings 超过上限，运行已中止
    #[error("too many errors (limit {max})")]
    DiagnosticLimit {
        max: usize,
        errors: usize,
        warnings: usize,
    },
}

/// 一次完整运行的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub tokens_produced: usize,
    pub tokens_consumed: usize,
    pub lists_parsed: usize,
    /// 输入结束时未闭合的列表数
    pub final_depth: usize,
    pub errors: usize,
    pub warnings: usize,
}
