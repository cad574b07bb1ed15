//! 语法器
//!
//! 消费 token 的状态机，只做结构校验（括号配对、操作符位置、参数类型），不构建 AST。

pub mod engine;

pub use engine::{ParseState, ParserEngine};

use thiserror::Error;

use crate::kit::channel::ChannelError;
use crate::kit::diagnostics::DiagnosticError;

/// 语法器错误
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("Token channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Diagnostic error: {0}")]
    Diagnostic(#[from] DiagnosticError),

    #[error("Too many diagnostics (limit {max})")]
    DiagnosticLimit { max: usize },
}

/// 语法器运行结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// 读取的 token 数（回退后重读的不重复计数）
    pub tokens_consumed: usize,
    /// 正常闭合的列表数
    pub lists_parsed: usize,
    /// 读到 `End` 时仍未闭合的列表数
    pub final_depth: usize,
    /// 渲染的诊断条数（含转发来的词法诊断）
    pub diagnostics: usize,
}
