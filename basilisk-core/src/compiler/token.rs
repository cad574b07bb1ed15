//! Token 定义和线路格式
//!
//! 每个 token 一条记录：`kind:line:column:text:`，`kind` 是数字编码。
//! `text` 不做转义，原子里出现冒号时记录有歧义。

use std::fmt;
use std::io::{self, Write};

use crate::kit::diagnostics::DiagnosticRecord;

/// Token 类型，带稳定的数字编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    End,
    Err,
    BeginList,
    EndList,
    Separator,
    Op,
    Num,
    Char,
    Str,
}

impl TokenKind {
    /// 线路格式中的数字编码
    pub fn code(&self) -> i32 {
        match self {
            TokenKind::End => -1,
            TokenKind::Err => 0,
            TokenKind::BeginList => 5,
            TokenKind::EndList => 6,
            TokenKind::Separator => 10,
            TokenKind::Op => 20,
            TokenKind::Num => 21,
            TokenKind::Char => 22,
            TokenKind::Str => 23,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        let kind = match code {
            -1 => TokenKind::End,
            0 => TokenKind::Err,
            5 => TokenKind::BeginList,
            6 => TokenKind::EndList,
            10 => TokenKind::Separator,
            20 => TokenKind::Op,
            21 => TokenKind::Num,
            22 => TokenKind::Char,
            23 => TokenKind::Str,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::End => "End",
            TokenKind::Err => "Err",
            TokenKind::BeginList => "BeginList",
            TokenKind::EndList => "EndList",
            TokenKind::Separator => "Separator",
            TokenKind::Op => "Op",
            TokenKind::Num => "Num",
            TokenKind::Char => "Char",
            TokenKind::Str => "Str",
        }
    }

    /// 可以作为列表参数的原子
    pub fn is_argument(&self) -> bool {
        matches!(self, TokenKind::Num | TokenKind::Char | TokenKind::Str)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Token
///
/// `text` 总是独立的拷贝，不引用游标缓冲区。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    pub text: String,
    /// 只有合成的 `Err` token 才携带
    pub diagnostic: Option<Box<DiagnosticRecord>>,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, column: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            text: text.into(),
            diagnostic: None,
        }
    }

    /// 把一条词法诊断包装成 `Err` token
    pub fn from_diagnostic(record: DiagnosticRecord) -> Self {
        Self {
            kind: TokenKind::Err,
            line: record.line,
            column: record.column,
            text: record.message.clone(),
            diagnostic: Some(Box::new(record)),
        }
    }

    /// 线路格式：`kind:line:column:text:`
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}:{}:",
            self.kind.code(),
            self.line,
            self.column,
            self.text
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?}) at {}:{}", self.kind, self.text, self.line, self.column)
    }
}

/// 把 token 按线路格式逐行写出
pub struct TokenWriter {
    writer: Box<dyn Write + Send>,
}

impl TokenWriter {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn write(&mut self, token: &Token) -> io::Result<()> {
        writeln!(self.writer, "{}", token.encode())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
