//! 词法器状态机
//!
//! | 状态 | 行为 |
//! |------|------|
//! | List | `(` 发出 BeginList 进入 Op；`)` 发出 EndList；分隔符发出 Separator；其他字符报错并丢弃 |
//! | Op   | 累积操作符字符，遇到其他字节回退并发出 Op，进入 Atom |
//! | Atom | 括号回退交给 List；数字进入 Num；引号进入 Char/Str；其他报错并丢弃 |
//! | Num  | 累积数字，遇到其他字节回退并发出 Num |
//! | Char/Str | 累积到配对引号，发出不含引号的文本 |

use std::sync::Arc;

use basilisk_config::{DiagnosticRoute, LexerConfig};
use tracing::{debug, trace, warn};

use super::state::{is_delimiter, is_op_char, is_separator, LexState};
use super::{LexReport, LexerError};
use crate::compiler::token::{Token, TokenKind, TokenWriter};
use crate::kit::channel::TokenChannel;
use crate::kit::diagnostics::{
    DiagnosticRecord, DiagnosticSink, DiagnosticSpan, DiagnosticStack, Severity,
};
use crate::kit::source::{ByteSource, SourceCursor};

const TARGET: &str = "basilisk::lexer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Eof,
}

/// 词法器
pub struct LexerEngine<S: ByteSource> {
    cursor: SourceCursor<S>,
    state: LexState,
    channel: Arc<TokenChannel>,
    sink: DiagnosticSink,
    route: DiagnosticRoute,
    pending: DiagnosticStack,
    source_name: String,
    tokens: Option<TokenWriter>,
    produced: usize,
    reported: usize,
}

impl<S: ByteSource> LexerEngine<S> {
    pub fn new(
        source: S,
        source_name: impl Into<String>,
        config: &LexerConfig,
        channel: Arc<TokenChannel>,
        sink: DiagnosticSink,
    ) -> Self {
        Self {
            cursor: SourceCursor::new(source, config.initial_capacity, config.grow_chunk),
            state: LexState::List,
            channel,
            sink,
            route: config.route,
            pending: DiagnosticStack::new(),
            source_name: source_name.into(),
            tokens: None,
            produced: 0,
            reported: 0,
        }
    }

    /// 把推入通道的每个 token 同时按线路格式写出
    pub fn with_token_writer(mut self, writer: TokenWriter) -> Self {
        self.tokens = Some(writer);
        self
    }

    pub fn state(&self) -> LexState {
        self.state
    }

    /// 运行到输入结束，最后推入 `End`
    pub fn run(mut self) -> Result<LexReport, LexerError> {
        debug!(target: TARGET, source = %self.source_name, route = ?self.route, "Lexer started");

        loop {
            let step = self.step()?;
            self.flush_diagnostics()?;
            if step == Step::Eof {
                break;
            }
        }

        let end = Token::new(TokenKind::End, self.cursor.line(), self.cursor.column(), "");
        self.push(end)?;
        if let Some(writer) = self.tokens.as_mut() {
            writer.flush().map_err(LexerError::TokenOutput)?;
        }

        let report = LexReport {
            tokens_produced: self.produced,
            diagnostics: self.reported,
            paren_depth: self.cursor.paren_depth(),
        };
        debug!(
            target: TARGET,
            tokens = report.tokens_produced,
            diagnostics = report.diagnostics,
            depth = report.paren_depth,
            "Lexer finished"
        );
        Ok(report)
    }

    fn step(&mut self) -> Result<Step, LexerError> {
        let Some(byte) = self.cursor.next()? else {
            self.finish_input()?;
            return Ok(Step::Eof);
        };
        trace!(target: TARGET, state = ?self.state, byte = ?char::from(byte), "Step");

        match self.state {
            LexState::List => self.lex_list(byte)?,
            LexState::Op => self.lex_op(byte)?,
            LexState::Atom => self.lex_atom(byte)?,
            LexState::Num => self.lex_num(byte)?,
            LexState::Char => self.lex_literal(byte, b'\'', TokenKind::Char)?,
            LexState::Str => self.lex_literal(byte, b'"', TokenKind::Str)?,
        }
        Ok(Step::Continue)
    }

    fn lex_list(&mut self, byte: u8) -> Result<(), LexerError> {
        match byte {
            b'(' => {
                self.emit(TokenKind::BeginList)?;
                self.cursor.open_list();
                self.transition(LexState::Op);
            }
            b')' => self.close_list()?,
            b if is_separator(b) => self.emit(TokenKind::Separator)?,
            _ => {
                self.skip_run()?;
                let text = self.cursor.unemitted_text();
                self.diagnose(
                    Severity::Error,
                    format!("\"{}\" outside of a list", text.escape_debug()),
                );
                self.cursor.dump();
            }
        }
        Ok(())
    }

    fn close_list(&mut self) -> Result<(), LexerError> {
        if self.cursor.close_list() {
            self.emit(TokenKind::EndList)?;
            // 仍在外层列表里时回到外层的参数位置
            if self.cursor.paren_depth() > 0 {
                self.transition(LexState::Atom);
            } else {
                self.transition(LexState::List);
            }
        } else {
            self.diagnose(Severity::Error, "too many parens");
            self.cursor.dump();
            self.transition(LexState::List);
        }
        Ok(())
    }

    fn lex_op(&mut self, byte: u8) -> Result<(), LexerError> {
        if is_op_char(byte) {
            return Ok(());
        }
        self.cursor.backup()?;
        if self.cursor.unemitted() {
            self.emit(TokenKind::Op)?;
        } else {
            self.diagnose(Severity::Error, "list missing an operator");
        }
        self.transition(LexState::Atom);
        Ok(())
    }

    fn lex_atom(&mut self, byte: u8) -> Result<(), LexerError> {
        match byte {
            b'(' | b')' => {
                self.cursor.backup()?;
                self.transition(LexState::List);
            }
            b if is_separator(b) => self.emit(TokenKind::Separator)?,
            b if b.is_ascii_digit() => self.transition(LexState::Num),
            b'\'' => {
                self.cursor.dump();
                self.transition(LexState::Char);
            }
            b'"' => {
                self.cursor.dump();
                self.transition(LexState::Str);
            }
            b => {
                self.skip_run()?;
                let text = self.cursor.unemitted_text();
                let text = text.escape_debug();
                let message = if is_op_char(b) {
                    format!("invalid argument \"{text}\"")
                } else {
                    format!("unrecognized character \"{text}\"")
                };
                self.diagnose(Severity::Error, message);
                self.cursor.dump();
            }
        }
        Ok(())
    }

    fn lex_num(&mut self, byte: u8) -> Result<(), LexerError> {
        if byte.is_ascii_digit() {
            return Ok(());
        }
        self.cursor.backup()?;
        if self.cursor.unemitted() {
            self.emit(TokenKind::Num)?;
        } else {
            self.diagnose(Severity::Error, "not a number");
        }
        self.transition(LexState::Atom);
        Ok(())
    }

    fn lex_literal(&mut self, byte: u8, quote: u8, kind: TokenKind) -> Result<(), LexerError> {
        if byte != quote {
            return Ok(());
        }

        // 先把闭合引号退回去，发出的文本不含引号
        self.cursor.backup()?;
        if self.cursor.unemitted() {
            if kind == TokenKind::Char && self.cursor.unemitted_text().chars().count() > 1 {
                self.diagnose(Severity::Warning, "multi-character character literal");
            }
            self.emit(kind)?;
        } else {
            let message = match kind {
                TokenKind::Char => "empty character literal",
                _ => "empty string literal",
            };
            self.diagnose(Severity::Error, message);
        }
        self.cursor.next()?;
        self.cursor.dump();
        self.transition(LexState::Atom);
        Ok(())
    }

    /// 输入结束：发出未完成的操作符/数字，报告未闭合的字面量
    fn finish_input(&mut self) -> Result<(), LexerError> {
        match self.state {
            LexState::Op if self.cursor.unemitted() => self.emit(TokenKind::Op)?,
            LexState::Num if self.cursor.unemitted() => self.emit(TokenKind::Num)?,
            LexState::Char => {
                self.diagnose(Severity::Error, "unterminated character literal");
                self.cursor.dump();
            }
            LexState::Str => {
                self.diagnose(Severity::Error, "unterminated string literal");
                self.cursor.dump();
            }
            _ => {}
        }
        if self.cursor.paren_depth() > 0 {
            debug!(target: TARGET, depth = self.cursor.paren_depth(), "Input ended inside a list");
        }
        Ok(())
    }

    /// 读到分隔符或括号为止，把整段无效字符留在未发出区间
    fn skip_run(&mut self) -> Result<(), LexerError> {
        while let Some(byte) = self.cursor.next()? {
            if is_delimiter(byte) {
                self.cursor.backup()?;
                break;
            }
        }
        Ok(())
    }

    /// 针对未发出区间记录一条诊断，`^` 指向区间最后一个字节
    fn diagnose(&mut self, severity: Severity, message: impl Into<String>) {
        let length = self.cursor.unemitted_len();
        let single_line = !self.cursor.unemitted_text().contains('\n');
        let (column, underline_count) = if length > 0 && single_line {
            (self.cursor.column() + length - 1, length - 1)
        } else {
            (self.cursor.column(), 0)
        };

        let record = DiagnosticRecord::new(
            severity,
            self.source_name.as_str(),
            self.cursor.line(),
            column,
            message,
        )
        .with_span(DiagnosticSpan {
            line_text: self.cursor.line_text(),
            span_length: length,
            underline_count,
        });
        trace!(target: TARGET, diagnostic = %record, "Recorded");
        self.pending.push(record);
    }

    fn flush_diagnostics(&mut self) -> Result<(), LexerError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        match self.route {
            DiagnosticRoute::Forward => {
                let records = self.pending.drain();
                self.reported += records.len();
                for record in records {
                    self.push(Token::from_diagnostic(record))?;
                }
            }
            DiagnosticRoute::Direct => {
                let flushed = self.pending.flush(&self.sink)?;
                self.reported += flushed.reported;
                if flushed.limit_exceeded {
                    let max = self.sink.counter.max();
                    warn!(target: TARGET, max, "Diagnostic limit exceeded");
                    return Err(LexerError::DiagnosticLimit { max });
                }
            }
        }
        Ok(())
    }

    fn emit(&mut self, kind: TokenKind) -> Result<(), LexerError> {
        let token = self.cursor.emit(kind);
        self.push(token)
    }

    fn push(&mut self, token: Token) -> Result<(), LexerError> {
        trace!(target: TARGET, %token, "Push");
        if let Some(writer) = self.tokens.as_mut() {
            writer.write(&token).map_err(LexerError::TokenOutput)?;
        }
        self.channel.push(token)?;
        self.produced += 1;
        Ok(())
    }

    fn transition(&mut self, next: LexState) {
        if self.state != next {
            trace!(target: TARGET, from = ?self.state, to = ?next, "Transition");
            self.state = next;
        }
    }
}
