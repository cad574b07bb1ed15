use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::{ParseReport, ParserError};
use crate::compiler::token::{Token, TokenKind};
use crate::kit::channel::TokenChannel;
use crate::kit::diagnostics::{DiagnosticRecord, DiagnosticSink, DiagnosticStack, Severity};

const TARGET: &str = "basilisk::parser";

/// 语法器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// 列表之外，或刚处理完一个括号
    All,
    /// 列表已打开，等待操作符
    List,
    /// 操作符之后，读取参数
    Op,
}

/// 语法器
pub struct ParserEngine {
    channel: Arc<TokenChannel>,
    sink: DiagnosticSink,
    pending: DiagnosticStack,
    source_name: String,
    state: ParseState,
    depth: usize,
    /// 每层打开的列表目前的参数个数
    arity: Vec<usize>,
    /// 下一个 token 是 backup 之后的重读
    replay: bool,
    consumed: usize,
    lists: usize,
    reported: usize,
}

impl ParserEngine {
    pub fn new(
        channel: Arc<TokenChannel>,
        sink: DiagnosticSink,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            sink,
            pending: DiagnosticStack::new(),
            source_name: source_name.into(),
            state: ParseState::All,
            depth: 0,
            arity: Vec::new(),
            replay: false,
            consumed: 0,
            lists: 0,
            reported: 0,
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// 消费 token 直到 `End`
    pub fn run(mut self) -> Result<ParseReport, ParserError> {
        debug!(target: TARGET, source = %self.source_name, "Parser started");

        loop {
            let token = self.channel.next()?;
            if !std::mem::take(&mut self.replay) {
                self.consumed += 1;
            }
            trace!(target: TARGET, state = ?self.state, %token, "Consume");

            let done = token.kind == TokenKind::End;
            self.step(token)?;
            self.flush_diagnostics()?;
            if done {
                break;
            }
        }

        let report = ParseReport {
            tokens_consumed: self.consumed,
            lists_parsed: self.lists,
            final_depth: self.depth,
            diagnostics: self.reported,
        };
        debug!(
            target: TARGET,
            tokens = report.tokens_consumed,
            lists = report.lists_parsed,
            depth = report.final_depth,
            "Parser finished"
        );
        Ok(report)
    }

    fn step(&mut self, token: Token) -> Result<(), ParserError> {
        match token.kind {
            TokenKind::Err => {
                self.forward(token);
                return Ok(());
            }
            TokenKind::End => {
                self.finish(&token);
                return Ok(());
            }
            _ => {}
        }

        match (self.state, token.kind) {
            (ParseState::All, TokenKind::BeginList) => self.open_list(),
            (ParseState::All, TokenKind::EndList) => self.close_list(&token),
            (ParseState::List, TokenKind::Op) => self.transition(ParseState::Op),
            (ParseState::Op, kind) if kind.is_argument() => {
                if let Some(count) = self.arity.last_mut() {
                    *count += 1;
                }
            }
            // 括号交给 All 处理；List 中出现说明操作符缺失，词法器已经报过
            (ParseState::List | ParseState::Op, TokenKind::BeginList | TokenKind::EndList) => {
                self.channel.backup()?;
                self.replay = true;
                self.transition(ParseState::All);
            }
            _ => {}
        }
        Ok(())
    }

    fn open_list(&mut self) {
        // 嵌套列表算作外层列表的一个参数
        if let Some(count) = self.arity.last_mut() {
            *count += 1;
        }
        self.arity.push(0);
        self.depth += 1;
        self.transition(ParseState::List);
    }

    fn close_list(&mut self, token: &Token) {
        if self.depth == 0 {
            self.diagnose(Severity::Error, token, "too many parens".to_string());
            self.transition(ParseState::All);
            return;
        }

        self.depth -= 1;
        self.lists += 1;
        let arity = self.arity.pop().unwrap_or_default();
        trace!(target: TARGET, arity, depth = self.depth, "List closed");

        if self.depth == 0 {
            self.transition(ParseState::All);
        } else {
            self.transition(ParseState::Op);
        }
    }

    fn finish(&mut self, end: &Token) {
        if self.depth > 0 {
            let lists = if self.depth == 1 { "list" } else { "lists" };
            self.diagnose(
                Severity::Error,
                end,
                format!("unexpected end of input: {} unclosed {}", self.depth, lists),
            );
        }
    }

    /// 转发来的词法诊断
    fn forward(&mut self, token: Token) {
        match token.diagnostic {
            Some(record) => self.pending.push(*record),
            None => {
                let message = token.text.clone();
                self.diagnose(Severity::Error, &token, message);
            }
        }
    }

    fn diagnose(&mut self, severity: Severity, token: &Token, message: String) {
        self.pending.push(DiagnosticRecord::new(
            severity,
            self.source_name.as_str(),
            token.line,
            token.column,
            message,
        ));
    }

    fn flush_diagnostics(&mut self) -> Result<(), ParserError> {
        let flushed = self.pending.flush(&self.sink)?;
        self.reported += flushed.reported;
        if flushed.limit_exceeded {
            let max = self.sink.counter.max();
            warn!(target: TARGET, max, "Diagnostic limit exceeded");
            // 唤醒可能阻塞在有界通道上的词法器
            self.channel.close()?;
            return Err(ParserError::DiagnosticLimit { max });
        }
        Ok(())
    }

    fn transition(&mut self, next: ParseState) {
        if self.state != next {
            trace!(target: TARGET, from = ?self.state, to = ?next, "Transition");
            self.state = next;
        }
    }
}
