//! 词法器读取游标
//!
//! 可增长的字节缓冲区，用 begin/end 两个标记划出"已读取但未发出"的区间：
//!
//! ```text
//!   buffer: [ 已发出 | begin .. 未发出 .. end | 空闲 ]
//! ```
//!
//! - `next` 推进 end，`emit` / `dump` 推进 begin
//! - 缓冲区满时按固定块增长，行内从不收缩
//! - 发出或丢弃跨过换行后，已完成的行被移出缓冲区，列号从新行重新计数
//!
//! 不变量：`buffer[..begin]` 中没有换行，缓冲区总是从 begin 所在行的行首开始，
//! 所以列号就是 `begin + 1`，每次发出的开销只与 token 长度有关。

use thiserror::Error;
use tracing::trace;

use super::byte_source::ByteSource;
use crate::compiler::token::{Token, TokenKind};

/// 游标错误
#[derive(Debug, Error)]
pub enum CursorError {
    /// begin == end，没有可回退的字符
    #[error("Invalid backup: no unemitted characters")]
    InvalidBackup,

    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}

/// 源代码读取游标
pub struct SourceCursor<S: ByteSource> {
    source: S,
    buffer: Vec<u8>,
    begin: usize,
    end: usize,
    grow_chunk: usize,
    /// `end` 所在的行号，1-based
    line_num: usize,
    /// `[begin, end)` 中的换行数
    pending_newlines: usize,
    /// 未闭合的 '(' 数量
    paren_depth: usize,
}

impl<S: ByteSource> SourceCursor<S> {
    /// 创建游标
    ///
    /// * `initial_capacity` - 初始缓冲区大小
    /// * `grow_chunk` - 每次增长的字节数
    pub fn new(source: S, initial_capacity: usize, grow_chunk: usize) -> Self {
        Self {
            source,
            buffer: vec![0; initial_capacity],
            begin: 0,
            end: 0,
            grow_chunk: grow_chunk.max(1),
            line_num: 1,
            pending_newlines: 0,
            paren_depth: 0,
        }
    }

    /// 读取下一个字节，流结束时返回 `None`
    pub fn next(&mut self) -> Result<Option<u8>, CursorError> {
        let Some(byte) = self.source.next_byte()? else {
            return Ok(None);
        };

        if self.end >= self.buffer.len() {
            let grown = self.buffer.len() + self.grow_chunk;
            trace!(target: "basilisk::lexer", capacity = grown, "Growing cursor buffer");
            self.buffer.resize(grown, 0);
        }

        self.buffer[self.end] = byte;
        self.end += 1;
        if byte == b'\n' {
            self.line_num += 1;
            self.pending_newlines += 1;
        }
        Ok(Some(byte))
    }

    /// 回退一个字符并把它推回字节源
    pub fn backup(&mut self) -> Result<(), CursorError> {
        if self.end == self.begin {
            return Err(CursorError::InvalidBackup);
        }
        self.end -= 1;
        let byte = self.buffer[self.end];
        if byte == b'\n' {
            self.line_num -= 1;
            self.pending_newlines -= 1;
        }
        self.source.pushback(byte);
        Ok(())
    }

    /// 把 `[begin, end)` 复制成一个新 Token，并前进 begin
    pub fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token::new(kind, self.line(), self.column(), self.unemitted_text());
        self.rebase();
        token
    }

    /// 丢弃 `[begin, end)`，不发出
    pub fn dump(&mut self) {
        self.rebase();
    }

    /// 是否有未发出的字符
    pub fn unemitted(&self) -> bool {
        self.end > self.begin
    }

    /// 未发出区间的文本（拷贝）
    pub fn unemitted_text(&self) -> String {
        String::from_utf8_lossy(&self.buffer[self.begin..self.end]).into_owned()
    }

    /// 未发出区间的字节数
    pub fn unemitted_len(&self) -> usize {
        self.end - self.begin
    }

    /// begin 所在行，1-based
    pub fn line(&self) -> usize {
        self.line_num - self.pending_newlines
    }

    /// begin 所在列，1-based 字节偏移
    pub fn column(&self) -> usize {
        self.begin + 1
    }

    /// begin 所在行目前已读取部分的拷贝（不含换行符）
    ///
    /// 诊断在创建时调用它，之后缓冲区怎样重用都不影响诊断内容。
    pub fn line_text(&self) -> String {
        let stop = self.buffer[self.begin..self.end]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.end, |offset| self.begin + offset);
        String::from_utf8_lossy(&self.buffer[..stop]).into_owned()
    }

    /// 进入一层列表
    pub fn open_list(&mut self) {
        self.paren_depth += 1;
    }

    /// 离开一层列表；深度已为 0 时保持 0 并返回 false
    pub fn close_list(&mut self) -> bool {
        if self.paren_depth == 0 {
            return false;
        }
        self.paren_depth -= 1;
        true
    }

    pub fn paren_depth(&self) -> usize {
        self.paren_depth
    }

    /// 当前缓冲区容量
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// begin 前进到 end；区间里有换行时把已完成的行移出缓冲区
    fn rebase(&mut self) {
        if self.pending_newlines > 0 {
            if let Some(newline) = self.buffer[self.begin..self.end]
                .iter()
                .rposition(|&b| b == b'\n')
            {
                let shift = self.begin + newline + 1;
                self.buffer.copy_within(shift..self.end, 0);
                self.end -= shift;
            }
            self.pending_newlines = 0;
        }
        self.begin = self.end;
    }
}
