//! 每个线程私有的诊断缓冲
//!
//! 只追加，`drain` / `flush` 按追加顺序交出全部记录后清空。不跨线程共享，不加锁。

use super::counter::Tally;
use super::emitter::DiagnosticError;
use super::record::DiagnosticRecord;
use super::DiagnosticSink;

/// 一次 `flush` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flushed {
    /// 已计数并渲染的记录数
    pub reported: usize,
    /// 是否有记录超出上限（被升级为致命错误）
    pub limit_exceeded: bool,
}

#[derive(Debug, Default)]
pub struct DiagnosticStack {
    records: Vec<DiagnosticRecord>,
}

impl DiagnosticStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DiagnosticRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 取出全部记录（追加顺序），栈变为空
    pub fn drain(&mut self) -> Vec<DiagnosticRecord> {
        std::mem::take(&mut self.records)
    }

    /// 按追加顺序经 `sink` 计数并渲染，栈变为空
    ///
    /// 超出上限的那条记录渲染后停止，其余记录被丢弃。
    pub fn flush(&mut self, sink: &DiagnosticSink) -> Result<Flushed, DiagnosticError> {
        let mut flushed = Flushed {
            reported: 0,
            limit_exceeded: false,
        };
        for record in self.drain() {
            flushed.reported += 1;
            if sink.report(record)? == Tally::LimitExceeded {
                flushed.limit_exceeded = true;
                break;
            }
        }
        Ok(flushed)
    }

    /// 丢弃全部记录
    pub fn reset(&mut self) {
        self.records.clear();
    }
}
