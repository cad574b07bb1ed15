//! 诊断工具
//!
//! - [`DiagnosticRecord`]: 自带所有字符串拷贝的诊断记录
//! - [`DiagnosticStack`]: 线程私有缓冲，按追加顺序刷出
//! - [`DiagnosticCounter`]: 两个工作线程共享的计数器
//! - [`DiagnosticEmitter`]: 带锁的输出流

pub mod counter;
pub mod emitter;
pub mod record;
pub mod stack;

pub use counter::{DiagnosticCounter, Tally};
pub use emitter::{summary_line, DiagnosticEmitter, DiagnosticError, PROGRAM};
pub use record::{DiagnosticRecord, DiagnosticSpan, Severity};
pub use stack::{DiagnosticStack, Flushed};

use std::sync::Arc;

/// 计数器和输出流的组合，两个引擎各持有一份克隆
#[derive(Clone)]
pub struct DiagnosticSink {
    pub counter: Arc<DiagnosticCounter>,
    pub emitter: Arc<DiagnosticEmitter>,
}

impl DiagnosticSink {
    pub fn new(counter: Arc<DiagnosticCounter>, emitter: Arc<DiagnosticEmitter>) -> Self {
        Self { counter, emitter }
    }

    /// 计数并渲染一条诊断
    ///
    /// 计入后会超过上限时，这条诊断被升级为致命错误再渲染，返回 [`Tally::LimitExceeded`]。
    pub fn report(&self, mut record: DiagnosticRecord) -> Result<Tally, DiagnosticError> {
        let tally = self.counter.record(record.severity);
        if tally == Tally::LimitExceeded {
            record.escalate();
        }
        self.emitter.emit(&record)?;
        Ok(tally)
    }
}
