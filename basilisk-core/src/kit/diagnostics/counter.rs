//! 错误/警告计数器
//!
//! 词法器和语法器共享同一个 `Arc<DiagnosticCounter>`，所有计数都是原子操作。

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::record::Severity;

/// 一次计数的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    /// 已计入
    Counted,
    /// 不计数的级别（note / fatal）
    Uncounted,
    /// 计入后会超过上限：调用方应把这条诊断升级为致命错误
    LimitExceeded,
}

/// errors + warnings 累加器，带上限
#[derive(Debug)]
pub struct DiagnosticCounter {
    total: AtomicUsize,
    errors: AtomicUsize,
    warnings: AtomicUsize,
    exceeded: AtomicBool,
    max: usize,
}

impl DiagnosticCounter {
    pub fn new(max: usize) -> Arc<Self> {
        Arc::new(Self {
            total: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            warnings: AtomicUsize::new(0),
            exceeded: AtomicBool::new(false),
            max,
        })
    }

    /// 记录一条诊断
    pub fn record(&self, severity: Severity) -> Tally {
        if !severity.is_counted() {
            if severity == Severity::Fatal {
                self.exceeded.store(true, Ordering::SeqCst);
            }
            return Tally::Uncounted;
        }

        let reserved = self
            .total
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |total| {
                (total < self.max).then_some(total + 1)
            });
        if reserved.is_err() {
            self.exceeded.store(true, Ordering::SeqCst);
            return Tally::LimitExceeded;
        }

        match severity {
            Severity::Warning => self.warnings.fetch_add(1, Ordering::SeqCst),
            _ => self.errors.fetch_add(1, Ordering::SeqCst),
        };
        Tally::Counted
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    /// 是否已有诊断被升级为致命错误
    pub fn limit_exceeded(&self) -> bool {
        self.exceeded.load(Ordering::SeqCst)
    }

    pub fn max(&self) -> usize {
        self.max
    }
}
