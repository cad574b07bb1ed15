//! 诊断输出流
//!
//! 两个工作线程共用一个 `Arc<DiagnosticEmitter>`，每条诊断在锁内一次写完，
//! 不会和另一个线程的输出交错。

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use super::record::{DiagnosticRecord, Severity};

/// 通用提示的前缀
pub const PROGRAM: &str = "basilisk";

/// 诊断输出错误
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Failed to write diagnostic: {0}")]
    Io(#[from] io::Error),

    #[error("Mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// 把诊断渲染到一个带锁的 writer
pub struct DiagnosticEmitter {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl DiagnosticEmitter {
    pub fn new(writer: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            color,
        }
    }

    /// 写到标准错误
    pub fn stderr(color: bool) -> Self {
        Self::new(Box::new(io::stderr()), color)
    }

    pub fn color(&self) -> bool {
        self.color
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn Write + Send>>, DiagnosticError> {
        self.writer
            .lock()
            .map_err(|e| DiagnosticError::MutexPoisoned(e.to_string()))
    }

    fn write_all(&self, text: &str) -> Result<(), DiagnosticError> {
        let mut writer = self.lock()?;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// 渲染一条诊断记录
    pub fn emit(&self, record: &DiagnosticRecord) -> Result<(), DiagnosticError> {
        self.write_all(&record.render(self.color))
    }

    /// `basilisk: message`
    pub fn note(&self, message: &str) -> Result<(), DiagnosticError> {
        self.write_all(&format!("{PROGRAM}: {message}\n"))
    }

    /// `basilisk: error: message`
    pub fn error(&self, message: &str) -> Result<(), DiagnosticError> {
        self.general(Severity::Error, message)
    }

    /// `basilisk: fatal error: message`
    pub fn fatal(&self, message: &str) -> Result<(), DiagnosticError> {
        self.general(Severity::Fatal, message)
    }

    fn general(&self, severity: Severity, message: &str) -> Result<(), DiagnosticError> {
        self.write_all(&format!(
            "{PROGRAM}: {} {message}\n",
            severity.paint(self.color)
        ))
    }

    /// 结束时的汇总行
    pub fn summary(&self, errors: usize, warnings: usize) -> Result<(), DiagnosticError> {
        self.write_all(&format!("{}\n", summary_line(errors, warnings)))
    }
}

/// `N error(s), M warning(s).` 或 `no errors emitted.`
pub fn summary_line(errors: usize, warnings: usize) -> String {
    if errors == 0 && warnings == 0 {
        return "no errors emitted.".to_string();
    }
    format!(
        "{} {}, {} {}.",
        errors,
        if errors == 1 { "error" } else { "errors" },
        warnings,
        if warnings == 1 { "warning" } else { "warnings" }
    )
}
