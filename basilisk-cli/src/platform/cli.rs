//! CLI 格式化输出
//!
//! 通用提示、错误和结束时的汇总行，以及退出码。

use std::io::{self, IsTerminal};

use basilisk_core::kit::diagnostics::{DiagnosticEmitter, DiagnosticError, PROGRAM};
use basilisk_core::{PipelineError, PipelineReport};
use tracing::debug;

/// 配置允许且 stderr 是终端时才输出颜色
pub fn use_color(configured: bool) -> bool {
    configured && io::stderr().is_terminal()
}

/// `basilisk: message`
pub fn general_note(emitter: &DiagnosticEmitter, message: &str) {
    report_write(emitter.note(message));
}

/// `basilisk: error: message`
pub fn general_error(emitter: &DiagnosticEmitter, message: &str) {
    report_write(emitter.error(message));
}

/// 打印汇总行，返回退出码
///
/// 致命诊断（超出上限）和 I/O 失败返回 1；普通错误/警告不影响退出码。
pub fn finish(emitter: &DiagnosticEmitter, result: Result<PipelineReport, PipelineError>) -> i32 {
    match result {
        Ok(report) => {
            debug!(target: "basilisk::cli", ?report, "Finished");
            report_write(emitter.summary(report.errors, report.warnings));
            0
        }
        Err(PipelineError::DiagnosticLimit {
            max,
            errors,
            warnings,
        }) => {
            report_write(emitter.fatal(&format!("too many errors (limit {max})")));
            report_write(emitter.summary(errors, warnings));
            1
        }
        Err(e) => {
            general_error(emitter, &e.to_string());
            1
        }
    }
}

/// 诊断流本身写失败时只能退回 eprintln
fn report_write(result: Result<(), DiagnosticError>) {
    if let Err(e) = result {
        eprintln!("{PROGRAM}: error: {e}");
    }
}
