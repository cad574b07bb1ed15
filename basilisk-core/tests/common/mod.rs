//! 测试辅助工具
//!
//! 在内存里跑完整流水线，收集诊断输出和 token 流

#![allow(dead_code)]

use basilisk_core::kit::diagnostics::DiagnosticEmitter;
use basilisk_core::{
    PipelineConfig, PipelineError, PipelineReport, PipelineSupervisor, TokenKind, TokenWriter,
};
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

pub const SOURCE_NAME: &str = "test.bsk";

/// 线程间共享的内存 writer
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 一次运行的全部输出
pub struct Outcome {
    pub result: Result<PipelineReport, PipelineError>,
    pub diagnostics: String,
    pub tokens: String,
}

impl Outcome {
    pub fn report(&self) -> &PipelineReport {
        match &self.result {
            Ok(report) => report,
            Err(e) => panic!("pipeline failed: {e}\n{}", self.diagnostics),
        }
    }

    /// 诊断的首行（`name:line:column severity: message`）
    pub fn headers(&self) -> Vec<&str> {
        self.diagnostics
            .lines()
            .filter(|line| line.starts_with(SOURCE_NAME))
            .collect()
    }

    /// 解码 token 流：(kind, text)
    ///
    /// 换行分隔符的 text 本身就是换行，所以按 `:\n` 切分记录而不是按行。
    pub fn token_stream(&self) -> Vec<(TokenKind, String)> {
        let mut tokens = Vec::new();
        let mut rest = self.tokens.as_str();
        while !rest.is_empty() {
            let mut fields = rest.splitn(4, ':');
            let code: i32 = fields.next().unwrap().parse().unwrap();
            let _line = fields.next().unwrap();
            let _column = fields.next().unwrap();
            let tail = fields.next().unwrap();
            let end = tail.find(":\n").unwrap();
            tokens.push((TokenKind::from_code(code).unwrap(), tail[..end].to_string()));
            rest = &tail[end + 2..];
        }
        tokens
    }
}

/// 用指定配置跑一段源码
pub fn run_source(src: &str, config: PipelineConfig) -> Outcome {
    let diagnostics = Capture::default();
    let tokens = Capture::default();

    let emitter = Arc::new(DiagnosticEmitter::new(Box::new(diagnostics.clone()), false));
    let result = PipelineSupervisor::new(config, emitter)
        .with_token_writer(TokenWriter::new(Box::new(tokens.clone())))
        .run(Cursor::new(src.as_bytes().to_vec()), SOURCE_NAME);

    Outcome {
        result,
        diagnostics: diagnostics.text(),
        tokens: tokens.text(),
    }
}

/// 用默认配置跑一段源码
pub fn run(src: &str) -> Outcome {
    run_source(src, PipelineConfig::default())
}
