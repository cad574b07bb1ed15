use std::io::Read;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use basilisk_config::PipelineConfig;
use tracing::{debug, info, warn};

use super::{PipelineError, PipelineReport};
use crate::compiler::lexer::{LexReport, LexerEngine, LexerError};
use crate::compiler::parser::ParserEngine;
use crate::compiler::token::TokenWriter;
use crate::kit::channel::TokenChannel;
use crate::kit::diagnostics::{DiagnosticCounter, DiagnosticEmitter, DiagnosticSink};
use crate::kit::source::ReaderSource;

const TARGET: &str = "basilisk::pipeline";
const LEXER_THREAD: &str = "basilisk-lexer";
const PARSER_THREAD: &str = "basilisk-parser";

/// 启动词法器和语法器线程，等待两者结束，汇总结果
pub struct PipelineSupervisor {
    config: PipelineConfig,
    emitter: Arc<DiagnosticEmitter>,
    tokens: Option<TokenWriter>,
}

impl PipelineSupervisor {
    pub fn new(config: PipelineConfig, emitter: Arc<DiagnosticEmitter>) -> Self {
        Self {
            config,
            emitter,
            tokens: None,
        }
    }

    /// 把词法器产生的 token 流同时写出
    pub fn with_token_writer(mut self, writer: TokenWriter) -> Self {
        self.tokens = Some(writer);
        self
    }

    /// 处理一个输入
    ///
    /// `source_name` 出现在每条诊断的开头（文件路径或 "stdin"）。
    pub fn run<R>(self, input: R, source_name: &str) -> Result<PipelineReport, PipelineError>
    where
        R: Read + Send + 'static,
    {
        let channel = TokenChannel::from_config(&self.config.channel);
        let counter = DiagnosticCounter::new(self.config.diagnostics.max_diagnostics);
        let sink = DiagnosticSink::new(Arc::clone(&counter), Arc::clone(&self.emitter));

        let mut lexer = LexerEngine::new(
            ReaderSource::new(input),
            source_name,
            &self.config.lexer,
            Arc::clone(&channel),
            sink.clone(),
        );
        if let Some(writer) = self.tokens {
            lexer = lexer.with_token_writer(writer);
        }
        let parser = ParserEngine::new(Arc::clone(&channel), sink, source_name);

        debug!(
            target: TARGET,
            source = source_name,
            capacity = ?self.config.channel.capacity,
            max_diagnostics = counter.max(),
            "Starting pipeline"
        );

        let lexer_handle = spawn(LEXER_THREAD, move || lexer.run())?;
        let parser_handle = match spawn(PARSER_THREAD, move || parser.run()) {
            Ok(handle) => handle,
            Err(e) => {
                close(&channel);
                let _ = abandon_lexer(lexer_handle);
                return Err(e);
            }
        };

        let lexed = join(lexer_handle, LEXER_THREAD);
        if !matches!(lexed, Ok(Ok(_))) {
            // 词法器异常退出：关闭通道，等待中的语法器才能醒来
            close(&channel);
        }
        let parsed = join(parser_handle, PARSER_THREAD);

        if counter.limit_exceeded() {
            return Err(PipelineError::DiagnosticLimit {
                max: counter.max(),
                errors: counter.errors(),
                warnings: counter.warnings(),
            });
        }

        let lex_report = lexed??;
        let parse_report = parsed??;

        let report = PipelineReport {
            tokens_produced: lex_report.tokens_produced,
            tokens_consumed: parse_report.tokens_consumed,
            lists_parsed: parse_report.lists_parsed,
            final_depth: parse_report.final_depth,
            errors: counter.errors(),
            warnings: counter.warnings(),
        };
        info!(
            target: TARGET,
            tokens_produced = report.tokens_produced,
            tokens_consumed = report.tokens_consumed,
            lists = report.lists_parsed,
            depth = report.final_depth,
            errors = report.errors,
            warnings = report.warnings,
            "Pipeline finished"
        );
        Ok(report)
    }
}

fn spawn<T, F>(name: &'static str, work: F) -> Result<JoinHandle<T>, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(work)
        .map_err(|source| PipelineError::Spawn {
            thread: name,
            source,
        })
}

fn join<T>(handle: JoinHandle<T>, name: &'static str) -> Result<T, PipelineError> {
    handle.join().map_err(|_| {
        warn!(target: TARGET, thread = name, "Worker panicked");
        PipelineError::WorkerPanicked(name)
    })
}

/// 语法器没能启动时回收词法器线程，结果只记录日志
fn abandon_lexer(
    handle: JoinHandle<Result<LexReport, LexerError>>,
) -> Result<LexReport, PipelineError> {
    let outcome = join(handle, LEXER_THREAD)?;
    match &outcome {
        Ok(report) => {
            debug!(target: TARGET, tokens = report.tokens_produced, "Lexer finished without a parser");
        }
        Err(e) => {
            warn!(target: TARGET, error = %e, "Lexer failed without a parser");
        }
    }
    Ok(outcome?)
}

fn close(channel: &TokenChannel) {
    if let Err(e) = channel.close() {
        warn!(target: TARGET, error = %e, "Failed to close token channel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn supervisor() -> PipelineSupervisor {
        PipelineSupervisor::new(
            PipelineConfig::default(),
            Arc::new(DiagnosticEmitter::new(Box::new(io::sink()), false)),
        )
    }

    #[test]
    fn test_run_well_formed() {
        let report = supervisor().run("(+ 12 34)".as_bytes(), "t").unwrap();

        assert_eq!(report.tokens_produced, 8);
        assert_eq!(report.tokens_consumed, 8);
        assert_eq!(report.lists_parsed, 1);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_run_empty_input() {
        let report = supervisor().run(io::empty(), "t").unwrap();

        assert_eq!(
            report,
            PipelineReport {
                tokens_produced: 1,
                tokens_consumed: 1,
                ..PipelineReport::default()
            }
        );
    }

    #[test]
    fn test_abandoned_lexer_outcome_is_kept() {
        let failed = spawn(LEXER_THREAD, || Err(LexerError::DiagnosticLimit { max: 3 })).unwrap();
        assert!(matches!(
            abandon_lexer(failed),
            Err(PipelineError::Lexer(LexerError::DiagnosticLimit { max: 3 }))
        ));

        let panicked = spawn(LEXER_THREAD, || -> Result<LexReport, LexerError> {
            panic!("lexer blew up")
        })
        .unwrap();
        assert!(matches!(
            abandon_lexer(panicked),
            Err(PipelineError::WorkerPanicked(LEXER_THREAD))
        ));
    }

    #[test]
    fn test_read_failure_surfaces_as_lexer_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk on fire"))
            }
        }

        let result = supervisor().run(Broken, "t");
        assert!(matches!(result, Err(PipelineError::Lexer(_))));
    }
}
