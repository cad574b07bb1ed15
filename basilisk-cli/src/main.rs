//! Basilisk CLI - Command line interface
//!
//! Tokenizes and checks one source file (or stdin). Diagnostics and logs go to
//! stderr; stdout only carries the token stream when `--tokens -` is given.

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

mod config;
mod logging;
mod platform;

use basilisk_config::{DiagnosticRoute, InputSource};
use basilisk_core::kit::diagnostics::{DiagnosticEmitter, PROGRAM};
use basilisk_core::{PipelineSupervisor, TokenWriter};
use tracing::{debug, info};

use crate::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "basilisk",
    about = "Basilisk - lexer and structural checker for a small list language",
    version = "0.1.0"
)]
pub(crate) struct Cli {
    /// Source file (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Errors + warnings allowed before the run aborts
    #[arg(long, value_name = "N")]
    pub max_diagnostics: Option<usize>,

    /// Where lexical diagnostics go
    #[arg(long, value_enum)]
    pub route: Option<RouteArg>,

    /// Limit the number of unread tokens in the channel
    #[arg(long, value_name = "N")]
    pub channel_capacity: Option<usize>,

    /// Fail instead of waiting when a bounded channel is full
    #[arg(long)]
    pub reject_on_full: bool,

    /// Disable colored diagnostics
    #[arg(long)]
    pub no_color: bool,

    /// Log level: silent, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Write the token stream to PATH ("-" for stdout)
    #[arg(long, value_name = "PATH|-")]
    pub tokens: Option<String>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum RouteArg {
    Forward,
    Direct,
}

impl From<RouteArg> for DiagnosticRoute {
    fn from(arg: RouteArg) -> Self {
        match arg {
            RouteArg::Forward => DiagnosticRoute::Forward,
            RouteArg::Direct => DiagnosticRoute::Direct,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let config = match config::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{PROGRAM}: error: {e}");
            process::exit(1);
        }
    };

    if cli.dump_config {
        match serde_json::to_string_pretty(&config) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("{PROGRAM}: error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    let log_config = config::LogConfig::from_logging(&config.logging);
    if let Err(e) = logging::init_with_file(
        &log_config,
        cli.log_format.into(),
        config.logging.file.as_deref(),
    ) {
        eprintln!("{PROGRAM}: error: {e}");
        process::exit(1);
    }

    let emitter = Arc::new(DiagnosticEmitter::stderr(platform::use_color(
        config.pipeline.diagnostics.color,
    )));
    debug!(target: "basilisk::cli", ?config, "Configuration loaded");

    let input = match &cli.file {
        Some(path) => InputSource::File(path.clone()),
        None => InputSource::Stdin,
    };

    let mut supervisor = PipelineSupervisor::new(config.pipeline, Arc::clone(&emitter));
    if let Some(target) = &cli.tokens {
        match open_token_writer(target) {
            Ok(writer) => supervisor = supervisor.with_token_writer(writer),
            Err(e) => {
                platform::general_error(&emitter, &format!("cannot open '{target}': {e}"));
                process::exit(1);
            }
        }
    }

    let name = input.name();
    info!(target: "basilisk::cli", source = %name, "Checking");
    let result = match &input {
        InputSource::File(path) => match File::open(path) {
            Ok(file) => supervisor.run(file, &name),
            Err(e) => {
                platform::general_error(&emitter, &format!("cannot open '{name}': {e}"));
                process::exit(1);
            }
        },
        InputSource::Stdin => {
            platform::general_note(&emitter, "reading from stdin");
            supervisor.run(io::stdin(), &name)
        }
    };

    process::exit(platform::finish(&emitter, result));
}

/// `-` means stdout, anything else is a file path
fn open_token_writer(target: &str) -> io::Result<TokenWriter> {
    if target == "-" {
        return Ok(TokenWriter::stdout());
    }
    let file = File::create(target)?;
    Ok(TokenWriter::new(Box::new(BufWriter::new(file))))
}
