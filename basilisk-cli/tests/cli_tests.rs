//! CLI 端到端测试：直接运行编译好的 `basilisk` 二进制

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn basilisk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_basilisk"))
}

/// 每个测试独占一个临时文件
fn source_file(test: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("basilisk-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{test}.bsk"));
    fs::write(&path, contents).unwrap();
    path
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_clean_file() {
    let path = source_file("clean", "(+ 12 34)\n");
    let output = basilisk().arg(&path).output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stderr(&output), "no errors emitted.\n");
    assert_eq!(stdout(&output), "");
}

#[test]
fn test_reads_stdin_with_note() {
    let mut child = basilisk()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"(- 3 1)\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stderr(&output),
        "basilisk: reading from stdin\nno errors emitted.\n"
    );
}

#[test]
fn test_errors_are_reported_but_not_fatal() {
    let path = source_file("extra_paren", "(+ 12))\n");
    let output = basilisk().arg(&path).output().unwrap();

    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0));
    assert!(err.contains(&format!("{}:1:7 error: too many parens", path.display())));
    assert!(err.ends_with("1 error, 0 warnings.\n"));
}

#[test]
fn test_too_many_diagnostics_exits_one() {
    let path = source_file("limit", &"(+ 1 @)\n".repeat(11));
    let output = basilisk().arg(&path).output().unwrap();

    let err = stderr(&output);
    let prefix = path.display().to_string();
    let headers: Vec<_> = err.lines().filter(|l| l.starts_with(&prefix)).collect();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(headers.len(), 11);
    assert!(headers[..10].iter().all(|h| h.contains(" error: ")));
    assert!(headers[10].contains(" fatal error: "));
    assert!(err.contains("basilisk: fatal error: too many errors (limit 10)"));
}

#[test]
fn test_max_diagnostics_flag() {
    let path = source_file("max_flag", &"(+ 1 @)\n".repeat(3));
    let output = basilisk()
        .args(["--max-diagnostics", "2"])
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_file() {
    let path = source_file("config_source", &"(+ 1 @)\n".repeat(2));
    let config = source_file("config_json", r#"{"pipeline": {"diagnostics": {"max_diagnostics": 1}}}"#);
    let output = basilisk()
        .arg("--config")
        .arg(&config)
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("too many errors (limit 1)"));
}

#[test]
fn test_missing_file() {
    let output = basilisk().arg("/nonexistent/input.bsk").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("basilisk: error: cannot open '/nonexistent/input.bsk'"));
}

#[test]
fn test_token_stream_to_stdout() {
    let path = source_file("tokens", "(+ 1)");
    let output = basilisk()
        .args(["--tokens", "-"])
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        stdout(&output),
        "5:1:1:(:\n20:1:2:+:\n10:1:3: :\n21:1:4:1:\n6:1:5:):\n-1:1:6::\n"
    );
}

#[test]
fn test_direct_route_flag() {
    let path = source_file("direct", "(+ 1))");
    let output = basilisk()
        .args(["--route", "direct", "--tokens", "-"])
        .arg(&path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(!stdout(&output).lines().any(|l| l.starts_with("0:")));
    assert!(stderr(&output).contains("error: too many parens"));
}

#[test]
fn test_dump_config() {
    let output = basilisk()
        .args(["--dump-config", "--channel-capacity", "8", "--reject-on-full"])
        .output()
        .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["pipeline"]["channel"]["capacity"], 8);
    assert_eq!(json["pipeline"]["channel"]["overflow"], "reject");
    assert_eq!(json["pipeline"]["diagnostics"]["max_diagnostics"], 10);
}

#[test]
fn test_unknown_log_level() {
    let output = basilisk().args(["--log-level", "loud"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "basilisk: error: unknown log level 'loud'\n");
}
