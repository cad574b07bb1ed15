//! 诊断记录
//!
//! 记录创建时就把所有字符串拷贝一份，之后游标缓冲区怎么被重用都不影响它。

use std::fmt;

/// 诊断严重级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// 提示，不计数
    Note,
    /// 警告，计数但不中断
    Warning,
    /// 错误，计数，可恢复
    Error,
    /// 致命错误，结束本次运行
    Fatal,
}

impl Severity {
    /// 渲染时使用的标签
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Note => "note",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }

    /// ANSI 颜色码
    fn color_code(&self) -> &'static str {
        match self {
            Severity::Note => "\x1b[1;36m",
            Severity::Warning => "\x1b[1;35m",
            Severity::Error | Severity::Fatal => "\x1b[1;31m",
        }
    }

    /// 是否计入 errors + warnings
    pub fn is_counted(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Error)
    }

    /// 带颜色（或不带）的标签
    pub fn paint(&self, color: bool) -> String {
        if color {
            format!("{}{}:{}", self.color_code(), self.label(), RESET)
        } else {
            format!("{}:", self.label())
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// 源代码摘录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSpan {
    /// 出错行的拷贝（不含换行符）
    pub line_text: String,
    /// 出错文本的字节长度
    pub span_length: usize,
    /// `^` 之前画多少个 `~`
    pub underline_count: usize,
}

impl DiagnosticSpan {
    /// 标记行：摘录中的制表符原样保留，保证 `^` 对齐
    pub fn marker(&self, column: usize) -> String {
        let caret = column.saturating_sub(1);
        let lead = caret.saturating_sub(self.underline_count);
        let mut marker: String = self
            .line_text
            .bytes()
            .chain(std::iter::repeat(b' '))
            .take(lead)
            .map(|b| if b == b'\t' { '\t' } else { ' ' })
            .collect();
        marker.extend(std::iter::repeat('~').take(caret - lead));
        marker.push('^');
        marker
    }
}

/// 一条诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
    /// 渲染在位置后面的标签，通常等于 `severity.label()`
    pub type_label: String,
    /// 输入名（文件路径或 "stdin"）
    pub source_name: String,
    pub span: Option<DiagnosticSpan>,
}

impl DiagnosticRecord {
    pub fn new(
        severity: Severity,
        source_name: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            line,
            column,
            message: message.into(),
            type_label: severity.label().to_string(),
            source_name: source_name.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: DiagnosticSpan) -> Self {
        self.span = Some(span);
        self
    }

    /// 升级为致命错误（超出诊断上限时）
    pub fn escalate(&mut self) {
        self.severity = Severity::Fatal;
        self.type_label = Severity::Fatal.label().to_string();
    }

    /// 渲染为一段文本，末尾带换行
    ///
    /// ```text
    /// name:line:column severity: message
    /// <摘录>
    /// <标记行>
    /// ```
    pub fn render(&self, color: bool) -> String {
        let label = if color {
            format!("{}{}:{}", self.severity.color_code(), self.type_label, RESET)
        } else {
            format!("{}:", self.type_label)
        };

        let mut out = if color {
            format!(
                "{BOLD}{}:{}:{}{RESET} {} {BOLD}{}{RESET}\n",
                self.source_name, self.line, self.column, label, self.message
            )
        } else {
            format!(
                "{}:{}:{} {} {}\n",
                self.source_name, self.line, self.column, label, self.message
            )
        };

        if let Some(span) = &self.span {
            out.push_str(&span.line_text);
            out.push('\n');
            out.push_str(&span.marker(self.column));
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} {}: {}",
            self.source_name, self.line, self.column, self.type_label, self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_header() {
        let record = DiagnosticRecord::new(Severity::Error, "a.bsk", 3, 7, "too many parens");
        assert_eq!(record.render(false), "a.bsk:3:7 error: too many parens\n");
        assert_eq!(record.to_string(), "a.bsk:3:7 error: too many parens");
    }

    #[test]
    fn test_render_with_span() {
        let record = DiagnosticRecord::new(Severity::Error, "stdin", 1, 7, "unrecognized character")
            .with_span(DiagnosticSpan {
                line_text: "(+ 1 @@)".to_string(),
                span_length: 2,
                underline_count: 1,
            });

        assert_eq!(
            record.render(false),
            "stdin:1:7 error: unrecognized character\n(+ 1 @@)\n     ~^\n"
        );
    }

    #[test]
    fn test_marker_preserves_tabs() {
        let span = DiagnosticSpan {
            line_text: "\t(+\t@".to_string(),
            span_length: 1,
            underline_count: 0,
        };
        assert_eq!(span.marker(5), "\t  \t^");
    }

    #[test]
    fn test_marker_past_line_end() {
        let span = DiagnosticSpan {
            line_text: "(".to_string(),
            span_length: 0,
            underline_count: 0,
        };
        assert_eq!(span.marker(3), "  ^");
    }

    #[test]
    fn test_escalate() {
        let mut record = DiagnosticRecord::new(Severity::Warning, "stdin", 1, 1, "w");
        record.escalate();
        assert_eq!(record.severity, Severity::Fatal);
        assert_eq!(record.render(false), "stdin:1:1 fatal error: w\n");
    }

    #[test]
    fn test_colored_label() {
        let record = DiagnosticRecord::new(Severity::Warning, "stdin", 1, 1, "w");
        let rendered = record.render(true);
        assert!(rendered.contains("\x1b[1;35mwarning:\x1b[0m"));
        assert_eq!(Severity::Note.paint(false), "note:");
    }

    #[test]
    fn test_counted_severities() {
        assert!(!Severity::Note.is_counted());
        assert!(Severity::Warning.is_counted());
        assert!(Severity::Error.is_counted());
        assert!(!Severity::Fatal.is_counted());
    }
}
