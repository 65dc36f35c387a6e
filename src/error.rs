use crate::ast::Span;
use std::fmt;
use std::io;

/// Kind of analysis error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    NotIntegerAlias,
    InsufficientConstants,
    MultiNameConstant,
    UnresolvedReference,
    UnsupportedExpression,
    ReceiverCollision,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "Syntax error",
            ErrorKind::NotIntegerAlias => "Type is not an integer alias",
            ErrorKind::InsufficientConstants => "Not enough constants",
            ErrorKind::MultiNameConstant => "Multiple names on one constant",
            ErrorKind::UnresolvedReference => "Unresolved constant reference",
            ErrorKind::UnsupportedExpression => "Unsupported constant expression",
            ErrorKind::ReceiverCollision => "Receiver name collision",
        }
    }
}

/// Error during analysis (parsing, type validation, or constant resolution)
#[derive(Debug, Clone)]
pub struct AnalyzeError {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Option<Span>,
    pub file: Option<String>,
}

impl AnalyzeError {
    /// Create a new analysis error
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            file: None,
        }
    }

    /// Attach the source range of the offending declaration
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach the name of the file the error was found in
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Render the error with source context
    pub fn render(&self, source: &str) -> String {
        let mut output = String::new();
        let filename = self.file.as_deref().unwrap_or("<input>");

        if let Some(span) = self.span {
            let line = span.start.line + 1;
            let col = span.start.col + 1;
            output.push_str(&format!(" file: {}:{}:{}\n", filename, line, col));
        } else {
            output.push_str(&format!(" file: {}\n", filename));
        }
        output.push_str(&format!(
            "error: {}: {}\n",
            self.kind.as_str(),
            self.message
        ));

        // Source context with a caret underline
        if let Some(span) = self.span {
            if let Some(source_line) = source.lines().nth(span.start.line) {
                let err_line = span.start.line + 1;
                let line_num_width = format!("{}", err_line).len().max(2);
                output.push_str(&format!("{:>width$} |\n", "", width = line_num_width));
                output.push_str(&format!(
                    "{:>width$} | {}\n",
                    err_line,
                    source_line,
                    width = line_num_width
                ));

                let underline_start = span.start.col;
                let underline_len = if span.end.line == span.start.line {
                    (span.end.col.saturating_sub(span.start.col)).max(1)
                } else {
                    source_line.len().saturating_sub(underline_start).max(1)
                };

                let spaces = " ".repeat(underline_start);
                let carets = "^".repeat(underline_len);
                output.push_str(&format!(
                    "{:>width$} | {}{}\n",
                    "",
                    spaces,
                    carets,
                    width = line_num_width
                ));
            }
        }

        output
    }
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AnalyzeError {}

/// Error during generation (configuration, analysis, or I/O)
#[derive(Debug)]
pub enum CompileError {
    Config(String),
    Analyze(AnalyzeError),
    Io(io::Error),
}

impl CompileError {
    /// Render the error with source context when it carries one
    pub fn render(&self, source: &str) -> String {
        match self {
            CompileError::Analyze(err) => err.render(source),
            CompileError::Config(msg) => format!("error: {}\n", msg),
            CompileError::Io(err) => format!("error: {}\n", err),
        }
    }
}

impl From<AnalyzeError> for CompileError {
    fn from(err: AnalyzeError) -> Self {
        CompileError::Analyze(err)
    }
}

impl From<io::Error> for CompileError {
    fn from(err: io::Error) -> Self {
        CompileError::Io(err)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Config(msg) => write!(f, "{}", msg),
            CompileError::Analyze(err) => write!(f, "{}", err),
            CompileError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {}
