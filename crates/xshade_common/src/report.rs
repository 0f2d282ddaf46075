//! Structured diagnostics.
//!
//! The core never writes to stdout or stderr. Every diagnostic flows
//! through the [`Log`] trait as a [`Report`]; the [`ReportHandler`] adds
//! the context-description stack ("in function 'main'") and keeps the
//! error count that decides compilation success.

use crate::SourceArea;
use std::fmt;

/// Report severity classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
    /// Unrecoverable; the translation unit is abandoned.
    Fatal,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single diagnostic.
#[derive(Clone, Debug)]
pub struct Report {
    pub severity: Severity,
    pub message: String,
    pub area: Option<SourceArea>,
    /// Context breadcrumbs, outermost first.
    pub context: Vec<String>,
    /// D3D-compiler-style error code, e.g. "X3507".
    pub code: Option<&'static str>,
    /// Source line and marker, when the area resolves to printable text.
    pub snippet: Option<(String, String)>,
}

impl Report {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            area: None,
            context: Vec::new(),
            code: None,
            snippet: None,
        }
    }

    pub fn with_area(mut self, area: SourceArea) -> Self {
        self.area = Some(area);
        self
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = self.context.last() {
            write!(f, "{} ({}) ", self.severity, context)?;
        } else {
            write!(f, "{} ", self.severity)?;
        }
        if let Some(code) = self.code {
            write!(f, "[{}] ", code)?;
        }
        if let Some(area) = self.area {
            write!(f, "({}) ", area)?;
        }
        f.write_str(&self.message)
    }
}

/// Receiver for reports. Implemented by the CLI (stderr printer) and by
/// tests (collector); the core only ever talks to this trait.
pub trait Log {
    fn submit(&mut self, report: Report);
}

/// A log that stores every submitted report, for tests and validation runs.
#[derive(Default)]
pub struct CollectingLog {
    pub reports: Vec<Report>,
}

impl CollectingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.reports.iter().map(|r| r.message.as_str()).collect()
    }

    pub fn has_severity(&self, severity: Severity) -> bool {
        self.reports.iter().any(|r| r.severity == severity)
    }
}

impl Log for CollectingLog {
    fn submit(&mut self, report: Report) {
        self.reports.push(report);
    }
}

/// Wraps a [`Log`] with the context-description stack and error counting.
pub struct ReportHandler<'a> {
    log: &'a mut dyn Log,
    context: Vec<String>,
    errors: usize,
    warnings: usize,
}

impl<'a> ReportHandler<'a> {
    pub fn new(log: &'a mut dyn Log) -> Self {
        Self {
            log,
            context: Vec::new(),
            errors: 0,
            warnings: 0,
        }
    }

    /// Pushes a context description, e.g. a function signature, so
    /// subsequent reports self-locate.
    pub fn push_context(&mut self, desc: impl Into<String>) {
        self.context.push(desc.into());
    }

    pub fn pop_context(&mut self) {
        self.context.pop();
    }

    pub fn submit(&mut self, mut report: Report) {
        match report.severity {
            Severity::Error | Severity::Fatal => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        if report.context.is_empty() {
            report.context = self.context.clone();
        }
        self.log.submit(report);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.submit(Report::new(Severity::Info, message));
    }

    pub fn warning(&mut self, message: impl Into<String>, area: Option<SourceArea>) {
        let mut report = Report::new(Severity::Warning, message);
        report.area = area;
        self.submit(report);
    }

    pub fn error(&mut self, message: impl Into<String>, area: Option<SourceArea>) {
        let mut report = Report::new(Severity::Error, message);
        report.area = area;
        self.submit(report);
    }

    pub fn error_with_code(
        &mut self,
        message: impl Into<String>,
        area: Option<SourceArea>,
        code: &'static str,
    ) {
        let mut report = Report::new(Severity::Error, message).with_code(code);
        report.area = area;
        self.submit(report);
    }

    pub fn fatal(&mut self, message: impl Into<String>, area: Option<SourceArea>) {
        let mut report = Report::new(Severity::Fatal, message);
        report.area = area;
        self.submit(report);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_attached() {
        let mut log = CollectingLog::new();
        {
            let mut handler = ReportHandler::new(&mut log);
            handler.push_context("function 'main'");
            handler.error("undeclared identifier 'q'", None);
            handler.pop_context();
        }
        assert_eq!(log.reports.len(), 1);
        assert_eq!(log.reports[0].context, vec!["function 'main'".to_string()]);
    }

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut log = CollectingLog::new();
        let mut handler = ReportHandler::new(&mut log);
        handler.warning("techniques are ignored", None);
        assert!(!handler.has_errors());
        handler.error("oops", None);
        assert!(handler.has_errors());
        assert_eq!(handler.warning_count(), 1);
    }
}
