//! Operator-facing progress output
//!
//! This is deliberately separate from `tracing`: reporter lines are the
//! pipeline's user interface and go to stdout (errors to stderr), while
//! tracing carries diagnostics.

use crate::outcome::Stage;
use std::sync::Mutex;

/// Kind of a progress line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Stage header
    Stage,
    /// An action about to be taken
    Step,
    /// Informational detail
    Info,
    /// Something completed
    Success,
    /// Non-fatal problem
    Warning,
    /// Fatal problem
    Error,
}

/// One recorded progress line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// Line kind
    pub kind: LineKind,
    /// Message text
    pub message: String,
}

/// Sink for operator-facing progress lines
pub trait Reporter: Send + Sync {
    /// Emit one line
    fn line(&self, kind: LineKind, message: &str);

    /// Announce the start of a stage
    fn stage(&self, stage: Stage) {
        self.line(LineKind::Stage, stage.title());
    }

    /// Announce an action
    fn step(&self, message: &str) {
        self.line(LineKind::Step, message);
    }

    /// Informational detail
    fn info(&self, message: &str) {
        self.line(LineKind::Info, message);
    }

    /// Completion
    fn success(&self, message: &str) {
        self.line(LineKind::Success, message);
    }

    /// Non-fatal problem
    fn warning(&self, message: &str) {
        self.line(LineKind::Warning, message);
    }

    /// Fatal problem
    fn error(&self, message: &str) {
        self.line(LineKind::Error, message);
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn line(&self, kind: LineKind, message: &str) {
        (**self).line(kind, message)
    }
}

/// Prints progress lines to the terminal
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    // Serializes multi-line writes
    lock: Mutex<()>,
}

impl ConsoleReporter {
    /// Create a console reporter
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for ConsoleReporter {
    fn line(&self, kind: LineKind, message: &str) {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        match kind {
            LineKind::Stage => println!("\n==> {}", message),
            LineKind::Step => println!("  → {}", message),
            LineKind::Info => println!("    {}", message),
            LineKind::Success => println!("  ✓ {}", message),
            LineKind::Warning => println!("  ⚠ {}", message),
            LineKind::Error => eprintln!("  ✗ {}", message),
        }
    }
}

/// Records progress lines in memory
#[derive(Debug, Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl MemoryReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All lines recorded so far
    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Messages of the given kind
    pub fn messages(&self, kind: LineKind) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.kind == kind)
            .map(|line| line.message)
            .collect()
    }

    /// Returns true if a line of `kind` contains `needle`
    pub fn contains(&self, kind: LineKind, needle: &str) -> bool {
        self.messages(kind).iter().any(|m| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn line(&self, kind: LineKind, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(ReportLine {
                kind,
                message: message.to_string(),
            });
    }
}
