//! Captured result of a finished command

/// Exit status and captured output of a command that ran to completion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code if the process exited normally
    pub exit_code: Option<i32>,
    /// Signal that terminated the process (Unix only)
    pub signal: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl CommandOutput {
    /// A successful exit with the given stdout
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    /// A failed exit with the given code and stderr
    pub fn failure(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code: Some(code),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    /// Returns true if the process exited successfully (code 0)
    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Returns true if the process was terminated by a signal
    pub fn terminated_by_signal(&self) -> bool {
        self.signal.is_some()
    }

    /// Trimmed stdout, or `None` if it is empty
    pub fn stdout_trimmed(&self) -> Option<&str> {
        let trimmed = self.stdout.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// The last `lines` non-empty lines of stderr, falling back to stdout
    ///
    /// Used to give the operator the tail of a failing tool's diagnostics.
    pub fn diagnostic_tail(&self, lines: usize) -> String {
        let source = if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        };
        let kept: Vec<&str> = source
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();
        let start = kept.len().saturating_sub(lines);
        kept[start..].join("\n")
    }

    /// Human readable description of how the process ended
    pub fn status_description(&self) -> String {
        match (self.exit_code, self.signal) {
            (Some(code), _) => format!("exit code {}", code),
            (None, Some(signal)) => format!("terminated by signal {}", signal),
            (None, None) => "unknown exit status".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure_constructors() {
        assert!(CommandOutput::success("ok").is_success());
        let failed = CommandOutput::failure(2, "boom");
        assert!(!failed.is_success());
        assert_eq!(failed.status_description(), "exit code 2");
    }

    #[test]
    fn test_signal_status() {
        let out = CommandOutput {
            signal: Some(9),
            ..CommandOutput::default()
        };
        assert!(out.terminated_by_signal());
        assert!(!out.is_success());
        assert_eq!(out.status_description(), "terminated by signal 9");
    }

    #[test]
    fn test_stdout_trimmed() {
        assert_eq!(CommandOutput::success("  app-demo\n").stdout_trimmed(), Some("app-demo"));
        assert_eq!(CommandOutput::success(" \n").stdout_trimmed(), None);
    }

    #[test]
    fn test_diagnostic_tail_prefers_stderr() {
        let out = CommandOutput {
            exit_code: Some(1),
            stdout: "building\n".to_string(),
            stderr: "one\n\ntwo\nthree\n".to_string(),
            ..CommandOutput::default()
        };
        assert_eq!(out.diagnostic_tail(2), "two\nthree");

        let stdout_only = CommandOutput {
            exit_code: Some(1),
            stdout: "error CS1002: ; expected\n".to_string(),
            ..CommandOutput::default()
        };
        assert_eq!(stdout_only.diagnostic_tail(5), "error CS1002: ; expected");
    }
}
