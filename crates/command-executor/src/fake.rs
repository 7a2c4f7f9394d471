//! Scripted executor for tests
//!
//! [`FakeExecutor`] answers commands from a list of rules keyed by program
//! and argument prefix, and records every invocation it receives. Rules
//! registered later take precedence, so a test can start from a default
//! script and override a single command.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::executor::CommandExecutor;
use crate::output::CommandOutput;

type Handler = Box<dyn Fn(&Command) -> Result<CommandOutput> + Send + Sync>;

struct Rule {
    program: OsString,
    prefix: Vec<OsString>,
    handler: Handler,
}

/// A command the fake executor received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program name
    pub program: String,
    /// Arguments, lossily converted
    pub args: Vec<String>,
    /// Working directory, if one was set
    pub current_dir: Option<PathBuf>,
    /// Environment variables set on the command, lossily converted
    pub env: BTreeMap<String, String>,
}

impl Invocation {
    /// Returns true if this invocation ran `program` with arguments starting with `prefix`
    pub fn matches(&self, program: &str, prefix: &[&str]) -> bool {
        self.program == program
            && self.args.len() >= prefix.len()
            && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }

    /// The value following `flag` in the arguments, if present
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// In-memory [`CommandExecutor`] driven by scripted rules
#[derive(Default)]
pub struct FakeExecutor {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeExecutor {
    /// Create an executor with no rules; every command is "not found"
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer matching commands with a fixed output
    pub fn with_output(self, program: &str, prefix: &[&str], output: CommandOutput) -> Self {
        self.with_handler(program, prefix, move |_| Ok(output.clone()))
    }

    /// Answer matching commands by running `handler`
    ///
    /// Handlers may perform side effects such as creating the files a real
    /// tool would have produced.
    pub fn with_handler<F>(mut self, program: &str, prefix: &[&str], handler: F) -> Self
    where
        F: Fn(&Command) -> Result<CommandOutput> + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            program: OsString::from(program),
            prefix: prefix.iter().map(OsString::from).collect(),
            handler: Box::new(handler),
        });
        self
    }

    /// Every invocation received so far, in order
    pub fn calls(&self) -> Vec<Invocation> {
        self.lock_calls().clone()
    }

    /// Invocations matching `program` and argument prefix
    pub fn calls_to(&self, program: &str, prefix: &[&str]) -> Vec<Invocation> {
        self.lock_calls()
            .iter()
            .filter(|call| call.matches(program, prefix))
            .cloned()
            .collect()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Invocation>> {
        // Pushes never leave the Vec half-written, so a poisoned guard is still usable
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CommandExecutor for FakeExecutor {
    async fn execute(&self, command: Command) -> Result<CommandOutput> {
        self.lock_calls().push(Invocation {
            program: command.get_program().to_string_lossy().into_owned(),
            args: command
                .get_args()
                .iter()
                .map(|a| a.to_string_lossy().into_owned())
                .collect(),
            current_dir: command.get_current_dir().map(PathBuf::from),
            env: command
                .get_envs()
                .iter()
                .map(|(k, v)| {
                    (
                        k.to_string_lossy().into_owned(),
                        v.to_string_lossy().into_owned(),
                    )
                })
                .collect(),
        });

        let rule = self
            .rules
            .iter()
            .rev()
            .find(|rule| command.matches(rule.program.as_os_str(), rule.prefix.as_slice()));

        match rule {
            Some(rule) => (rule.handler)(&command),
            None => Err(Error::command_not_found(
                command.get_program().to_string_lossy(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[smol_potat::test]
    async fn test_unscripted_command_is_not_found() {
        let fake = FakeExecutor::new();
        let err = fake.execute(Command::new("az")).await.unwrap_err();
        assert!(matches!(err, Error::CommandNotFound { .. }));
        assert_eq!(fake.calls().len(), 1);
    }

    #[smol_potat::test]
    async fn test_later_rules_override_earlier_ones() {
        let fake = FakeExecutor::new()
            .with_output("az", &[], CommandOutput::success("default"))
            .with_output("az", &["account", "show"], CommandOutput::failure(1, "login"));

        let show = fake
            .execute(Command::builder("az").args(["account", "show"]).build())
            .await
            .unwrap();
        assert!(!show.is_success());

        let other = fake
            .execute(Command::builder("az").args(["webapp", "list"]).build())
            .await
            .unwrap();
        assert_eq!(other.stdout, "default");
    }

    #[smol_potat::test]
    async fn test_records_invocations() {
        let fake = FakeExecutor::new().with_output("zip", &[], CommandOutput::success(""));
        fake.execute(
            Command::builder("zip")
                .args(["-r", "-q", "/tmp/out.zip", "."])
                .current_dir("/tmp/publish")
                .env("ZIPOPT", "-9")
                .build(),
        )
        .await
        .unwrap();

        let calls = fake.calls_to("zip", &["-r"]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].flag_value("-q"), Some("/tmp/out.zip"));
        assert_eq!(calls[0].current_dir, Some(PathBuf::from("/tmp/publish")));
        assert_eq!(calls[0].env.get("ZIPOPT").map(String::as_str), Some("-9"));
        assert!(fake.calls_to("az", &[]).is_empty());
    }
}
