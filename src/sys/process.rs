//! Runs short-lived helper processes for OS capability queries.

use std::io;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use tokio::process::Command;
use tracing::{debug, warn};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    Timeout,
    NotFound,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Success(String),
    ExitValue(i32),
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    pub fn success(self) -> Option<String> {
        match self {
            ProbeOutcome::Success(out) => Some(out),
            _ => None,
        }
    }
}

/// Invokes external commands with a hard timeout. Commands that turned out
/// not to exist are remembered and never spawned again.
#[derive(Clone, Debug)]
pub struct ProcessProbe {
    timeout: Duration,
    missing: Arc<DashSet<String>>,
}

impl Default for ProcessProbe {
    fn default() -> Self { Self::new(DEFAULT_PROBE_TIMEOUT) }
}

impl ProcessProbe {
    pub fn new(timeout: Duration) -> Self { Self { timeout, missing: Arc::default() } }

    pub fn is_known_missing(&self, program: &str) -> bool { self.missing.contains(program) }

    pub async fn run(&self, program: &str, args: &[&str]) -> ProbeOutcome {
        if self.is_known_missing(program) {
            debug!(program, "skipping probe for a command that was not found before");
            return ProbeOutcome::Failure(ProbeFailure::NotFound);
        }

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let child = match child {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(program, "command not found");
                self.missing.insert(program.to_string());
                return ProbeOutcome::Failure(ProbeFailure::NotFound);
            }
            Err(err) => return ProbeOutcome::Failure(ProbeFailure::Other(err.to_string())),
        };

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => {
                warn!(program, timeout = ?self.timeout, "probe timed out");
                ProbeOutcome::Failure(ProbeFailure::Timeout)
            }
            Ok(Err(err)) => ProbeOutcome::Failure(ProbeFailure::Other(err.to_string())),
            Ok(Ok(output)) => match output.status.code() {
                Some(0) => ProbeOutcome::Success(String::from_utf8_lossy(&output.stdout).into_owned()),
                Some(code) => ProbeOutcome::ExitValue(code),
                None => ProbeOutcome::Failure(ProbeFailure::Other("terminated by signal".into())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_command_is_cached() {
        let probe = ProcessProbe::default();
        let program = "dockyard-definitely-not-a-real-command";
        assert_eq!(
            probe.run(program, &[]).await,
            ProbeOutcome::Failure(ProbeFailure::NotFound)
        );
        assert!(probe.is_known_missing(program));
        assert_eq!(
            probe.run(program, &[]).await,
            ProbeOutcome::Failure(ProbeFailure::NotFound)
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_output_and_exit_codes() {
        let probe = ProcessProbe::default();
        assert_eq!(
            probe.run("sh", &["-c", "printf hello"]).await,
            ProbeOutcome::Success("hello".into())
        );
        assert_eq!(probe.run("sh", &["-c", "exit 3"]).await, ProbeOutcome::ExitValue(3));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_command_times_out() {
        let probe = ProcessProbe::new(Duration::from_millis(50));
        assert_eq!(
            probe.run("sh", &["-c", "sleep 5"]).await,
            ProbeOutcome::Failure(ProbeFailure::Timeout)
        );
    }
}
