//! One-shot command runner.
//!
//! Runs a single command to completion and captures its text output. This
//! deliberately bypasses the session shell-selection policy: one-shot
//! commands always go through a fixed interpreter, not the user's shell.

use std::process::Command;

use tracing::debug;

#[cfg(unix)]
const INTERPRETER: [&str; 2] = ["/bin/sh", "-c"];
#[cfg(windows)]
const INTERPRETER: [&str; 2] = ["powershell.exe", "-Command"];

/// Run a command, blocking until it completes.
///
/// Returns the captured stdout on success, falling back to stderr when
/// stdout is empty; on failure returns stderr or the spawn error message.
/// Never errors: the output text is the whole result, matching a terminal
/// transcript.
pub fn run_one_shot(command: &str) -> String {
    debug!("one-shot command: {}", command);

    let output = Command::new(INTERPRETER[0])
        .arg(INTERPRETER[1])
        .arg(command)
        .output();

    match output {
        Ok(out) => {
            let stdout = String::from_utf8_lossy(&out.stdout);
            let stderr = String::from_utf8_lossy(&out.stderr);
            if out.status.success() {
                if stdout.is_empty() {
                    stderr.into_owned()
                } else {
                    stdout.into_owned()
                }
            } else if stderr.is_empty() {
                format!("command exited with {}", out.status)
            } else {
                stderr.into_owned()
            }
        }
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_captures_stdout() {
        let output = run_one_shot("echo one_shot_ok");
        assert!(output.contains("one_shot_ok"));
    }

    #[test]
    #[cfg(unix)]
    fn test_failure_returns_stderr() {
        let output = run_one_shot("echo went_wrong 1>&2; exit 1");
        assert!(output.contains("went_wrong"));
    }

    #[test]
    #[cfg(unix)]
    fn test_failure_without_stderr_reports_status() {
        let output = run_one_shot("exit 3");
        assert!(output.contains("exited with"));
    }
}
