//! Child-process fallback backend.
//!
//! Used when no PTY device can be opened on the host. Spawns the shell as a
//! plain piped child process: stdout and stderr are merged into the same
//! data channel with no stream distinction, and resize is meaningless.

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{ExitStatus, OutputPump, ProcessHandle, SpawnSpec};
use crate::error::HostError;
use crate::Result;

/// How often the exit watcher polls a fallback child.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Backend that spawns shells as plain piped child processes.
pub struct FallbackBackend;

impl FallbackBackend {
    pub fn new() -> Self {
        Self
    }

    /// Spawn a shell as a piped child process.
    ///
    /// Both output streams are pumped into `data_tx`; `exit_tx` fires once
    /// when the child is observed to have exited.
    pub fn spawn(
        &self,
        spec: &SpawnSpec,
        data_tx: mpsc::Sender<Vec<u8>>,
        exit_tx: oneshot::Sender<ExitStatus>,
    ) -> Result<ProcessHandle> {
        let mut cmd = Command::new(spec.shell_command());
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &spec.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| HostError::Spawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HostError::Spawn("child stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HostError::Spawn("child stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| HostError::Spawn("child stderr unavailable".into()))?;

        tokio::spawn(OutputPump::new(stdout, data_tx.clone()).run());
        tokio::spawn(OutputPump::new(stderr, data_tx).run());

        let child = Arc::new(Mutex::new(child));
        tokio::spawn(watch_exit(Arc::clone(&child), exit_tx));

        Ok(ProcessHandle::child(Box::new(stdin), child))
    }
}

impl Default for FallbackBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Poll the child until it exits, then deliver the status exactly once.
///
/// Polling keeps the child lockable for concurrent kill requests; a blocking
/// `wait()` would hold the mutex for the child's whole lifetime.
async fn watch_exit(child: Arc<Mutex<Child>>, exit_tx: oneshot::Sender<ExitStatus>) {
    let status = loop {
        let polled = match child.lock() {
            Ok(mut child) => child.try_wait(),
            Err(_) => break ExitStatus::default(),
        };
        match polled {
            Ok(Some(status)) => break convert_status(status),
            Ok(None) => tokio::time::sleep(WAIT_POLL_INTERVAL).await,
            Err(e) => {
                debug!("wait on fallback child failed: {}", e);
                break ExitStatus::default();
            }
        }
    };
    let _ = exit_tx.send(status);
}

fn convert_status(status: std::process::ExitStatus) -> ExitStatus {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal = None;

    ExitStatus {
        exit_code: status.code(),
        signal,
    }
}
