//! Native PTY backend using portable-pty.

use portable_pty::{native_pty_system, CommandBuilder, PtySize as NativePtySize};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{ExitStatus, OutputPump, ProcessHandle, PtySize, SpawnSpec};
use crate::error::HostError;
use crate::Result;

/// Get the default shell for the current platform.
pub fn default_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }
    #[cfg(windows)]
    {
        "powershell.exe".to_string()
    }
}

/// Backend that spawns shells inside a real pseudo-terminal.
pub struct NativePtyBackend;

impl NativePtyBackend {
    pub fn new() -> Self {
        Self
    }

    /// One-time capability probe: can this host open a PTY at all?
    ///
    /// Opens and immediately drops a PTY pair. Called once at startup by
    /// backend detection, never per session.
    pub fn available() -> bool {
        match native_pty_system().openpty(native_size(PtySize::default())) {
            Ok(_) => true,
            Err(e) => {
                debug!("PTY probe failed: {}", e);
                false
            }
        }
    }

    /// Spawn a shell process in a new PTY.
    ///
    /// The reader side is pumped into `data_tx` from a blocking task; a
    /// second blocking task waits on the child and fires `exit_tx` once.
    pub fn spawn(
        &self,
        spec: &SpawnSpec,
        data_tx: mpsc::Sender<Vec<u8>>,
        exit_tx: oneshot::Sender<ExitStatus>,
    ) -> Result<ProcessHandle> {
        let pair = native_pty_system()
            .openpty(native_size(spec.size))
            .map_err(|e| HostError::Pty(e.to_string()))?;

        let mut cmd = CommandBuilder::new(spec.shell_command());
        if let Some(dir) = &spec.cwd {
            cmd.cwd(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let mut child = pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| HostError::Spawn(e.to_string()))?;

        // The slave end must not outlive the spawn; the master is kept
        // alive inside the handle for resize and teardown.
        drop(pair.slave);

        let killer = child.clone_killer();

        let reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| HostError::Pty(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| HostError::Pty(e.to_string()))?;

        tokio::spawn(OutputPump::new(reader, data_tx).run());

        tokio::task::spawn_blocking(move || {
            let status = match child.wait() {
                Ok(status) => ExitStatus {
                    exit_code: Some(status.exit_code() as i32),
                    signal: None,
                },
                Err(e) => {
                    debug!("wait on PTY child failed: {}", e);
                    ExitStatus::default()
                }
            };
            let _ = exit_tx.send(status);
        });

        Ok(ProcessHandle::pty(writer, pair.master, killer))
    }
}

impl Default for NativePtyBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn native_size(size: PtySize) -> NativePtySize {
    NativePtySize {
        rows: size.rows,
        cols: size.cols,
        pixel_width: 0,
        pixel_height: 0,
    }
}
