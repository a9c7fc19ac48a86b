//! Process backend abstraction.
//!
//! This module produces a uniform bidirectional byte-stream abstraction over
//! a spawned shell process. Two implementations exist: a native
//! pseudo-terminal (portable-pty) and a plain child-process pipe fallback for
//! hosts where no PTY device can be opened. The backend is selected once at
//! host startup and applies to every session for the lifetime of the process.

mod fallback;
mod native;
mod pump;

pub use fallback::FallbackBackend;
pub use native::{default_shell, NativePtyBackend};
pub use pump::{InputPump, OutputPump};

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::Result;

/// Which backend implementation a handle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Real pseudo-terminal device.
    NativePty,
    /// Plain child process with piped stdio; no terminal semantics.
    FallbackChildProcess,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NativePty => write!(f, "native-pty"),
            Self::FallbackChildProcess => write!(f, "child-process-fallback"),
        }
    }
}

/// Size of a terminal in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PtySize {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
}

impl PtySize {
    /// Create a new PtySize with the given dimensions.
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for PtySize {
    fn default() -> Self {
        Self { rows: 24, cols: 80 }
    }
}

/// Everything needed to spawn one shell process.
#[derive(Debug, Clone, Default)]
pub struct SpawnSpec {
    /// Explicit shell command; platform default when absent.
    pub shell: Option<String>,
    /// Initial terminal size.
    pub size: PtySize,
    /// Working directory; host cwd when absent.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables on top of the inherited ones.
    pub env: HashMap<String, String>,
}

impl SpawnSpec {
    /// Resolve the shell command to execute.
    pub fn shell_command(&self) -> String {
        self.shell.clone().unwrap_or_else(default_shell)
    }
}

/// Exit status of a terminated session process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExitStatus {
    /// Process exit code, when the process exited normally.
    pub exit_code: Option<i32>,
    /// Terminating signal number (unix only).
    pub signal: Option<i32>,
}

/// The process backend selected for this host.
///
/// Selection happens exactly once, at startup, via [`ProcessBackend::detect`].
/// Call sites never probe for PTY capability themselves.
pub enum ProcessBackend {
    NativePty(NativePtyBackend),
    Fallback(FallbackBackend),
}

impl ProcessBackend {
    /// Probe the native PTY system once and pick the backend for the
    /// remainder of the host's lifetime.
    pub fn detect(force_fallback: bool) -> Self {
        if !force_fallback && NativePtyBackend::available() {
            Self::NativePty(NativePtyBackend::new())
        } else {
            if !force_fallback {
                tracing::info!("native PTY unavailable, using child-process fallback");
            }
            Self::Fallback(FallbackBackend::new())
        }
    }

    /// Which implementation this backend is.
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::NativePty(_) => BackendKind::NativePty,
            Self::Fallback(_) => BackendKind::FallbackChildProcess,
        }
    }

    /// Spawn a shell process.
    ///
    /// Output chunks are pushed through `data_tx` in the order the process
    /// produced them; `exit_tx` fires exactly once when the process
    /// terminates. `data_tx` is dropped (closing the channel) once the
    /// output stream ends.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        &self,
        spec: &SpawnSpec,
        data_tx: mpsc::Sender<Vec<u8>>,
        exit_tx: oneshot::Sender<ExitStatus>,
    ) -> Result<ProcessHandle> {
        match self {
            Self::NativePty(backend) => backend.spawn(spec, data_tx, exit_tx),
            Self::Fallback(backend) => backend.spawn(spec, data_tx, exit_tx),
        }
    }
}

/// Capacity of a session's input channel, in chunks.
const INPUT_QUEUE: usize = 256;

/// A handle to a spawned shell process.
///
/// All operations are best-effort: a handle whose process has already died
/// swallows write/kill failures, matching a terminal that simply stops
/// echoing. The asynchronous exit event is the authoritative death signal.
///
/// Input never blocks the caller: bytes go through a channel consumed by an
/// [`InputPump`] on a blocking thread, so a process that stops draining its
/// input pipe stalls only that pump. Dropping the handle closes the channel
/// and stops the pump.
pub struct ProcessHandle {
    kind: BackendKind,
    input: mpsc::Sender<Vec<u8>>,
    control: Control,
}

enum Control {
    Pty {
        master: Mutex<Box<dyn portable_pty::MasterPty + Send>>,
        killer: Mutex<Box<dyn portable_pty::ChildKiller + Send + Sync>>,
    },
    Child {
        child: Arc<Mutex<std::process::Child>>,
    },
}

impl ProcessHandle {
    pub(crate) fn pty(
        writer: Box<dyn Write + Send>,
        master: Box<dyn portable_pty::MasterPty + Send>,
        killer: Box<dyn portable_pty::ChildKiller + Send + Sync>,
    ) -> Self {
        Self {
            kind: BackendKind::NativePty,
            input: spawn_input_pump(writer),
            control: Control::Pty {
                master: Mutex::new(master),
                killer: Mutex::new(killer),
            },
        }
    }

    pub(crate) fn child(
        writer: Box<dyn Write + Send>,
        child: Arc<Mutex<std::process::Child>>,
    ) -> Self {
        Self {
            kind: BackendKind::FallbackChildProcess,
            input: spawn_input_pump(writer),
            control: Control::Child { child },
        }
    }

    /// Which backend this handle came from.
    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    /// Feed bytes to the process input. Best-effort; failures are swallowed.
    ///
    /// Never blocks: the chunk is queued for the input pump. A full queue
    /// (process not draining its input) or a finished pump drops the chunk.
    pub fn write(&self, bytes: &[u8]) {
        if let Err(e) = self.input.try_send(bytes.to_vec()) {
            debug!("session input dropped: {}", e);
        }
    }

    /// Adjust the reported terminal dimensions.
    ///
    /// A no-op for the fallback backend: there is no PTY device to resize.
    pub fn resize(&self, size: PtySize) {
        match &self.control {
            Control::Pty { master, .. } => {
                let Ok(master) = master.lock() else {
                    return;
                };
                let native = portable_pty::PtySize {
                    rows: size.rows,
                    cols: size.cols,
                    pixel_width: 0,
                    pixel_height: 0,
                };
                if let Err(e) = master.resize(native) {
                    debug!("resize ignored: {}", e);
                }
            }
            Control::Child { .. } => {
                trace!("resize ignored: fallback backend has no PTY");
            }
        }
    }

    /// Request process termination. Best-effort; failures are swallowed.
    pub fn kill(&self) {
        match &self.control {
            Control::Pty { killer, .. } => {
                if let Ok(mut killer) = killer.lock() {
                    if let Err(e) = killer.kill() {
                        debug!("kill ignored: {}", e);
                    }
                }
            }
            Control::Child { child } => {
                if let Ok(mut child) = child.lock() {
                    if let Err(e) = child.kill() {
                        debug!("kill ignored: {}", e);
                    }
                }
            }
        }
    }
}

/// Start the writer loop for one process and hand back its input channel.
///
/// Must be called from within a tokio runtime.
fn spawn_input_pump(writer: Box<dyn Write + Send>) -> mpsc::Sender<Vec<u8>> {
    let (input_tx, input_rx) = mpsc::channel(INPUT_QUEUE);
    tokio::spawn(InputPump::new(writer, input_rx).run());
    input_tx
}
