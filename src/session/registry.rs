//! Session registry: creation, lookup, and teardown.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, trace};

use super::{SessionEvent, SessionId};
use crate::backend::{BackendKind, ExitStatus, ProcessBackend, ProcessHandle, PtySize, SpawnSpec};
use crate::error::HostError;
use crate::Result;

/// Options for creating a new session.
#[derive(Debug, Clone)]
pub struct CreateSessionOptions {
    /// Terminal width in columns.
    pub cols: u16,
    /// Terminal height in rows.
    pub rows: u16,
    /// Shell command override; platform default when absent.
    pub shell: Option<String>,
}

impl Default for CreateSessionOptions {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            shell: None,
        }
    }
}

/// Read-only view of a live session, for listings.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub size: PtySize,
    pub kind: BackendKind,
}

struct SessionEntry {
    handle: ProcessHandle,
    size: PtySize,
}

/// Owner of the session-id to process-handle map.
///
/// The registry is the only component that inserts or removes entries. Every
/// session's backend events are forwarded, tagged with the session id, into
/// the shared event channel handed over at construction.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, SessionEntry>>,
    backend: ProcessBackend,
    events: mpsc::Sender<SessionEvent>,
    /// Host cwd at startup; every spawned session starts here.
    cwd: Option<PathBuf>,
    /// Shell to use when a session carries no explicit override.
    default_shell: Option<String>,
}

impl SessionRegistry {
    /// Create a registry over the given backend.
    ///
    /// `events` receives every data and exit event of every session this
    /// registry creates.
    pub fn new(backend: ProcessBackend, events: mpsc::Sender<SessionEvent>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            backend,
            events,
            cwd: std::env::current_dir().ok(),
            default_shell: None,
        }
    }

    /// Set a host-wide default shell, overriding the platform default.
    pub fn with_default_shell(mut self, shell: Option<String>) -> Self {
        self.default_shell = shell;
        self
    }

    /// Whether sessions run inside a real pseudo-terminal.
    pub fn uses_native_pty(&self) -> bool {
        self.backend.kind() == BackendKind::NativePty
    }

    /// Create a session: mint an id, spawn the shell, store the handle, and
    /// wire the backend's output into the shared event channel.
    ///
    /// On spawn failure no entry is stored and the error is returned.
    pub fn create(self: &Arc<Self>, opts: CreateSessionOptions) -> Result<SessionId> {
        let id = SessionId::mint();
        let size = PtySize::new(opts.rows, opts.cols);
        let spec = SpawnSpec {
            shell: opts.shell.or_else(|| self.default_shell.clone()),
            size,
            cwd: self.cwd.clone(),
            env: HashMap::new(),
        };

        let (data_tx, data_rx) = mpsc::channel(64);
        let (exit_tx, exit_rx) = oneshot::channel();

        let handle = self.backend.spawn(&spec, data_tx, exit_tx)?;

        {
            let mut sessions = self.sessions.write().map_err(|_| HostError::LockPoisoned)?;
            sessions.insert(id.clone(), SessionEntry { handle, size });
        }

        tokio::spawn(forward_events(
            Arc::clone(self),
            id.clone(),
            data_rx,
            exit_rx,
        ));

        info!("session {} created ({:?})", id, self.backend.kind());
        Ok(id)
    }

    /// Feed input bytes to a session's process.
    ///
    /// Never blocks: the bytes are queued for the session's input pump, so
    /// a process that stops draining its input cannot stall the caller or
    /// hold up other registry operations.
    pub fn write(&self, id: &SessionId, bytes: &[u8]) -> Result<()> {
        let sessions = self.sessions.read().map_err(|_| HostError::LockPoisoned)?;
        let entry = sessions
            .get(id)
            .ok_or_else(|| HostError::SessionNotFound(id.to_string()))?;
        entry.handle.write(bytes);
        Ok(())
    }

    /// Resize a session's terminal. A no-op on the fallback backend.
    pub fn resize(&self, id: &SessionId, cols: u16, rows: u16) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(|_| HostError::LockPoisoned)?;
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| HostError::SessionNotFound(id.to_string()))?;
        let size = PtySize::new(rows, cols);
        entry.handle.resize(size);
        entry.size = size;
        Ok(())
    }

    /// Kill a session and remove it immediately.
    ///
    /// Fire-and-forget: does not wait for the process to actually exit. The
    /// exit event arriving later for the removed id is tolerated silently.
    pub fn kill(&self, id: &SessionId) -> Result<()> {
        let entry = {
            let mut sessions = self.sessions.write().map_err(|_| HostError::LockPoisoned)?;
            sessions
                .remove(id)
                .ok_or_else(|| HostError::SessionNotFound(id.to_string()))?
        };
        entry.handle.kill();
        info!("session {} killed", id);
        Ok(())
    }

    /// Remove an entry after its process exited on its own.
    ///
    /// Returns false when the id was already evicted (explicit kill raced
    /// the exit event); that is expected, not an error.
    fn remove_after_exit(&self, id: &SessionId) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(id).is_some(),
            Err(_) => false,
        }
    }

    /// Whether a session is currently live.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions
            .read()
            .map(|s| s.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of live sessions.
    pub fn count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Snapshot of all live sessions.
    pub fn list(&self) -> Vec<SessionSnapshot> {
        let kind = self.backend.kind();
        self.sessions
            .read()
            .map(|sessions| {
                sessions
                    .iter()
                    .map(|(id, entry)| SessionSnapshot {
                        id: id.clone(),
                        size: entry.size,
                        kind,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Kill every remaining session. Called at host shutdown.
    pub fn shutdown(&self) {
        let entries: Vec<(SessionId, SessionEntry)> = match self.sessions.write() {
            Ok(mut sessions) => sessions.drain().collect(),
            Err(_) => return,
        };
        for (id, entry) in entries {
            debug!("shutdown: killing session {}", id);
            entry.handle.kill();
        }
    }
}

/// Per-session forwarder: tags backend events with the session id.
///
/// Drains the data channel to closure before consuming the exit status, so
/// the exit event is guaranteed to be the last event delivered for this id.
async fn forward_events(
    registry: Arc<SessionRegistry>,
    id: SessionId,
    mut data_rx: mpsc::Receiver<Vec<u8>>,
    exit_rx: oneshot::Receiver<ExitStatus>,
) {
    while let Some(bytes) = data_rx.recv().await {
        let event = SessionEvent::Data {
            id: id.clone(),
            bytes,
        };
        if registry.events.send(event).await.is_err() {
            // Event consumer is gone; skip to exit bookkeeping.
            break;
        }
    }

    let status = exit_rx.await.unwrap_or_default();

    if registry.remove_after_exit(&id) {
        debug!("session {} exited: {:?}", id, status);
    } else {
        trace!("exit for already-removed session {}", id);
    }

    let _ = registry
        .events
        .send(SessionEvent::Exit { id, status })
        .await;
}
