//! Gateway request and response types.
//!
//! Request/response payloads are enveloped as `{ok: true, ...}` or
//! `{ok: false, error}`; dialog payloads use `{canceled, ...}` because a
//! canceled dialog is a user decision, not an error.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::backend::ExitStatus;
use crate::files::DirectoryEntry;
use crate::session::{SessionEvent, SessionId, SessionSnapshot};

fn default_cols() -> u16 {
    80
}

fn default_rows() -> u16 {
    24
}

/// Request to create a new terminal session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default = "default_cols")]
    pub cols: u16,
    #[serde(default = "default_rows")]
    pub rows: u16,
    /// Shell command override (e.g. "zsh", "powershell.exe").
    #[serde(default)]
    pub shell: Option<String>,
}

impl Default for CreateSessionRequest {
    fn default() -> Self {
        Self {
            cols: default_cols(),
            rows: default_rows(),
            shell: None,
        }
    }
}

/// Response for session creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionResponse {
    pub ok: bool,
    pub id: SessionId,
    /// Capability tier: false means the child-process fallback is in use
    /// and resize requests will be accepted as no-ops.
    pub uses_native_pty: bool,
}

impl CreateSessionResponse {
    pub fn new(id: SessionId, uses_native_pty: bool) -> Self {
        Self {
            ok: true,
            id,
            uses_native_pty,
        }
    }
}

/// Input bytes for a session, as text.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteSessionRequest {
    pub data: String,
}

/// New terminal dimensions for a session.
#[derive(Debug, Clone, Deserialize)]
pub struct ResizeSessionRequest {
    pub cols: u16,
    pub rows: u16,
}

/// Bare success envelope.
#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl Default for OkResponse {
    fn default() -> Self {
        Self { ok: true }
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }

    pub fn session_not_found(id: &str) -> Self {
        Self::new(format!("session not found: {}", id))
    }
}

/// Summary of one live session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub uses_native_pty: bool,
    pub cols: u16,
    pub rows: u16,
}

impl From<SessionSnapshot> for SessionSummary {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            id: snapshot.id,
            uses_native_pty: snapshot.kind == crate::backend::BackendKind::NativePty,
            cols: snapshot.size.cols,
            rows: snapshot.size.rows,
        }
    }
}

/// List-sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
}

/// A filesystem operation addressing one path.
#[derive(Debug, Clone, Deserialize)]
pub struct PathRequest {
    pub path: PathBuf,
}

/// Request to write a file.
#[derive(Debug, Clone, Deserialize)]
pub struct WriteFileRequest {
    pub path: PathBuf,
    pub content: String,
}

/// Response for read-file.
#[derive(Debug, Clone, Serialize)]
pub struct ReadFileResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadFileResponse {
    pub fn ok(content: String) -> Self {
        Self {
            ok: true,
            content: Some(content),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            content: None,
            error: Some(error.into()),
        }
    }
}

/// Response for read-dir.
#[derive(Debug, Clone, Serialize)]
pub struct ReadDirResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<DirectoryEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReadDirResponse {
    pub fn ok(entries: Vec<DirectoryEntry>) -> Self {
        Self {
            ok: true,
            entries: Some(entries),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            entries: None,
            error: Some(error.into()),
        }
    }
}

/// Response for the open-file dialog.
#[derive(Debug, Clone, Serialize)]
pub struct OpenFileResponse {
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl OpenFileResponse {
    pub fn canceled() -> Self {
        Self {
            canceled: true,
            file_path: None,
            content: None,
        }
    }

    pub fn selected(file_path: PathBuf, content: String) -> Self {
        Self {
            canceled: false,
            file_path: Some(file_path),
            content: Some(content),
        }
    }
}

/// Response for the open-folder dialog.
#[derive(Debug, Clone, Serialize)]
pub struct OpenFolderResponse {
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<DirectoryEntry>>,
}

impl OpenFolderResponse {
    pub fn canceled() -> Self {
        Self {
            canceled: true,
            folder: None,
            entries: None,
        }
    }

    pub fn selected(folder: PathBuf, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            canceled: false,
            folder: Some(folder),
            entries: Some(entries),
        }
    }
}

/// Request to save a file; the native dialog supplies the path when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveFileRequest {
    #[serde(default)]
    pub path: Option<PathBuf>,
    pub content: String,
}

/// Request for save-as: the dialog always picks the path.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAsRequest {
    pub content: String,
}

/// Response for save-file and save-as dialogs.
#[derive(Debug, Clone, Serialize)]
pub struct SaveFileResponse {
    pub canceled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SaveFileResponse {
    pub fn canceled() -> Self {
        Self {
            canceled: true,
            path: None,
        }
    }

    pub fn saved(path: PathBuf) -> Self {
        Self {
            canceled: false,
            path: Some(path),
        }
    }
}

/// Request to run a one-shot command.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub command: String,
}

/// Captured output of a one-shot command.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub output: String,
}

/// Outbound WebSocket event, multiplexed by session id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Raw output chunk from a session, decoded best-effort as UTF-8.
    SessionData { id: SessionId, data: String },
    /// Final event for a session.
    SessionExit {
        id: SessionId,
        exit_code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        signal: Option<i32>,
    },
}

impl From<&SessionEvent> for WsEvent {
    fn from(event: &SessionEvent) -> Self {
        match event {
            SessionEvent::Data { id, bytes } => Self::SessionData {
                id: id.clone(),
                data: String::from_utf8_lossy(bytes).into_owned(),
            },
            SessionEvent::Exit { id, status } => {
                let ExitStatus { exit_code, signal } = *status;
                Self::SessionExit {
                    id: id.clone(),
                    exit_code,
                    signal,
                }
            }
        }
    }
}
