//! Request/response handlers.
//!
//! The gateway performs no business logic beyond argument marshaling:
//! every handler validates its input, forwards to the registry, the file
//! accessor, or the one-shot runner, and wraps the outcome in the response
//! envelope. Blocking filesystem and dialog calls run on blocking tasks.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tokio::sync::{broadcast, mpsc};

use super::events::dispatch_events;
use super::types::{
    CreateSessionRequest, CreateSessionResponse, ErrorResponse, ExecuteRequest, ExecuteResponse,
    ListSessionsResponse, OkResponse, OpenFileResponse, OpenFolderResponse, PathRequest,
    ReadDirResponse, ReadFileResponse, ResizeSessionRequest, SaveAsRequest, SaveFileRequest,
    SaveFileResponse, SessionSummary, WriteFileRequest, WriteSessionRequest,
};
use crate::backend::ProcessBackend;
use crate::error::HostError;
use crate::session::{CreateSessionOptions, SessionEvent, SessionId, SessionRegistry};
use crate::{exec, files};

/// Capacity of the channel between the registry and the event dispatcher.
const EVENT_QUEUE: usize = 256;

/// Capacity of the per-subscriber broadcast buffer.
const BROADCAST_QUEUE: usize = 1024;

/// Shared application state.
///
/// Construction wires the registry's event channel to a broadcast fan-out
/// consumed by WebSocket subscribers. Must be created within a tokio
/// runtime.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub events: broadcast::Sender<SessionEvent>,
}

impl AppState {
    pub fn new(backend: ProcessBackend, default_shell: Option<String>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_QUEUE);
        let registry =
            Arc::new(SessionRegistry::new(backend, events_tx).with_default_shell(default_shell));
        tokio::spawn(dispatch_events(events_rx, broadcast_tx.clone()));
        Self {
            registry,
            events: broadcast_tx,
        }
    }
}

type SessionError = (StatusCode, Json<ErrorResponse>);

fn map_session_error(id: &SessionId, err: HostError) -> SessionError {
    match err {
        HostError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::session_not_found(id.as_str())),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(other.to_string())),
        ),
    }
}

fn internal_error(message: impl Into<String>) -> SessionError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "codeshell",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Create a new terminal session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), SessionError> {
    let opts = CreateSessionOptions {
        cols: req.cols,
        rows: req.rows,
        shell: req.shell,
    };

    let id = state
        .registry
        .create(opts)
        .map_err(|e| internal_error(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse::new(
            id,
            state.registry.uses_native_pty(),
        )),
    ))
}

/// List all live sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let sessions: Vec<SessionSummary> = state
        .registry
        .list()
        .into_iter()
        .map(SessionSummary::from)
        .collect();

    Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    })
}

/// Feed input to a session.
pub async fn write_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<WriteSessionRequest>,
) -> Result<Json<OkResponse>, SessionError> {
    let id = SessionId::from(id);
    state
        .registry
        .write(&id, req.data.as_bytes())
        .map_err(|e| map_session_error(&id, e))?;
    Ok(Json(OkResponse::default()))
}

/// Resize a session's terminal.
pub async fn resize_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ResizeSessionRequest>,
) -> Result<Json<OkResponse>, SessionError> {
    let id = SessionId::from(id);
    state
        .registry
        .resize(&id, req.cols, req.rows)
        .map_err(|e| map_session_error(&id, e))?;
    Ok(Json(OkResponse::default()))
}

/// Kill a session and remove it immediately.
pub async fn kill_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>, SessionError> {
    let id = SessionId::from(id);
    state
        .registry
        .kill(&id)
        .map_err(|e| map_session_error(&id, e))?;
    Ok(Json(OkResponse::default()))
}

/// Read a file. Filesystem failures are recovered into `{ok:false}`.
pub async fn fs_read(Json(req): Json<PathRequest>) -> Json<ReadFileResponse> {
    let result = tokio::task::spawn_blocking(move || files::read_file(&req.path)).await;
    Json(match result {
        Ok(Ok(content)) => ReadFileResponse::ok(content),
        Ok(Err(e)) => ReadFileResponse::err(e.to_string()),
        Err(e) => ReadFileResponse::err(e.to_string()),
    })
}

/// Write a file. Filesystem failures are recovered into `{ok:false}`.
pub async fn fs_write(Json(req): Json<WriteFileRequest>) -> Json<serde_json::Value> {
    let result =
        tokio::task::spawn_blocking(move || files::write_file(&req.path, &req.content)).await;
    Json(match result {
        Ok(Ok(())) => serde_json::json!({"ok": true}),
        Ok(Err(e)) => serde_json::json!({"ok": false, "error": e.to_string()}),
        Err(e) => serde_json::json!({"ok": false, "error": e.to_string()}),
    })
}

/// List a directory, directories-first then lexicographic.
pub async fn fs_list(Json(req): Json<PathRequest>) -> Json<ReadDirResponse> {
    let result = tokio::task::spawn_blocking(move || files::read_dir(&req.path)).await;
    Json(match result {
        Ok(Ok(entries)) => ReadDirResponse::ok(entries),
        Ok(Err(e)) => ReadDirResponse::err(e.to_string()),
        Err(e) => ReadDirResponse::err(e.to_string()),
    })
}

/// Show the native open-file dialog and read the chosen file.
pub async fn open_file_dialog() -> Result<Json<OpenFileResponse>, SessionError> {
    let outcome = tokio::task::spawn_blocking(|| {
        files::pick_open_file().map(|path| files::read_file(&path).map(|content| (path, content)))
    })
    .await
    .map_err(|e| internal_error(e.to_string()))?;

    match outcome {
        None => Ok(Json(OpenFileResponse::canceled())),
        Some(Ok((path, content))) => Ok(Json(OpenFileResponse::selected(path, content))),
        Some(Err(e)) => Err(internal_error(e.to_string())),
    }
}

/// Show the native open-folder dialog and list it two levels deep.
pub async fn open_folder_dialog() -> Result<Json<OpenFolderResponse>, SessionError> {
    let outcome = tokio::task::spawn_blocking(|| {
        files::pick_folder().map(|path| files::walk_folder(&path).map(|entries| (path, entries)))
    })
    .await
    .map_err(|e| internal_error(e.to_string()))?;

    match outcome {
        None => Ok(Json(OpenFolderResponse::canceled())),
        Some(Ok((folder, entries))) => Ok(Json(OpenFolderResponse::selected(folder, entries))),
        Some(Err(e)) => Err(internal_error(e.to_string())),
    }
}

/// Save content to a path, asking the native dialog when no path was given.
pub async fn save_file_dialog(
    Json(req): Json<SaveFileRequest>,
) -> Result<Json<SaveFileResponse>, SessionError> {
    let outcome = tokio::task::spawn_blocking(move || {
        let target = match req.path {
            Some(path) => path,
            None => match files::pick_save_path() {
                Some(path) => path,
                None => return Ok(None),
            },
        };
        files::write_file(&target, &req.content).map(|_| Some(target))
    })
    .await
    .map_err(|e| internal_error(e.to_string()))?;

    match outcome {
        Ok(None) => Ok(Json(SaveFileResponse::canceled())),
        Ok(Some(path)) => Ok(Json(SaveFileResponse::saved(path))),
        Err(e) => Err(internal_error(e.to_string())),
    }
}

/// Save content under a dialog-chosen path.
pub async fn save_as_dialog(
    Json(req): Json<SaveAsRequest>,
) -> Result<Json<SaveFileResponse>, SessionError> {
    let outcome = tokio::task::spawn_blocking(move || match files::pick_save_path() {
        Some(path) => files::write_file(&path, &req.content).map(|_| Some(path)),
        None => Ok(None),
    })
    .await
    .map_err(|e| internal_error(e.to_string()))?;

    match outcome {
        Ok(None) => Ok(Json(SaveFileResponse::canceled())),
        Ok(Some(path)) => Ok(Json(SaveFileResponse::saved(path))),
        Err(e) => Err(internal_error(e.to_string())),
    }
}

/// Run a one-shot command and return its captured output.
pub async fn execute_command(
    Json(req): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, SessionError> {
    let output = tokio::task::spawn_blocking(move || exec::run_one_shot(&req.command))
        .await
        .map_err(|e| internal_error(e.to_string()))?;
    Ok(Json(ExecuteResponse { output }))
}
