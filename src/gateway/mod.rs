//! IPC gateway for the editor UI process.
//!
//! Exposes session-registry and file-system operations to the untrusted UI
//! over a fixed set of JSON endpoints, plus one shared WebSocket stream for
//! unsolicited session events. A pass-through layer: marshaling only, no
//! business logic.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//!
//! ### Sessions
//! - `GET /api/v1/sessions` - List live sessions
//! - `POST /api/v1/sessions` - Create a session
//! - `POST /api/v1/sessions/{id}/input` - Feed input bytes
//! - `POST /api/v1/sessions/{id}/resize` - Resize the terminal
//! - `DELETE /api/v1/sessions/{id}` - Kill a session
//! - `WS /api/v1/events` - Shared event stream (`session_data` / `session_exit`)
//!
//! ### Filesystem & dialogs
//! - `POST /api/v1/fs/read` / `fs/write` / `fs/list`
//! - `POST /api/v1/dialogs/open-file` / `open-folder` / `save-file` / `save-as`
//!
//! ### One-shot execution
//! - `POST /api/v1/execute` - Run a command, capture combined output

pub mod events;
pub mod handlers;
pub mod router;
pub mod types;

// Re-export commonly used types
pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve_with_state, ServerConfig};
pub use types::{
    CreateSessionRequest, CreateSessionResponse, ErrorResponse, ExecuteRequest, ExecuteResponse,
    ListSessionsResponse, WsEvent,
};
