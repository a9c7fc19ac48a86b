//! # codeshell
//!
//! Backend host for a desktop code editor.
//!
//! This crate runs the native side of an editor shell: it owns terminal
//! sessions backed by real ptys (with a plain child-process fallback for
//! hosts where pty allocation fails), serves files and native dialogs to
//! the UI process, and exposes everything over a local JSON/WebSocket
//! gateway.
//!
//! ## Features
//!
//! - **Cross-platform terminals**: portable-pty on Windows (ConPTY) and
//!   Unix, with a piped child-process fallback selected at startup
//! - **Session registry**: id-keyed lifecycle management with a single
//!   outbound event stream (`session_data` / `session_exit`)
//! - **Editor plumbing**: file read/write/list, native open/save dialogs,
//!   one-shot command execution
//!
//! ## Quick Start
//!
//! ```no_run
//! use codeshell::gateway::{serve_with_state, AppState, ServerConfig};
//! use codeshell::ProcessBackend;
//!
//! #[tokio::main]
//! async fn main() -> codeshell::Result<()> {
//!     codeshell::logging::try_init("info").ok();
//!
//!     let backend = ProcessBackend::detect(false);
//!     let state = AppState::new(backend, None);
//!
//!     serve_with_state(ServerConfig::default(), state).await
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod files;
pub mod gateway;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use backend::{BackendKind, ExitStatus, ProcessBackend, ProcessHandle, PtySize, SpawnSpec};
pub use error::{HostError, Result};
pub use session::{CreateSessionOptions, SessionEvent, SessionId, SessionRegistry};
