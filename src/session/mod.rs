//! Terminal session management.
//!
//! A session is one spawned shell process plus its bookkeeping, addressed by
//! an opaque id. The registry in this module is the single owner of the
//! id-to-handle map and the sole authority for teardown.

mod event;
mod id;
mod registry;

pub use event::SessionEvent;
pub use id::SessionId;
pub use registry::{CreateSessionOptions, SessionRegistry, SessionSnapshot};
