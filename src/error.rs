//! Error types for codeshell.

use thiserror::Error;

/// Main error type for codeshell operations.
#[derive(Error, Debug)]
pub enum HostError {
    /// Session with the given ID was not found.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Spawning the shell process failed on the active backend.
    #[error("spawn failed: {0}")]
    Spawn(String),

    /// PTY-related error.
    #[error("PTY error: {0}")]
    Pty(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

/// Convenience Result type for codeshell operations.
pub type Result<T> = std::result::Result<T, HostError>;
