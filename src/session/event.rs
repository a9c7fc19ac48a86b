//! Session event types.

use super::SessionId;
use crate::backend::ExitStatus;

/// Event emitted by a live session, tagged with its id.
///
/// All sessions share one event channel; consumers demultiplex by id. For a
/// single session, data events arrive in process order and the exit event is
/// always the last event delivered for that id.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Raw output chunk from the session's process.
    Data { id: SessionId, bytes: Vec<u8> },
    /// The session's process terminated.
    Exit { id: SessionId, status: ExitStatus },
}

impl SessionEvent {
    /// The session this event belongs to.
    pub fn session_id(&self) -> &SessionId {
        match self {
            Self::Data { id, .. } => id,
            Self::Exit { id, .. } => id,
        }
    }

    /// Whether this is the terminal event for its session.
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_accessor() {
        let id = SessionId::from("term-1-0001");
        let data = SessionEvent::Data {
            id: id.clone(),
            bytes: b"hello".to_vec(),
        };
        let exit = SessionEvent::Exit {
            id: id.clone(),
            status: ExitStatus::default(),
        };

        assert_eq!(data.session_id(), &id);
        assert_eq!(exit.session_id(), &id);
        assert!(!data.is_exit());
        assert!(exit.is_exit());
    }
}
