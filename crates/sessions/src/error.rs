use thiserror::Error;

/// Invalid command invocations. None of these mutate state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("a session is already active in this channel")]
    AlreadyActive,

    #[error("no active session in this channel")]
    NoActiveSession,

    #[error("frequency must be at least one minute, got {0}")]
    InvalidFrequency(u32),
}
