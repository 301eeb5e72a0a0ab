use thiserror::Error;

use brawldex_battle::{BattleError, SessionId};

/// Errors surfaced to collaborators by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    #[error("Session is no longer running")]
    SessionClosed,

    #[error(transparent)]
    Battle(#[from] BattleError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
