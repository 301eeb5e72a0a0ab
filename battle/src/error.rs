use thiserror::Error;

/// Errors produced by session operations and turn resolution.
///
/// Every error is local to a single session and operation; nothing here is
/// ever fatal to the surrounding process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid roster entry: {0}")]
    InvalidRoster(String),

    #[error("Battle has already started")]
    BattleAlreadyStarted,

    #[error("Participant {0} is already registered")]
    AlreadyJoined(crate::types::ParticipantId),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation not allowed in this mode: {0}")]
    ModeNotAllowed(String),

    #[error("Action no longer matches the live turn")]
    StaleAction,

    #[error("Battle needs participants on both teams to start")]
    NoParticipants,

    #[error("Turn order is empty")]
    EmptyTurnOrder,

    #[error("Battle is not running")]
    NotRunning,
}
