//! Outbound events describing session state changes.
//!
//! The engine pushes one of these on every state change; the collaborator
//! owns their presentation (chat embeds, console output, whatever).

use brawldex_battle::{BattleOutcome, ParticipantId, TeamId};

/// A state change in one battle session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// A participant joined a team.
    ParticipantJoined {
        participant: ParticipantId,
        team: TeamId,
    },

    /// A participant's roster changed (add or remove).
    RosterUpdated {
        participant: ParticipantId,
        roster_size: usize,
    },

    /// A participant marked themselves ready.
    ParticipantReady { participant: ParticipantId },

    /// Everyone is ready; combat begins.
    Started { turn_order: Vec<ParticipantId> },

    /// The scheduler is waiting for this participant's action
    /// (timed variant only).
    TurnAwaited { participant: ParticipantId },

    /// A turn resolved; `line` is the log line it produced.
    TurnResolved {
        participant: ParticipantId,
        line: String,
    },

    /// The battle ran to a decision. Carries the full ordered log.
    Finished {
        outcome: BattleOutcome,
        log: Vec<String>,
    },

    /// The engine gave up on the session: an internal error or the turn
    /// cap. Fatal to this battle only; other sessions are unaffected.
    Aborted { reason: String },
}
