//! Battle domain model and turn resolution for brawldex.
//!
//! This crate is the pure core of the battle system: roster entries with
//! rarity bonuses, the session aggregate, and the turn resolver. It has no
//! async code and performs no I/O; the `brawldex-engine` crate drives it.
//!
//! # Overview
//!
//! ```text
//! collaborator (commands, persistence, rendering)
//!        │
//!        ▼
//! brawldex-engine (session store + turn scheduler)
//!        │
//!        ▼
//! brawldex-battle (domain model + resolution) ← THIS CRATE
//! ```
//!
//! # Main Types
//!
//! - [`RosterEntry`] / [`SourceRecord`] - one creature instance and the
//!   external record it is created from
//! - [`Rarity`] - rarity tags with additive stat bonuses
//! - [`BattleSession`] - rosters, teams, readiness, turn order, lifecycle
//! - [`BattleRng`] - seeded random source so battles replay deterministically
//! - [`ChosenAction`] / [`TurnOutcome`] - explicit player actions and what a
//!   resolved turn did
//!
//! # Example Usage
//!
//! ```
//! use brawldex_battle::{
//!     BattleConfig, BattleRng, BattleSession, ParticipantId, SessionId, SourceRecord, TeamId,
//! };
//!
//! let mut session = BattleSession::new(SessionId(1000), BattleConfig::solo(42)).unwrap();
//! session.add_participant(ParticipantId(1), TeamId::Zero).unwrap();
//! session.add_participant(ParticipantId(2), TeamId::One).unwrap();
//! session
//!     .add_entries(ParticipantId(1), &[SourceRecord::new(1, "Francedex", 500, 100)], false)
//!     .unwrap();
//! session
//!     .add_entries(ParticipantId(2), &[SourceRecord::new(2, "Germanydex", 100, 50)], false)
//!     .unwrap();
//! session.set_ready(ParticipantId(1)).unwrap();
//! session.set_ready(ParticipantId(2)).unwrap();
//!
//! let mut rng = BattleRng::new(session.config.seed);
//! while !session.is_battle_over() {
//!     session.resolve_turn(&mut rng, None).unwrap();
//!     if session.is_battle_over() {
//!         break;
//!     }
//!     session.advance_turn().unwrap();
//! }
//! assert!(session.decide_outcome().is_some());
//! ```

pub mod error;
pub mod resolver;
pub mod rng;
pub mod session;
pub mod types;

// Re-export main types at crate root for convenience
pub use error::BattleError;
pub use resolver::{ChosenAction, TurnOutcome};
pub use rng::{BattleRng, BattleRngState, DAMAGE_VARIANCE};
pub use session::{
    AddReport, BattleConfig, BattleMode, BattleOutcome, BattlePhase, BattleSession, ReadyOutcome,
    DEFAULT_MAX_ENTRIES, DEFAULT_TURN_TIMEOUT,
};
pub use types::{
    EntryId, ParticipantId, Rarity, RosterEntry, SessionId, SourceRecord, StatBonus, TeamId,
};
