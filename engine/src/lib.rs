//! Async session store and timed turn scheduler for brawldex battles.
//!
//! This crate drives the pure `brawldex-battle` model: each session runs on
//! its own worker task, commands arrive through a cloneable
//! [`SessionHandle`], and every state change is pushed to the collaborator
//! as a [`BattleEvent`].
//!
//! # Overview
//!
//! ```text
//! collaborator ──commands──> SessionHandle ──mpsc──> SessionWorker (task)
//!      ▲                                                  │
//!      └────────────────── BattleEvent stream ────────────┘
//! ```
//!
//! While a timed battle is running, the worker races the current actor's
//! submitted action against a deadline; on timeout it substitutes an
//! automatic random action, so an unresponsive participant never stalls the
//! battle. With `turn_timeout` unset, turns resolve automatically with no
//! waiting.
//!
//! # Example Usage
//!
//! ```ignore
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut store = SessionStore::new();
//! let handle = store.create(BattleConfig::solo(42).automatic(), events_tx)?;
//!
//! handle.add_participant(ParticipantId(1), TeamId::Zero).await?;
//! handle.add_participant(ParticipantId(2), TeamId::One).await?;
//! // ... add entries, set everyone ready, then consume events_rx
//! ```

pub mod error;
pub mod event;
pub mod handle;
pub mod store;

mod worker;

pub use error::{EngineError, Result};
pub use event::BattleEvent;
pub use handle::SessionHandle;
pub use store::SessionStore;

// Re-export the domain types collaborators need to talk to the engine
pub use brawldex_battle::{
    AddReport, BattleConfig, BattleError, BattleMode, BattleOutcome, BattlePhase, BattleSession,
    ChosenAction, EntryId, ParticipantId, Rarity, RosterEntry, SessionId, SourceRecord, TeamId,
};
