//! Domain types for battle sessions

pub mod entry;
pub mod ids;
pub mod rarity;
pub mod team;

pub use entry::{RosterEntry, SourceRecord};
pub use ids::{EntryId, ParticipantId, SessionId};
pub use rarity::{Rarity, StatBonus};
pub use team::TeamId;
