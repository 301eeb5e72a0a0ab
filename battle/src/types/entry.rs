//! Roster entry types

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BattleError;

use super::ids::{EntryId, ParticipantId};
use super::rarity::Rarity;

/// An external roster record supplied by the collaborator.
///
/// The core does not know where these come from (a database of owned
/// creatures, usually); it only needs the resolved stats and the source id
/// used for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SourceRecord {
    pub source_id: EntryId,
    pub name: String,
    pub health: u32,
    pub attack: u32,
    pub rarities: BTreeSet<Rarity>,
}

impl SourceRecord {
    /// Convenience constructor for records with no rarity tags.
    pub fn new(source_id: u64, name: impl Into<String>, health: u32, attack: u32) -> Self {
        Self {
            source_id: EntryId(source_id),
            name: name.into(),
            health,
            attack,
            rarities: BTreeSet::new(),
        }
    }

    /// Add a rarity tag to this record.
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarities.insert(rarity);
        self
    }
}

/// One creature instance participating in a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RosterEntry {
    /// Id of the source record this entry was created from.
    pub id: EntryId,

    /// Display name.
    pub name: String,

    /// Participant that owns this entry.
    pub owner: ParticipantId,

    /// Health after rarity bonuses, before any damage.
    pub max_health: u32,

    /// Current health. Clamped at 0; an entry at 0 is dead and stays dead.
    pub health: u32,

    /// Attack stat after rarity bonuses.
    pub attack: u32,

    /// Rarity tags carried by this entry.
    pub rarities: BTreeSet<Rarity>,
}

impl RosterEntry {
    /// Create an entry from a source record, applying rarity bonuses.
    ///
    /// Bonuses from every tagged rarity present in the bonus table are added
    /// cumulatively. Rejects records with zero base health.
    pub fn from_record(record: &SourceRecord, owner: ParticipantId) -> Result<Self, BattleError> {
        if record.health == 0 {
            return Err(BattleError::InvalidRoster(format!(
                "entry '{}' has zero health",
                record.name
            )));
        }

        let mut health = record.health;
        let mut attack = record.attack;
        for rarity in &record.rarities {
            if let Some(bonus) = rarity.bonus() {
                health += bonus.health;
                attack += bonus.attack;
            }
        }

        Ok(Self {
            id: record.source_id,
            name: record.name.clone(),
            owner,
            max_health: health,
            health,
            attack,
            rarities: record.rarities.clone(),
        })
    }

    /// Whether this entry is still in the fight.
    pub fn alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, clamping health at 0. Returns the remaining health.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.health = self.health.saturating_sub(damage);
        self.health
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_record_base_stats() {
        let record = SourceRecord::new(1, "Francedex", 100, 50);
        let entry = RosterEntry::from_record(&record, ParticipantId(9)).unwrap();

        assert_eq!(entry.id, EntryId(1));
        assert_eq!(entry.owner, ParticipantId(9));
        assert_eq!(entry.health, 100);
        assert_eq!(entry.max_health, 100);
        assert_eq!(entry.attack, 50);
        assert!(entry.alive());
    }

    #[test]
    fn test_bonuses_are_additive() {
        let record = SourceRecord::new(1, "Double", 100, 50)
            .with_rarity(Rarity::Shiny)
            .with_rarity(Rarity::Mythic);
        let entry = RosterEntry::from_record(&record, ParticipantId(1)).unwrap();

        assert_eq!(entry.health, 10100);
        assert_eq!(entry.attack, 10050);
    }

    #[test]
    fn test_boss_tag_grants_nothing() {
        let record = SourceRecord::new(1, "Big", 100, 50).with_rarity(Rarity::Boss);
        let entry = RosterEntry::from_record(&record, ParticipantId(1)).unwrap();

        assert_eq!(entry.health, 100);
        assert_eq!(entry.attack, 50);
        assert!(entry.rarities.contains(&Rarity::Boss));
    }

    #[test]
    fn test_zero_health_rejected() {
        let record = SourceRecord::new(1, "Ghost", 0, 50);
        let err = RosterEntry::from_record(&record, ParticipantId(1)).unwrap_err();
        assert!(matches!(err, BattleError::InvalidRoster(_)));
    }

    #[test]
    fn test_take_damage_clamps_at_zero() {
        let record = SourceRecord::new(1, "Frail", 30, 10);
        let mut entry = RosterEntry::from_record(&record, ParticipantId(1)).unwrap();

        assert_eq!(entry.take_damage(20), 10);
        assert!(entry.alive());

        assert_eq!(entry.take_damage(9999), 0);
        assert!(!entry.alive());
    }
}
