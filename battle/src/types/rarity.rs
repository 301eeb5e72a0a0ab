//! Rarity tags and their stat bonuses

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Flat stat bonus granted by a rarity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatBonus {
    pub health: u32,
    pub attack: u32,
}

/// A rarity tag on a roster entry.
///
/// Bonuses are additive and stack when an entry carries several tags; they
/// are applied exactly once, at entry creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rarity {
    Shiny,
    Robot,
    Mythic,
    GlobalSuperpower,
    /// Boss entries are tagged for display purposes but carry no bonus.
    Boss,
}

impl Rarity {
    /// All known rarity tags.
    pub fn all() -> &'static [Rarity] {
        &[
            Rarity::Shiny,
            Rarity::Robot,
            Rarity::Mythic,
            Rarity::GlobalSuperpower,
            Rarity::Boss,
        ]
    }

    /// Stat bonus for this tag, if the bonus table has an entry for it.
    pub fn bonus(self) -> Option<StatBonus> {
        match self {
            Rarity::Shiny => Some(StatBonus {
                health: 2500,
                attack: 2500,
            }),
            Rarity::Robot => Some(StatBonus {
                health: 100,
                attack: 100,
            }),
            Rarity::Mythic => Some(StatBonus {
                health: 7500,
                attack: 7500,
            }),
            Rarity::GlobalSuperpower => Some(StatBonus {
                health: 3750,
                attack: 3750,
            }),
            Rarity::Boss => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bonus_values() {
        assert_eq!(
            Rarity::Shiny.bonus(),
            Some(StatBonus {
                health: 2500,
                attack: 2500
            })
        );
        assert_eq!(
            Rarity::Mythic.bonus(),
            Some(StatBonus {
                health: 7500,
                attack: 7500
            })
        );
        assert_eq!(
            Rarity::GlobalSuperpower.bonus(),
            Some(StatBonus {
                health: 3750,
                attack: 3750
            })
        );
    }

    #[test]
    fn test_boss_has_no_bonus() {
        assert_eq!(Rarity::Boss.bonus(), None);
    }

    #[test]
    fn test_all_contains_every_tag() {
        assert_eq!(Rarity::all().len(), 5);
    }
}
