//! Team identifiers

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two sides of a battle.
///
/// A participant belongs to exactly one team for the lifetime of the
/// session; the team is the unit of win/loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TeamId {
    Zero,
    One,
}

impl TeamId {
    /// Both teams, in display order.
    pub fn both() -> [TeamId; 2] {
        [TeamId::Zero, TeamId::One]
    }

    /// Array index for this team.
    pub fn index(self) -> usize {
        match self {
            TeamId::Zero => 0,
            TeamId::One => 1,
        }
    }

    /// The opposing team.
    pub fn opponent(self) -> TeamId {
        match self {
            TeamId::Zero => TeamId::One,
            TeamId::One => TeamId::Zero,
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team {}", self.index())
    }
}
