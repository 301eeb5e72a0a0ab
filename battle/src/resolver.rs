//! Turn resolution: attacker/target selection, damage, win condition.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BattleError;
use crate::rng::BattleRng;
use crate::session::{BattleOutcome, BattlePhase, BattleSession};
use crate::types::{EntryId, ParticipantId, RosterEntry, TeamId};

/// An explicit attacker/target pair chosen by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChosenAction {
    pub attacker: EntryId,
    pub target: EntryId,
}

/// What one resolved turn did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An attack landed.
    Attacked {
        attacker: EntryId,
        target: EntryId,
        damage: u32,
        defeated: bool,
        /// The log line appended to the session log.
        line: String,
    },
    /// The acting participant had no alive entries; nothing happened.
    Skipped(ParticipantId),
    /// No alive targets remain on any opposing team; the battle is decided.
    NoTargets,
}

impl BattleSession {
    /// Resolve one turn for the current actor.
    ///
    /// With no explicit action, attacker and target are chosen uniformly at
    /// random among the alive candidates. Damage is `round(attack * U)` with
    /// `U` uniform in `[0.8, 1.2]`; health is clamped at 0 and a defeated
    /// entry stays defeated.
    pub fn resolve_turn(
        &mut self,
        rng: &mut BattleRng,
        action: Option<ChosenAction>,
    ) -> Result<TurnOutcome, BattleError> {
        if self.phase != BattlePhase::Running {
            return Err(BattleError::NotRunning);
        }
        let actor = self.current_actor().ok_or(BattleError::EmptyTurnOrder)?;

        if let Some(chosen) = &action {
            self.validate_action(actor, chosen)?;
        }

        let attacker_ids = self.alive_entry_ids_of(actor);
        let enemy_ids = self.alive_enemy_ids(actor)?;
        if enemy_ids.is_empty() {
            return Ok(TurnOutcome::NoTargets);
        }

        let (attacker_id, target_id) = match action {
            Some(chosen) => (chosen.attacker, chosen.target),
            None => {
                let Some(&attacker_id) = rng.choose(&attacker_ids) else {
                    return Ok(TurnOutcome::Skipped(actor));
                };
                let Some(&target_id) = rng.choose(&enemy_ids) else {
                    return Ok(TurnOutcome::NoTargets);
                };
                (attacker_id, target_id)
            }
        };

        let (attacker_name, attack) = {
            let attacker = self
                .find_entry(attacker_id)
                .ok_or_else(|| BattleError::NotFound(format!("attacker {attacker_id}")))?;
            (attacker.name.clone(), attacker.attack)
        };

        let damage = (attack as f64 * rng.damage_factor()).round() as u32;

        let target = self
            .find_entry_mut(target_id)
            .ok_or_else(|| BattleError::NotFound(format!("target {target_id}")))?;
        target.take_damage(damage);
        let defeated = !target.alive();
        let target_name = target.name.clone();

        let line = if defeated {
            format!("Player {actor}: {attacker_name} defeated {target_name}!")
        } else {
            format!("Player {actor}: {attacker_name} dealt {damage} damage to {target_name}.")
        };
        self.push_log(line.clone());

        Ok(TurnOutcome::Attacked {
            attacker: attacker_id,
            target: target_id,
            damage,
            defeated,
            line,
        })
    }

    /// Check that an explicit action is legal for the given actor.
    ///
    /// The attacker must be an alive entry owned by the actor and the target
    /// an alive entry on an opposing team; anything else is `NotFound`.
    pub fn validate_action(
        &self,
        actor: ParticipantId,
        action: &ChosenAction,
    ) -> Result<(), BattleError> {
        let attacker = self
            .roster(actor)
            .and_then(|r| r.iter().find(|e| e.id == action.attacker))
            .ok_or_else(|| BattleError::NotFound(format!("attacker {}", action.attacker)))?;
        if !attacker.alive() {
            return Err(BattleError::NotFound(format!(
                "attacker {} is defeated",
                action.attacker
            )));
        }

        let actor_team = self
            .team_of(actor)
            .ok_or_else(|| BattleError::NotFound(format!("participant {actor}")))?;
        let target = self
            .find_entry(action.target)
            .ok_or_else(|| BattleError::NotFound(format!("target {}", action.target)))?;
        if !target.alive() || self.team_of(target.owner) == Some(actor_team) {
            return Err(BattleError::NotFound(format!(
                "target {} is not a valid enemy",
                action.target
            )));
        }
        Ok(())
    }

    /// Teams that still have at least one alive entry.
    pub fn alive_teams(&self) -> Vec<TeamId> {
        TeamId::both()
            .into_iter()
            .filter(|team| {
                self.teams[team.index()].iter().any(|p| {
                    self.rosters
                        .get(p)
                        .is_some_and(|r| r.iter().any(RosterEntry::alive))
                })
            })
            .collect()
    }

    /// True iff at most one team retains any alive entry.
    pub fn is_battle_over(&self) -> bool {
        self.alive_teams().len() <= 1
    }

    /// The final outcome, or `None` while two teams are still standing.
    ///
    /// Zero alive teams is an explicit draw, never an arbitrary winner.
    pub fn decide_outcome(&self) -> Option<BattleOutcome> {
        match self.alive_teams().as_slice() {
            [] => Some(BattleOutcome::Draw),
            [winner] => Some(BattleOutcome::Victory(*winner)),
            _ => None,
        }
    }

    /// Move to the next participant in turn order, wrapping around.
    ///
    /// Wraps indefinitely; the scheduler loop owns termination.
    pub fn advance_turn(&mut self) -> Result<(), BattleError> {
        if self.turn_order.is_empty() {
            return Err(BattleError::EmptyTurnOrder);
        }
        self.current_turn_index = (self.current_turn_index + 1) % self.turn_order.len();
        Ok(())
    }

    fn alive_entry_ids_of(&self, participant: ParticipantId) -> Vec<EntryId> {
        self.roster(participant)
            .map(|r| r.iter().filter(|e| e.alive()).map(|e| e.id).collect())
            .unwrap_or_default()
    }

    /// Alive entries belonging to any team other than the actor's.
    fn alive_enemy_ids(&self, actor: ParticipantId) -> Result<Vec<EntryId>, BattleError> {
        let actor_team = self
            .team_of(actor)
            .ok_or_else(|| BattleError::NotFound(format!("participant {actor}")))?;

        let mut ids = Vec::new();
        for team in TeamId::both() {
            if team == actor_team {
                continue;
            }
            for participant in &self.teams[team.index()] {
                if let Some(roster) = self.rosters.get(participant) {
                    ids.extend(roster.iter().filter(|e| e.alive()).map(|e| e.id));
                }
            }
        }
        Ok(ids)
    }

    fn find_entry(&self, id: EntryId) -> Option<&RosterEntry> {
        self.rosters.values().flatten().find(|e| e.id == id)
    }

    fn find_entry_mut(&mut self, id: EntryId) -> Option<&mut RosterEntry> {
        self.rosters.values_mut().flatten().find(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::BattleConfig;
    use crate::types::{SessionId, SourceRecord};

    const P1: ParticipantId = ParticipantId(1);
    const P2: ParticipantId = ParticipantId(2);

    /// Solo session, already running, with the given entries per side.
    fn running(side_a: &[SourceRecord], side_b: &[SourceRecord]) -> BattleSession {
        let mut session = BattleSession::new(SessionId(1000), BattleConfig::solo(42)).unwrap();
        session.add_participant(P1, TeamId::Zero).unwrap();
        session.add_participant(P2, TeamId::One).unwrap();
        session.add_entries(P1, side_a, false).unwrap();
        session.add_entries(P2, side_b, false).unwrap();
        session.set_ready(P1).unwrap();
        session.set_ready(P2).unwrap();
        session
    }

    fn record(id: u64, hp: u32, atk: u32) -> SourceRecord {
        SourceRecord::new(id, format!("Ball{id}"), hp, atk)
    }

    fn total_health(session: &BattleSession, participant: ParticipantId) -> u32 {
        session
            .roster(participant)
            .unwrap()
            .iter()
            .map(|e| e.health)
            .sum()
    }

    #[test]
    fn test_damage_within_variance_and_never_heals() {
        for seed in 0..20 {
            let mut session = running(&[record(1, 1000, 100)], &[record(2, 10_000, 1)]);
            let mut rng = BattleRng::new(seed);

            let before = total_health(&session, P2);
            let outcome = session.resolve_turn(&mut rng, None).unwrap();
            let after = total_health(&session, P2);

            let TurnOutcome::Attacked { damage, .. } = outcome else {
                panic!("expected an attack, got {outcome:?}");
            };
            assert!((80..=120).contains(&damage), "damage {damage} out of range");
            assert_eq!(before - after, damage);
            assert!(after < before);
        }
    }

    #[test]
    fn test_defeat_marks_entry_dead_and_logs_it() {
        let mut session = running(&[record(1, 500, 100)], &[record(2, 10, 50)]);
        let mut rng = BattleRng::new(1);

        let outcome = session.resolve_turn(&mut rng, None).unwrap();
        let TurnOutcome::Attacked { defeated, .. } = outcome else {
            panic!("expected an attack");
        };
        assert!(defeated);

        let target = &session.roster(P2).unwrap()[0];
        assert_eq!(target.health, 0);
        assert!(!target.alive());
        assert!(session.log().last().unwrap().contains("defeated"));
    }

    #[test]
    fn test_empty_roster_actor_is_skipped() {
        let mut session = running(&[], &[record(2, 100, 50)]);
        let mut rng = BattleRng::new(1);

        let outcome = session.resolve_turn(&mut rng, None).unwrap();
        assert_eq!(outcome, TurnOutcome::Skipped(P1));
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_no_targets_when_enemy_side_is_down() {
        let mut session = running(&[record(1, 100, 50)], &[record(2, 100, 50)]);
        session.find_entry_mut(EntryId(2)).unwrap().take_damage(999);

        let mut rng = BattleRng::new(1);
        let outcome = session.resolve_turn(&mut rng, None).unwrap();
        assert_eq!(outcome, TurnOutcome::NoTargets);
    }

    #[test]
    fn test_is_battle_over_counts_teams_not_participants() {
        let mut session = running(&[record(1, 100, 50)], &[record(2, 100, 50)]);
        assert!(!session.is_battle_over());
        assert_eq!(session.decide_outcome(), None);

        session.find_entry_mut(EntryId(2)).unwrap().take_damage(999);
        assert!(session.is_battle_over());
        assert_eq!(
            session.decide_outcome(),
            Some(BattleOutcome::Victory(TeamId::Zero))
        );
    }

    #[test]
    fn test_zero_alive_teams_is_a_draw() {
        let mut session = running(&[record(1, 100, 50)], &[record(2, 100, 50)]);
        session.find_entry_mut(EntryId(1)).unwrap().take_damage(999);
        session.find_entry_mut(EntryId(2)).unwrap().take_damage(999);

        assert!(session.is_battle_over());
        assert_eq!(session.decide_outcome(), Some(BattleOutcome::Draw));
    }

    #[test]
    fn test_advance_turn_wraps() {
        let mut session = running(&[record(1, 100, 50)], &[record(2, 100, 50)]);
        assert_eq!(session.current_actor(), Some(P1));

        session.advance_turn().unwrap();
        assert_eq!(session.current_actor(), Some(P2));

        session.advance_turn().unwrap();
        assert_eq!(session.current_actor(), Some(P1));
    }

    #[test]
    fn test_explicit_action_picks_named_pair() {
        let mut session = running(
            &[record(1, 100, 50), record(2, 100, 10)],
            &[record(3, 100, 50), record(4, 100, 50)],
        );
        let mut rng = BattleRng::new(1);

        let outcome = session
            .resolve_turn(
                &mut rng,
                Some(ChosenAction {
                    attacker: EntryId(2),
                    target: EntryId(4),
                }),
            )
            .unwrap();

        let TurnOutcome::Attacked {
            attacker, target, ..
        } = outcome
        else {
            panic!("expected an attack");
        };
        assert_eq!(attacker, EntryId(2));
        assert_eq!(target, EntryId(4));
    }

    #[test]
    fn test_invalid_action_changes_nothing() {
        let mut session = running(&[record(1, 100, 50)], &[record(2, 100, 50)]);
        let mut rng = BattleRng::new(1);
        let before = total_health(&session, P2);

        // Attacker owned by the opponent
        let err = session
            .resolve_turn(
                &mut rng,
                Some(ChosenAction {
                    attacker: EntryId(2),
                    target: EntryId(1),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, BattleError::NotFound(_)));

        // Friendly fire
        let err = session
            .resolve_turn(
                &mut rng,
                Some(ChosenAction {
                    attacker: EntryId(1),
                    target: EntryId(1),
                }),
            )
            .unwrap_err();
        assert!(matches!(err, BattleError::NotFound(_)));

        assert_eq!(total_health(&session, P2), before);
        assert!(session.log().is_empty());
    }

    #[test]
    fn test_resolve_outside_running_rejected() {
        let mut session = BattleSession::new(SessionId(1), BattleConfig::solo(1)).unwrap();
        session.add_participant(P1, TeamId::Zero).unwrap();
        let mut rng = BattleRng::new(1);

        let err = session.resolve_turn(&mut rng, None).unwrap_err();
        assert_eq!(err, BattleError::NotRunning);
    }

    #[test]
    fn test_lopsided_solo_battle_ends_with_team_zero_winning() {
        // 100 attack rolls at least 80 damage, so the 100 hp entry falls in
        // one hit; the 500 hp entry survives at most a handful of 50-attack
        // rolls. Bound the loop generously anyway.
        let mut session = running(&[record(1, 500, 100)], &[record(2, 100, 50)]);
        let mut rng = BattleRng::new(7);

        for _ in 0..20 {
            session.resolve_turn(&mut rng, None).unwrap();
            if session.is_battle_over() {
                break;
            }
            session.advance_turn().unwrap();
        }

        assert!(session.is_battle_over());
        assert_eq!(
            session.decide_outcome(),
            Some(BattleOutcome::Victory(TeamId::Zero))
        );
        assert!(!session.log().is_empty());
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let run = |seed: u64| {
            let mut session = running(&[record(1, 500, 100)], &[record(2, 400, 80)]);
            let mut rng = BattleRng::new(seed);
            for _ in 0..6 {
                session.resolve_turn(&mut rng, None).unwrap();
                if session.is_battle_over() {
                    break;
                }
                session.advance_turn().unwrap();
            }
            session.log().to_vec()
        };

        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
    }
}
