//! Battle session aggregate: rosters, teams, readiness, lifecycle.

use std::collections::BTreeMap;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::BattleError;
use crate::types::{EntryId, ParticipantId, RosterEntry, SessionId, SourceRecord, TeamId};

/// Default cap on entries per participant.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// Default time a participant gets to choose an action.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// Battle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BattleMode {
    /// One participant per team.
    Solo,
    /// Any number of participants per team.
    Multiplayer,
}

/// Lifecycle state of a session.
///
/// Transitions are strictly `Forming -> Running -> Finished`; a session
/// that never finds an opponent stays in `Forming` until it is abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BattlePhase {
    Forming,
    Running,
    Finished,
}

/// Final result of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BattleOutcome {
    /// Exactly one team still had alive entries.
    Victory(TeamId),
    /// No team had any alive entry left.
    Draw,
    /// The scheduler gave up on this session (internal error or turn cap).
    Aborted,
}

/// Session configuration, fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BattleConfig {
    pub mode: BattleMode,

    /// Cap on entries per participant. Adds beyond the cap are dropped
    /// silently and reported as a count, not an error.
    pub max_entries: usize,

    /// How long to wait for a player-chosen action before substituting an
    /// automatic one. `None` selects the fully automatic variant.
    pub turn_timeout: Option<Duration>,

    /// Whether bulk ingestion of entries is permitted. Solo mode only.
    pub allow_bulk: bool,

    /// Seed for the session's random source.
    pub seed: u64,
}

impl BattleConfig {
    /// Configuration for a solo battle with the default caps.
    pub fn solo(seed: u64) -> Self {
        Self {
            mode: BattleMode::Solo,
            max_entries: DEFAULT_MAX_ENTRIES,
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            allow_bulk: true,
            seed,
        }
    }

    /// Configuration for a multiplayer battle with the default caps.
    pub fn multiplayer(seed: u64) -> Self {
        Self {
            mode: BattleMode::Multiplayer,
            max_entries: DEFAULT_MAX_ENTRIES,
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            allow_bulk: false,
            seed,
        }
    }

    /// Run turns automatically instead of waiting for player actions.
    pub fn automatic(mut self) -> Self {
        self.turn_timeout = None;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), BattleError> {
        if self.max_entries == 0 {
            return Err(BattleError::InvalidConfiguration(
                "max_entries must be at least 1".into(),
            ));
        }
        if self.allow_bulk && self.mode == BattleMode::Multiplayer {
            return Err(BattleError::InvalidConfiguration(
                "bulk ingestion is solo-only".into(),
            ));
        }
        Ok(())
    }
}

/// What a call to [`BattleSession::set_ready`] led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyOutcome {
    /// Everyone is ready; the session just transitioned to `Running`.
    Started,
    /// Still waiting on at least one participant.
    Waiting,
}

/// Summary of an `add_entries` call.
///
/// Cap overflow and duplicates are soft: the operation partially succeeds
/// and reports what happened instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddReport {
    /// Entries actually added to the roster.
    pub added: usize,
    /// Records skipped because the same source id was already present.
    pub skipped_duplicates: usize,
    /// Records dropped because the roster hit the cap.
    pub truncated: usize,
}

/// All state for one battle.
///
/// A session is an independent unit of mutable state; the engine crate
/// gives each one a single owning task, so nothing in here is synchronized.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BattleSession {
    pub id: SessionId,
    pub config: BattleConfig,
    pub(crate) teams: [Vec<ParticipantId>; 2],
    pub(crate) rosters: BTreeMap<ParticipantId, Vec<RosterEntry>>,
    pub(crate) readiness: BTreeMap<ParticipantId, bool>,
    pub(crate) turn_order: Vec<ParticipantId>,
    pub(crate) current_turn_index: usize,
    pub(crate) phase: BattlePhase,
    pub(crate) log: Vec<String>,
    pub(crate) outcome: Option<BattleOutcome>,
}

impl BattleSession {
    /// Create an empty session in the `Forming` phase.
    pub fn new(id: SessionId, config: BattleConfig) -> Result<Self, BattleError> {
        config.validate()?;
        Ok(Self {
            id,
            config,
            teams: [Vec::new(), Vec::new()],
            rosters: BTreeMap::new(),
            readiness: BTreeMap::new(),
            turn_order: Vec::new(),
            current_turn_index: 0,
            phase: BattlePhase::Forming,
            log: Vec::new(),
            outcome: None,
        })
    }

    // === Accessors ===

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn turn_order(&self) -> &[ParticipantId] {
        &self.turn_order
    }

    pub fn current_turn_index(&self) -> usize {
        self.current_turn_index
    }

    /// Participants on a team, in join order.
    pub fn team(&self, team: TeamId) -> &[ParticipantId] {
        &self.teams[team.index()]
    }

    /// Which team a participant fights for.
    pub fn team_of(&self, participant: ParticipantId) -> Option<TeamId> {
        TeamId::both()
            .into_iter()
            .find(|t| self.teams[t.index()].contains(&participant))
    }

    /// A participant's roster, in insertion order.
    pub fn roster(&self, participant: ParticipantId) -> Option<&[RosterEntry]> {
        self.rosters.get(&participant).map(Vec::as_slice)
    }

    pub fn is_ready(&self, participant: ParticipantId) -> bool {
        self.readiness.get(&participant).copied().unwrap_or(false)
    }

    /// The participant whose turn it currently is.
    pub fn current_actor(&self) -> Option<ParticipantId> {
        self.turn_order.get(self.current_turn_index).copied()
    }

    // === Forming-phase operations ===

    /// Register a participant on a team.
    pub fn add_participant(
        &mut self,
        participant: ParticipantId,
        team: TeamId,
    ) -> Result<(), BattleError> {
        if self.phase != BattlePhase::Forming {
            return Err(BattleError::BattleAlreadyStarted);
        }
        if self.rosters.contains_key(&participant) {
            return Err(BattleError::AlreadyJoined(participant));
        }
        if self.config.mode == BattleMode::Solo && !self.teams[team.index()].is_empty() {
            return Err(BattleError::ModeNotAllowed(format!(
                "solo battles allow one participant per team, {team} is taken"
            )));
        }

        self.teams[team.index()].push(participant);
        self.rosters.insert(participant, Vec::new());
        self.readiness.insert(participant, false);
        self.turn_order.push(participant);
        Ok(())
    }

    /// Add entries to a participant's roster.
    ///
    /// Duplicates (same source id) are skipped and entries past the cap are
    /// dropped; both show up as counts in the returned [`AddReport`].
    /// `bulk` must only be set in solo mode.
    pub fn add_entries(
        &mut self,
        participant: ParticipantId,
        records: &[SourceRecord],
        bulk: bool,
    ) -> Result<AddReport, BattleError> {
        if self.phase != BattlePhase::Forming || self.is_ready(participant) {
            return Err(BattleError::BattleAlreadyStarted);
        }
        if bulk && self.config.mode != BattleMode::Solo {
            return Err(BattleError::ModeNotAllowed(
                "bulk ingestion is solo-only".into(),
            ));
        }
        if !self.rosters.contains_key(&participant) {
            return Err(BattleError::NotFound(format!(
                "participant {participant} is not in this battle"
            )));
        }

        // Validate everything up front so a bad record fails the call
        // before any roster mutation.
        for record in records {
            if record.health == 0 {
                return Err(BattleError::InvalidRoster(format!(
                    "entry '{}' has zero health",
                    record.name
                )));
            }
        }

        let cap = self.config.max_entries;
        let roster = self.rosters.get_mut(&participant).expect("checked above");
        let mut report = AddReport::default();

        for record in records {
            if roster.iter().any(|e| e.id == record.source_id) {
                report.skipped_duplicates += 1;
                continue;
            }
            if roster.len() >= cap {
                report.truncated += 1;
                continue;
            }
            roster.push(RosterEntry::from_record(record, participant)?);
            report.added += 1;
        }

        Ok(report)
    }

    /// Remove exactly one entry from a participant's roster.
    pub fn remove_entry(
        &mut self,
        participant: ParticipantId,
        entry: EntryId,
    ) -> Result<RosterEntry, BattleError> {
        if self.phase != BattlePhase::Forming || self.is_ready(participant) {
            return Err(BattleError::BattleAlreadyStarted);
        }

        let roster = self
            .rosters
            .get_mut(&participant)
            .ok_or_else(|| BattleError::NotFound(format!("participant {participant}")))?;

        let pos = roster
            .iter()
            .position(|e| e.id == entry)
            .ok_or_else(|| BattleError::NotFound(format!("entry {entry}")))?;

        Ok(roster.remove(pos))
    }

    /// Mark a participant ready. Idempotent: repeating the call for an
    /// already-ready participant changes nothing.
    ///
    /// When the last participant readies up, the session transitions to
    /// `Running` - unless it has no opponent, in which case it stays in
    /// `Forming` and the error is reported to the caller.
    pub fn set_ready(&mut self, participant: ParticipantId) -> Result<ReadyOutcome, BattleError> {
        if self.phase != BattlePhase::Forming {
            // Late ready calls after start are harmless no-ops.
            return Ok(ReadyOutcome::Waiting);
        }
        let ready = self
            .readiness
            .get_mut(&participant)
            .ok_or_else(|| BattleError::NotFound(format!("participant {participant}")))?;

        if *ready {
            return Ok(ReadyOutcome::Waiting);
        }
        *ready = true;

        if self.readiness.values().all(|r| *r) {
            self.try_start()?;
            return Ok(ReadyOutcome::Started);
        }
        Ok(ReadyOutcome::Waiting)
    }

    /// Transition `Forming -> Running`. Fails if either team is empty; the
    /// session then remains in `Forming` (abandoned, never `Finished`).
    fn try_start(&mut self) -> Result<(), BattleError> {
        if self.teams.iter().any(Vec::is_empty) {
            return Err(BattleError::NoParticipants);
        }
        if self.turn_order.is_empty() {
            return Err(BattleError::EmptyTurnOrder);
        }
        self.current_turn_index = 0;
        self.phase = BattlePhase::Running;
        Ok(())
    }

    // === Running-phase helpers ===

    /// Append a line to the battle log.
    pub(crate) fn push_log(&mut self, line: String) {
        self.log.push(line);
    }

    /// Mark the battle finished with the given outcome.
    pub fn finish(&mut self, outcome: BattleOutcome) {
        self.phase = BattlePhase::Finished;
        self.outcome = Some(outcome);
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::rng::BattleRng;
    use crate::types::Rarity;

    fn running_session() -> BattleSession {
        let mut session = BattleSession::new(SessionId(1000), BattleConfig::solo(42)).unwrap();
        session
            .add_participant(ParticipantId(1), TeamId::Zero)
            .unwrap();
        session
            .add_participant(ParticipantId(2), TeamId::One)
            .unwrap();
        session
            .add_entries(
                ParticipantId(1),
                &[SourceRecord::new(1, "A", 500, 100).with_rarity(Rarity::Robot)],
                false,
            )
            .unwrap();
        session
            .add_entries(
                ParticipantId(2),
                &[SourceRecord::new(2, "B", 100, 50)],
                false,
            )
            .unwrap();
        session.set_ready(ParticipantId(1)).unwrap();
        session.set_ready(ParticipantId(2)).unwrap();
        session
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let session = running_session();
        let json = serde_json::to_string(&session).unwrap();
        let restored: BattleSession = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.phase(), session.phase());
        assert_eq!(restored.turn_order(), session.turn_order());
        assert_eq!(restored.current_turn_index(), session.current_turn_index());
        assert_eq!(restored.log(), session.log());
        assert_eq!(
            restored.roster(ParticipantId(1)),
            session.roster(ParticipantId(1))
        );
    }

    #[test]
    fn test_replay_from_snapshot_matches_original() {
        let mut original = running_session();
        let mut rng = BattleRng::new(original.config.seed);

        // Snapshot before resolving anything
        let json = serde_json::to_string(&original).unwrap();
        let rng_state = rng.state();

        original.resolve_turn(&mut rng, None).unwrap();

        let mut replayed: BattleSession = serde_json::from_str(&json).unwrap();
        let mut replay_rng = BattleRng::from_state(&rng_state);
        replayed.resolve_turn(&mut replay_rng, None).unwrap();

        assert_eq!(replayed.log(), original.log());
        assert_eq!(
            replayed.roster(ParticipantId(2)),
            original.roster(ParticipantId(2))
        );
        assert_eq!(replay_rng.state(), rng.state());
    }
}
