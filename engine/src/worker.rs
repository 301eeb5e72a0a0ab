//! Per-session worker task.
//!
//! Each battle session is owned by exactly one spawned task. Commands from
//! [`crate::SessionHandle`]s arrive on an mpsc channel and are processed
//! sequentially, which gives the two guarantees the model needs with no
//! locks: roster mutations never interleave, and once the battle runs the
//! worker is the sole writer of turn and health state.

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, error, warn};

use brawldex_battle::{
    AddReport, BattleError, BattleOutcome, BattlePhase, BattleRng, BattleSession, ChosenAction,
    EntryId, ParticipantId, RosterEntry, SourceRecord, TeamId, TurnOutcome,
};

use crate::error::Result;
use crate::event::BattleEvent;

/// Hard cap on resolved turns. Two zero-attack rosters can never defeat
/// each other; past this point the battle is declared aborted instead of
/// spinning forever.
pub(crate) const MAX_TURNS: u32 = 10_000;

/// Commands sent from handles to the worker.
pub(crate) enum Command {
    AddParticipant {
        participant: ParticipantId,
        team: TeamId,
        reply: oneshot::Sender<Result<()>>,
    },
    AddEntries {
        participant: ParticipantId,
        records: Vec<SourceRecord>,
        bulk: bool,
        reply: oneshot::Sender<Result<AddReport>>,
    },
    RemoveEntry {
        participant: ParticipantId,
        entry: EntryId,
        reply: oneshot::Sender<Result<RosterEntry>>,
    },
    SetReady {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<()>>,
    },
    SubmitAction {
        participant: ParticipantId,
        action: ChosenAction,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<BattleSession>,
    },
    Cancel,
}

/// How the running phase ended.
enum Flow {
    Finished,
    Cancelled,
}

/// What a wait for the current actor's action produced.
enum Wait {
    Action(ChosenAction),
    TimedOut,
    Cancelled,
}

pub(crate) struct SessionWorker {
    session: BattleSession,
    rng: BattleRng,
    command_rx: mpsc::Receiver<Command>,
    events: mpsc::UnboundedSender<BattleEvent>,
}

impl SessionWorker {
    pub(crate) fn new(
        session: BattleSession,
        rng: BattleRng,
        command_rx: mpsc::Receiver<Command>,
        events: mpsc::UnboundedSender<BattleEvent>,
    ) -> Self {
        Self {
            session,
            rng,
            command_rx,
            events,
        }
    }

    /// Main worker loop. Runs until the battle finishes, the session is
    /// cancelled, or every handle is dropped.
    pub(crate) async fn run(mut self) {
        while self.session.phase() == BattlePhase::Forming {
            match self.command_rx.recv().await {
                None => {
                    debug!(session = %self.session.id, "all handles dropped, abandoning session");
                    return;
                }
                Some(cmd) => {
                    if self.handle_forming(cmd) {
                        debug!(session = %self.session.id, "session cancelled while forming");
                        return;
                    }
                }
            }
        }

        self.emit(BattleEvent::Started {
            turn_order: self.session.turn_order().to_vec(),
        });

        match self.run_battle().await {
            Ok(Flow::Finished) => {
                debug!(session = %self.session.id, outcome = ?self.session.outcome(), "battle finished");
            }
            Ok(Flow::Cancelled) => {
                debug!(session = %self.session.id, "battle cancelled");
            }
            Err(e) => {
                // Fatal to this session only; the task ends, nothing else does.
                error!(session = %self.session.id, error = %e, "battle aborted");
                self.session.finish(BattleOutcome::Aborted);
                self.emit(BattleEvent::Aborted {
                    reason: e.to_string(),
                });
            }
        }
    }

    /// Drive the battle through successive turns until a team wins, the
    /// sides draw, or the turn cap trips.
    async fn run_battle(&mut self) -> std::result::Result<Flow, BattleError> {
        for _ in 0..MAX_TURNS {
            let actor = self
                .session
                .current_actor()
                .ok_or(BattleError::EmptyTurnOrder)?;

            let action = match self.session.config.turn_timeout {
                Some(timeout) => {
                    self.emit(BattleEvent::TurnAwaited { participant: actor });
                    match self.await_action(actor, Instant::now() + timeout).await {
                        Wait::Action(action) => Some(action),
                        Wait::TimedOut => None,
                        Wait::Cancelled => return Ok(Flow::Cancelled),
                    }
                }
                None => None,
            };

            let outcome = self.session.resolve_turn(&mut self.rng, action)?;
            if let TurnOutcome::Attacked { line, .. } = &outcome {
                self.emit(BattleEvent::TurnResolved {
                    participant: actor,
                    line: line.clone(),
                });
            }

            if let Some(result) = self.session.decide_outcome() {
                self.session.finish(result);
                self.emit(BattleEvent::Finished {
                    outcome: result,
                    log: self.session.log().to_vec(),
                });
                return Ok(Flow::Finished);
            }
            self.session.advance_turn()?;

            // The automatic variant never awaits, so drain any queued
            // snapshot/cancel commands between turns.
            if self.session.config.turn_timeout.is_none() {
                while let Ok(cmd) = self.command_rx.try_recv() {
                    if self.handle_passive(cmd) {
                        return Ok(Flow::Cancelled);
                    }
                }
            }
        }

        warn!(session = %self.session.id, "turn cap reached, declaring battle aborted");
        self.session.finish(BattleOutcome::Aborted);
        self.emit(BattleEvent::Aborted {
            reason: format!("turn cap of {MAX_TURNS} reached"),
        });
        Ok(Flow::Finished)
    }

    /// Wait for the current actor's action or the deadline, whichever comes
    /// first. Only one such wait exists per session at a time.
    async fn await_action(&mut self, actor: ParticipantId, deadline: Instant) -> Wait {
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => return Wait::TimedOut,
                cmd = self.command_rx.recv() => match cmd {
                    None => return Wait::Cancelled,
                    Some(Command::SubmitAction { participant, action, reply }) => {
                        if participant != actor {
                            // Not this participant's turn. Harmless.
                            let _ = reply.send(Err(BattleError::StaleAction.into()));
                            continue;
                        }
                        match self.session.validate_action(actor, &action) {
                            Ok(()) => {
                                let _ = reply.send(Ok(()));
                                return Wait::Action(action);
                            }
                            Err(e) => {
                                // Bad refs do not consume the turn.
                                let _ = reply.send(Err(e.into()));
                            }
                        }
                    }
                    Some(cmd) => {
                        if self.handle_passive(cmd) {
                            return Wait::Cancelled;
                        }
                    }
                },
            }
        }
    }

    /// Handle a command while forming. Returns true if the session was
    /// cancelled.
    fn handle_forming(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::AddParticipant {
                participant,
                team,
                reply,
            } => {
                let result = self.session.add_participant(participant, team);
                if result.is_ok() {
                    self.emit(BattleEvent::ParticipantJoined { participant, team });
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::AddEntries {
                participant,
                records,
                bulk,
                reply,
            } => {
                let result = self.session.add_entries(participant, &records, bulk);
                if result.is_ok() {
                    self.emit_roster_updated(participant);
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::RemoveEntry {
                participant,
                entry,
                reply,
            } => {
                let result = self.session.remove_entry(participant, entry);
                if result.is_ok() {
                    self.emit_roster_updated(participant);
                }
                let _ = reply.send(result.map_err(Into::into));
            }
            Command::SetReady { participant, reply } => match self.session.set_ready(participant) {
                Ok(_) => {
                    self.emit(BattleEvent::ParticipantReady { participant });
                    let _ = reply.send(Ok(()));
                }
                Err(e) => {
                    let _ = reply.send(Err(e.into()));
                }
            },
            Command::SubmitAction { reply, .. } => {
                let _ = reply.send(Err(BattleError::StaleAction.into()));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
            }
            Command::Cancel => return true,
        }
        false
    }

    /// Handle any command that cannot resolve the current turn. Returns
    /// true if the session was cancelled.
    fn handle_passive(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Cancel => return true,
            Command::SubmitAction { reply, .. } => {
                // Arrived after the turn already resolved (or in auto mode).
                let _ = reply.send(Err(BattleError::StaleAction.into()));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
            }
            Command::SetReady { participant, reply } => {
                // Idempotent no-op once running.
                let _ = self.session.set_ready(participant);
                let _ = reply.send(Ok(()));
            }
            Command::AddParticipant { reply, .. } => {
                let _ = reply.send(Err(BattleError::BattleAlreadyStarted.into()));
            }
            Command::AddEntries { reply, .. } => {
                let _ = reply.send(Err(BattleError::BattleAlreadyStarted.into()));
            }
            Command::RemoveEntry { reply, .. } => {
                let _ = reply.send(Err(BattleError::BattleAlreadyStarted.into()));
            }
        }
        false
    }

    fn emit_roster_updated(&self, participant: ParticipantId) {
        let roster_size = self.session.roster(participant).map_or(0, <[_]>::len);
        self.emit(BattleEvent::RosterUpdated {
            participant,
            roster_size,
        });
    }

    /// Push an event to the collaborator. A dropped receiver must never
    /// take the battle down with it.
    fn emit(&self, event: BattleEvent) {
        let _ = self.events.send(event);
    }
}
