//! Cloneable handle to a live battle session.

use tokio::sync::{mpsc, oneshot};

use brawldex_battle::{
    AddReport, BattleSession, ChosenAction, EntryId, ParticipantId, RosterEntry, SessionId,
    SourceRecord, TeamId,
};

use crate::error::{EngineError, Result};
use crate::worker::Command;

/// Handle to one battle session.
///
/// All operations go through the session's worker task, so calls against
/// the same session are processed one at a time and never interleave. The
/// handle can be cloned freely and shared across tasks.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    id: SessionId,
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    pub(crate) fn new(id: SessionId, tx: mpsc::Sender<Command>) -> Self {
        Self { id, tx }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Whether the worker task has exited (finished, cancelled, abandoned).
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).await.map_err(|_| EngineError::SessionClosed)
    }

    /// Register a participant on a team. Forming phase only.
    pub async fn add_participant(&self, participant: ParticipantId, team: TeamId) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AddParticipant {
            participant,
            team,
            reply,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Add entries to a participant's roster. See
    /// [`BattleSession::add_entries`] for the truncation and duplicate
    /// rules.
    pub async fn add_entries(
        &self,
        participant: ParticipantId,
        records: Vec<SourceRecord>,
        bulk: bool,
    ) -> Result<AddReport> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::AddEntries {
            participant,
            records,
            bulk,
            reply,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Remove one entry from a participant's roster. Forming phase only.
    pub async fn remove_entry(
        &self,
        participant: ParticipantId,
        entry: EntryId,
    ) -> Result<RosterEntry> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RemoveEntry {
            participant,
            entry,
            reply,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Mark a participant ready. Idempotent; when the last participant
    /// readies up the battle starts.
    pub async fn set_ready(&self, participant: ParticipantId) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetReady { participant, reply }).await?;
        rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Submit an attacker/target pair for the current turn.
    ///
    /// Only meaningful while the session is waiting on this participant;
    /// anything else comes back as a stale action and changes nothing.
    pub async fn submit_action(
        &self,
        participant: ParticipantId,
        action: ChosenAction,
    ) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SubmitAction {
            participant,
            action,
            reply,
        })
        .await?;
        rx.await.map_err(|_| EngineError::SessionClosed)?
    }

    /// Read-only copy of the session state, for rendering.
    pub async fn snapshot(&self) -> Result<BattleSession> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| EngineError::SessionClosed)
    }

    /// Cancel the session. Releases any pending turn wait without resolving
    /// it; no further work is scheduled.
    pub async fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel).await;
    }
}
