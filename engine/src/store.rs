//! Explicitly owned table of active sessions.
//!
//! The store is plain owned state: whoever holds it (the command layer,
//! typically) inserts on create and removes once a session's terminal event
//! has been handled. Sessions share nothing with each other; each one lives
//! on its own worker task.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;

use brawldex_battle::{BattleConfig, BattleRng, BattleSession, SessionId};

use crate::error::{EngineError, Result};
use crate::event::BattleEvent;
use crate::handle::SessionHandle;
use crate::worker::SessionWorker;

const COMMAND_BUFFER: usize = 32;

/// Session ids start here, matching the collaborator-visible numbering.
const FIRST_SESSION_ID: u64 = 1000;

/// Owner of all active battle sessions.
pub struct SessionStore {
    sessions: HashMap<SessionId, SessionHandle>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            next_id: FIRST_SESSION_ID,
        }
    }

    /// Create a session and spawn its worker task.
    ///
    /// Events for this session are pushed to `events`. Fails with
    /// `InvalidConfiguration` on a bad config; nothing is spawned in that
    /// case. Must be called within a tokio runtime.
    pub fn create(
        &mut self,
        config: BattleConfig,
        events: mpsc::UnboundedSender<BattleEvent>,
    ) -> Result<SessionHandle> {
        let id = SessionId(self.next_id);
        let session = BattleSession::new(id, config)?;
        self.next_id += 1;

        let rng = BattleRng::new(session.config.seed);
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(SessionWorker::new(session, rng, rx, events).run());

        let handle = SessionHandle::new(id, tx);
        self.sessions.insert(id, handle.clone());
        debug!(session = %id, "session created");
        Ok(handle)
    }

    /// Look up a session by id.
    pub fn get(&self, id: SessionId) -> Result<SessionHandle> {
        self.sessions
            .get(&id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(id))
    }

    /// Remove a session from the table. Called by the collaborator once it
    /// has handled the session's terminal event.
    pub fn remove(&mut self, id: SessionId) -> Option<SessionHandle> {
        self.sessions.remove(&id)
    }

    /// Drop entries whose worker task has exited. Returns how many were
    /// removed.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, handle| !handle.is_closed());
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
