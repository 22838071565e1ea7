//! Channel configs and live sessions.
//!
//! Every multi-step mutation the engine relies on (drain-and-log, handle
//! replacement, entering finalization) is a single store call, so it runs
//! under one lock acquisition and never interleaves with a message append.

use std::collections::HashMap;

use {async_trait::async_trait, recap_channels::ChannelKey, tokio::sync::RwLock, uuid::Uuid};

use crate::{
    error::SessionError,
    scheduler::SchedulerHandle,
    session::{ChannelConfig, Session, SessionState, SessionView},
};

/// Who is draining the buffer. A tick only drains an active session, the
/// final flush only drains one that is finalizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainPurpose {
    Tick,
    Flush,
}

/// Result of draining a session's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drain {
    /// The session is gone, was replaced, or is in the wrong state.
    Gone,
    /// Nothing arrived since the last drain.
    Empty,
    /// The buffer was joined, appended to the transcript log, and cleared.
    Chunk {
        text: String,
        prompt: String,
        output_target: ChannelKey,
    },
}

/// What the finalizer needs once a session has entered finalization.
#[derive(Debug)]
pub struct FinalizeTicket {
    pub session_id: Uuid,
    pub output_target: ChannelKey,
    pub scheduler: Option<SchedulerHandle>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stored config for a channel, if it was ever configured.
    async fn config(&self, channel: &ChannelKey) -> Option<ChannelConfig>;

    /// Set the frequency and, when given, the prompt. A channel configured
    /// for the first time starts from `defaults`.
    async fn upsert_config(
        &self,
        channel: &ChannelKey,
        frequency_minutes: u32,
        prompt: Option<String>,
        defaults: &ChannelConfig,
    ) -> ChannelConfig;

    async fn get(&self, channel: &ChannelKey) -> Option<SessionView>;

    /// Insert a session. Fails if the channel already has one in any state.
    async fn create_session(&self, channel: &ChannelKey, session: Session)
    -> Result<(), SessionError>;

    /// Append to an active session's buffer. Returns false when there is none.
    async fn append_message(&self, channel: &ChannelKey, text: String) -> bool;

    /// Atomically swap the buffer out, join it with newlines and append the
    /// result to the transcript log.
    async fn drain(&self, channel: &ChannelKey, session_id: Uuid, purpose: DrainPurpose) -> Drain;

    /// Update an active session's frequency (and prompt, when given) and take
    /// its scheduler handle out. Returns the session id and the old handle.
    async fn reconfigure_session(
        &self,
        channel: &ChannelKey,
        frequency_minutes: u32,
        prompt: Option<String>,
    ) -> Option<(Uuid, Option<SchedulerHandle>)>;

    /// Store `handle` on the active session `session_id`. Returns the handle
    /// the caller must cancel: the one displaced, or `handle` itself when the
    /// session is no longer active.
    async fn install_scheduler(
        &self,
        channel: &ChannelKey,
        session_id: Uuid,
        handle: SchedulerHandle,
    ) -> Option<SchedulerHandle>;

    /// Move an active session to finalizing and hand out its scheduler.
    async fn begin_finalize(&self, channel: &ChannelKey) -> Result<FinalizeTicket, SessionError>;

    async fn transcript(&self, channel: &ChannelKey, session_id: Uuid) -> Vec<String>;

    /// Remove the session if it is still `session_id`.
    async fn delete_session(&self, channel: &ChannelKey, session_id: Uuid) -> bool;
}

/// Process-lifetime store backed by two maps.
#[derive(Default)]
pub struct MemorySessionStore {
    configs: RwLock<HashMap<ChannelKey, ChannelConfig>>,
    sessions: RwLock<HashMap<ChannelKey, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions (any state).
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn config(&self, channel: &ChannelKey) -> Option<ChannelConfig> {
        self.configs.read().await.get(channel).cloned()
    }

    async fn upsert_config(
        &self,
        channel: &ChannelKey,
        frequency_minutes: u32,
        prompt: Option<String>,
        defaults: &ChannelConfig,
    ) -> ChannelConfig {
        let mut configs = self.configs.write().await;
        let entry = configs
            .entry(channel.clone())
            .or_insert_with(|| defaults.clone());
        entry.frequency_minutes = frequency_minutes;
        if let Some(prompt) = prompt {
            entry.prompt = prompt;
        }
        entry.clone()
    }

    async fn get(&self, channel: &ChannelKey) -> Option<SessionView> {
        self.sessions.read().await.get(channel).map(Session::view)
    }

    async fn create_session(
        &self,
        channel: &ChannelKey,
        session: Session,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(channel) {
            return Err(SessionError::AlreadyActive);
        }
        sessions.insert(channel.clone(), session);
        Ok(())
    }

    async fn append_message(&self, channel: &ChannelKey, text: String) -> bool {
        match self.sessions.write().await.get_mut(channel) {
            Some(session) if session.is_active() => {
                session.buffer.push(text);
                true
            },
            _ => false,
        }
    }

    async fn drain(&self, channel: &ChannelKey, session_id: Uuid, purpose: DrainPurpose) -> Drain {
        let mut sessions = self.sessions.write().await;
        let Some(session) = sessions.get_mut(channel) else {
            return Drain::Gone;
        };
        let expected = match purpose {
            DrainPurpose::Tick => SessionState::Active,
            DrainPurpose::Flush => SessionState::Finalizing,
        };
        if session.id != session_id || session.state != expected {
            return Drain::Gone;
        }

        let chunk = std::mem::take(&mut session.buffer);
        if chunk.is_empty() {
            return Drain::Empty;
        }
        let text = chunk.join("\n");
        session.transcript_log.push(text.clone());
        Drain::Chunk {
            text,
            prompt: session.prompt.clone(),
            output_target: session.output_target.clone(),
        }
    }

    async fn reconfigure_session(
        &self,
        channel: &ChannelKey,
        frequency_minutes: u32,
        prompt: Option<String>,
    ) -> Option<(Uuid, Option<SchedulerHandle>)> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(channel).filter(|s| s.is_active())?;
        session.frequency_minutes = frequency_minutes;
        if let Some(prompt) = prompt {
            session.prompt = prompt;
        }
        Some((session.id, session.scheduler.take()))
    }

    async fn install_scheduler(
        &self,
        channel: &ChannelKey,
        session_id: Uuid,
        handle: SchedulerHandle,
    ) -> Option<SchedulerHandle> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(channel) {
            Some(session) if session.id == session_id && session.is_active() => {
                session.scheduler.replace(handle)
            },
            _ => Some(handle),
        }
    }

    async fn begin_finalize(&self, channel: &ChannelKey) -> Result<FinalizeTicket, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(channel)
            .filter(|s| s.is_active())
            .ok_or(SessionError::NoActiveSession)?;
        session.state = SessionState::Finalizing;
        Ok(FinalizeTicket {
            session_id: session.id,
            output_target: session.output_target.clone(),
            scheduler: session.scheduler.take(),
        })
    }

    async fn transcript(&self, channel: &ChannelKey, session_id: Uuid) -> Vec<String> {
        self.sessions
            .read()
            .await
            .get(channel)
            .filter(|s| s.id == session_id)
            .map(|s| s.transcript_log.clone())
            .unwrap_or_default()
    }

    async fn delete_session(&self, channel: &ChannelKey, session_id: Uuid) -> bool {
        let mut sessions = self.sessions.write().await;
        if sessions.get(channel).is_some_and(|s| s.id == session_id) {
            sessions.remove(channel);
            return true;
        }
        false
    }
}
