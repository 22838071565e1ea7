use {recap_channels::ChannelKey, recap_config::SessionDefaults, uuid::Uuid};

use crate::{prompt::DEFAULT_PROMPT, scheduler::SchedulerHandle};

/// Per-channel settings. Outlives any number of sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    pub frequency_minutes: u32,
    pub prompt: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            frequency_minutes: 2,
            prompt: DEFAULT_PROMPT.to_string(),
        }
    }
}

impl From<&SessionDefaults> for ChannelConfig {
    fn from(defaults: &SessionDefaults) -> Self {
        Self {
            frequency_minutes: defaults.default_frequency_minutes.max(1),
            prompt: defaults
                .default_prompt
                .clone()
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_PROMPT.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Buffering messages and ticking.
    Active,
    /// Stop was acknowledged; flush and evaluation are running.
    Finalizing,
}

/// Runtime state for one channel's monitoring period.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub output_target: ChannelKey,
    pub frequency_minutes: u32,
    pub prompt: String,
    pub state: SessionState,
    /// Messages received since the last drain.
    pub buffer: Vec<String>,
    /// One joined chunk per completed tick, in tick order.
    pub transcript_log: Vec<String>,
    pub scheduler: Option<SchedulerHandle>,
}

impl Session {
    pub fn new(output_target: ChannelKey, config: &ChannelConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            output_target,
            frequency_minutes: config.frequency_minutes,
            prompt: config.prompt.clone(),
            state: SessionState::Active,
            buffer: Vec::new(),
            transcript_log: Vec::new(),
            scheduler: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id,
            output_target: self.output_target.clone(),
            frequency_minutes: self.frequency_minutes,
            prompt: self.prompt.clone(),
            state: self.state,
            buffered: self.buffer.len(),
            transcript_entries: self.transcript_log.len(),
        }
    }
}

/// Point-in-time copy of a session's settings and counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub id: Uuid,
    pub output_target: ChannelKey,
    pub frequency_minutes: u32,
    pub prompt: String,
    pub state: SessionState,
    pub buffered: usize,
    pub transcript_entries: usize,
}
