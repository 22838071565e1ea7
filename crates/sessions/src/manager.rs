//! Session lifecycle: start, live reconfiguration, stop + finalization, and
//! message ingestion. This is what the command surface talks to.

use std::sync::Arc;

use {
    recap_channels::{ChannelKey, ChannelOutbound, InboundMessage},
    tracing::{debug, info},
    uuid::Uuid,
};

use crate::{
    error::SessionError,
    prompt,
    scheduler::{SessionScheduler, dispatch},
    session::{ChannelConfig, Session, SessionView},
    store::{Drain, DrainPurpose, SessionStore},
    summarizer::ChunkSummarizer,
};

/// Returned by a successful [`SessionManager::start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAck {
    pub output_target: ChannelKey,
    pub frequency_minutes: u32,
}

/// Whether a `configure` call only saved settings or also retuned a live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigureOutcome {
    Saved { frequency_minutes: u32 },
    Updated { frequency_minutes: u32 },
}

/// What finalization produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalReport {
    /// The chunk flushed from the buffer at stop time, if any.
    pub flushed_chunk: Option<String>,
    /// Transcript log entries joined by blank lines, as sent for evaluation.
    pub transcript: String,
    pub evaluation: String,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    summarizer: Arc<ChunkSummarizer>,
    outbound: Arc<dyn ChannelOutbound>,
    scheduler: SessionScheduler,
    defaults: ChannelConfig,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        summarizer: Arc<ChunkSummarizer>,
        outbound: Arc<dyn ChannelOutbound>,
        defaults: ChannelConfig,
    ) -> Self {
        let scheduler = SessionScheduler::new(
            Arc::clone(&store),
            Arc::clone(&summarizer),
            Arc::clone(&outbound),
        );
        Self {
            store,
            summarizer,
            outbound,
            scheduler,
            defaults,
        }
    }

    /// Config a new session in `channel` would start with.
    pub async fn channel_config(&self, channel: &ChannelKey) -> ChannelConfig {
        self.store
            .config(channel)
            .await
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub async fn session(&self, channel: &ChannelKey) -> Option<SessionView> {
        self.store.get(channel).await
    }

    /// Begin monitoring `channel`, posting summaries to `output_target`.
    pub async fn start(
        &self,
        channel: &ChannelKey,
        output_target: ChannelKey,
    ) -> Result<StartAck, SessionError> {
        let config = self.channel_config(channel).await;
        let session = Session::new(output_target.clone(), &config);
        let session_id = session.id;
        self.store.create_session(channel, session).await?;

        let handle = self.scheduler.spawn(channel.clone(), session_id);
        if let Some(stale) = self.store.install_scheduler(channel, session_id, handle).await {
            stale.cancel();
        }

        info!(
            channel = %channel,
            session_id = %session_id,
            output = %output_target,
            frequency_minutes = config.frequency_minutes,
            "session started"
        );
        #[cfg(feature = "metrics")]
        metrics::counter!("recap_sessions_started_total").increment(1);

        let banner = prompt::session_banner(chrono::Local::now().date_naive());
        dispatch(self.outbound.as_ref(), &output_target, &banner).await;

        Ok(StartAck {
            output_target,
            frequency_minutes: config.frequency_minutes,
        })
    }

    /// Persist the channel's settings and, when a session is active, apply
    /// them to it and restart its interval from now.
    pub async fn configure(
        &self,
        channel: &ChannelKey,
        frequency_minutes: u32,
        prompt: Option<String>,
    ) -> Result<ConfigureOutcome, SessionError> {
        if frequency_minutes == 0 {
            return Err(SessionError::InvalidFrequency(frequency_minutes));
        }
        let prompt = prompt.filter(|p| !p.trim().is_empty());

        self.store
            .upsert_config(channel, frequency_minutes, prompt.clone(), &self.defaults)
            .await;

        let Some((session_id, old)) = self
            .store
            .reconfigure_session(channel, frequency_minutes, prompt)
            .await
        else {
            debug!(channel = %channel, frequency_minutes, "configuration saved");
            return Ok(ConfigureOutcome::Saved { frequency_minutes });
        };

        // Cancel before spawning so two loops are never live for one session.
        if let Some(old) = old {
            old.cancel();
        }
        let handle = self.scheduler.spawn(channel.clone(), session_id);
        if let Some(stale) = self.store.install_scheduler(channel, session_id, handle).await {
            stale.cancel();
        }

        info!(channel = %channel, session_id = %session_id, frequency_minutes, "scheduler replaced");
        Ok(ConfigureOutcome::Updated { frequency_minutes })
    }

    /// Stop ticking immediately and hand back the finalization to run after
    /// the caller has acknowledged the stop.
    pub async fn stop(&self, channel: &ChannelKey) -> Result<Finalizer, SessionError> {
        let ticket = self.store.begin_finalize(channel).await?;
        if let Some(handle) = ticket.scheduler {
            handle.cancel();
        }

        info!(channel = %channel, session_id = %ticket.session_id, "session stopping");
        Ok(Finalizer {
            channel: channel.clone(),
            session_id: ticket.session_id,
            output_target: ticket.output_target,
            store: Arc::clone(&self.store),
            summarizer: Arc::clone(&self.summarizer),
            outbound: Arc::clone(&self.outbound),
        })
    }

    /// Buffer a message for its channel's active session. Returns whether it
    /// was buffered.
    pub async fn ingest(&self, message: InboundMessage) -> bool {
        if message.author_is_self {
            return false;
        }
        self.store
            .append_message(&message.channel, message.text)
            .await
    }
}

/// Flush-then-evaluate sequence for a stopped session. The session stays in
/// the store (as finalizing) until [`Finalizer::run`] completes.
#[must_use = "the session is only deleted once the finalizer runs"]
pub struct Finalizer {
    channel: ChannelKey,
    session_id: Uuid,
    output_target: ChannelKey,
    store: Arc<dyn SessionStore>,
    summarizer: Arc<ChunkSummarizer>,
    outbound: Arc<dyn ChannelOutbound>,
}

impl Finalizer {
    pub fn output_target(&self) -> &ChannelKey {
        &self.output_target
    }

    pub async fn run(self) -> FinalReport {
        let flushed_chunk = match self
            .store
            .drain(&self.channel, self.session_id, DrainPurpose::Flush)
            .await
        {
            Drain::Chunk { text, prompt, .. } => {
                let summary = self.summarizer.summarize_chunk(&prompt, &text).await;
                dispatch(
                    self.outbound.as_ref(),
                    &self.output_target,
                    &prompt::interval_summary(&summary),
                )
                .await;
                Some(text)
            },
            Drain::Empty | Drain::Gone => None,
        };

        let transcript = self
            .store
            .transcript(&self.channel, self.session_id)
            .await
            .join("\n\n");
        let evaluation = self.summarizer.evaluate(&transcript).await;
        dispatch(
            self.outbound.as_ref(),
            &self.output_target,
            &prompt::evaluation(&evaluation),
        )
        .await;

        self.store
            .delete_session(&self.channel, self.session_id)
            .await;
        info!(channel = %self.channel, session_id = %self.session_id, "session finalized");
        #[cfg(feature = "metrics")]
        metrics::counter!("recap_sessions_finalized_total").increment(1);

        FinalReport {
            flushed_chunk,
            transcript,
            evaluation,
        }
    }
}
