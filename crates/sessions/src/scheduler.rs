//! One periodic summarization task per session.
//!
//! The task sleeps for the session's interval, then drains the buffer,
//! summarizes it and posts the result. Cancellation is only observed at the
//! sleep boundary: a tick that already started runs to completion, a
//! cancelled sleep ends the task without a final tick.

use std::{sync::Arc, time::Duration};

use {
    recap_channels::{ChannelKey, ChannelOutbound},
    tokio::task::JoinHandle,
    tokio_util::sync::{CancellationToken, DropGuard},
    tracing::{Instrument, debug, info_span, warn},
    uuid::Uuid,
};

use crate::{
    prompt,
    session::SessionState,
    store::{Drain, DrainPurpose, SessionStore},
    summarizer::ChunkSummarizer,
};

/// Handle to a running scheduler task. Dropping it cancels the task.
pub struct SchedulerHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    _guard: DropGuard,
}

impl std::fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("cancelled", &self.token.is_cancelled())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

impl SchedulerHandle {
    /// Stop future ticks. An in-flight tick is not interrupted.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is gone or no longer active; the loop must end.
    Ended,
    /// Empty buffer, nothing sent.
    Idle,
    Summarized,
}

/// Spawns and runs per-session summary loops.
#[derive(Clone)]
pub struct SessionScheduler {
    store: Arc<dyn SessionStore>,
    summarizer: Arc<ChunkSummarizer>,
    outbound: Arc<dyn ChannelOutbound>,
}

impl SessionScheduler {
    pub fn new(
        store: Arc<dyn SessionStore>,
        summarizer: Arc<ChunkSummarizer>,
        outbound: Arc<dyn ChannelOutbound>,
    ) -> Self {
        Self {
            store,
            summarizer,
            outbound,
        }
    }

    /// Start the loop for `session_id` in `channel`. The first tick happens
    /// one full interval from now.
    pub fn spawn(&self, channel: ChannelKey, session_id: Uuid) -> SchedulerHandle {
        let token = CancellationToken::new();
        let span = info_span!("scheduler", channel = %channel, session_id = %session_id);
        let task = tokio::spawn(
            self.clone()
                .run(channel, session_id, token.clone())
                .instrument(span),
        );
        SchedulerHandle {
            _guard: token.clone().drop_guard(),
            token,
            task,
        }
    }

    async fn run(self, channel: ChannelKey, session_id: Uuid, token: CancellationToken) {
        loop {
            let Some(frequency) = self
                .store
                .get(&channel)
                .await
                .filter(|s| s.id == session_id && s.state == SessionState::Active)
                .map(|s| s.frequency_minutes)
            else {
                debug!("session gone, scheduler exiting");
                return;
            };

            let interval = Duration::from_secs(u64::from(frequency) * 60);
            tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!("scheduler cancelled");
                    return;
                },
                () = tokio::time::sleep(interval) => {},
            }
            // The sleep and a cancel can complete in the same poll.
            if token.is_cancelled() {
                debug!("scheduler cancelled");
                return;
            }

            if self.tick(&channel, session_id).await == TickOutcome::Ended {
                debug!("session ended during tick, scheduler exiting");
                return;
            }
        }
    }

    /// One summarization step: drain, log, summarize, post.
    pub async fn tick(&self, channel: &ChannelKey, session_id: Uuid) -> TickOutcome {
        #[cfg(feature = "metrics")]
        metrics::counter!("recap_ticks_total").increment(1);

        let (text, system_prompt, output_target) =
            match self.store.drain(channel, session_id, DrainPurpose::Tick).await {
                Drain::Gone => return TickOutcome::Ended,
                Drain::Empty => {
                    debug!("idle interval, nothing to summarize");
                    #[cfg(feature = "metrics")]
                    metrics::counter!("recap_idle_ticks_total").increment(1);
                    return TickOutcome::Idle;
                },
                Drain::Chunk {
                    text,
                    prompt,
                    output_target,
                } => (text, prompt, output_target),
            };

        debug!(chars = text.len(), "summarizing chunk");
        let summary = self.summarizer.summarize_chunk(&system_prompt, &text).await;
        dispatch(
            self.outbound.as_ref(),
            &output_target,
            &prompt::interval_summary(&summary),
        )
        .await;

        #[cfg(feature = "metrics")]
        metrics::counter!("recap_summaries_total").increment(1);
        TickOutcome::Summarized
    }
}

/// Post `text`, logging instead of failing so ticks and finalization always complete.
pub(crate) async fn dispatch(outbound: &dyn ChannelOutbound, to: &ChannelKey, text: &str) {
    if let Err(e) = outbound.send_text(to, text).await {
        warn!(to = %to, error = %e, "failed to send message");
    }
}
