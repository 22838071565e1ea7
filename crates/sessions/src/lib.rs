//! Per-channel session engine.
//!
//! A session buffers a channel's messages, summarizes them on a fixed
//! interval, and on stop flushes the remainder and evaluates the whole
//! transcript. Components, leaf-first:
//!
//! - [`summarizer::ChunkSummarizer`]: one generation call, errors rendered inline
//! - [`store::SessionStore`]: channel configs and live sessions
//! - [`scheduler::SessionScheduler`]: one cancellable periodic task per session
//! - [`manager::SessionManager`]: start / configure / stop / ingest

pub mod error;
pub mod manager;
pub mod prompt;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod test_support;

pub use {
    error::SessionError,
    manager::{ConfigureOutcome, FinalReport, Finalizer, SessionManager, StartAck},
    scheduler::{SchedulerHandle, SessionScheduler},
    session::{ChannelConfig, Session, SessionView},
    store::{MemorySessionStore, SessionStore},
    summarizer::{ChunkSummarizer, truncate_message},
};
