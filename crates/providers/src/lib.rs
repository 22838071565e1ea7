//! Text-generation providers.
//!
//! The session engine only needs one call: send an ordered list of
//! role-tagged messages to a model and get text back. [`LlmProvider`] is that
//! seam; [`openai::OpenAiProvider`] implements it against any
//! OpenAI-compatible `/chat/completions` endpoint.

pub mod model;
pub mod openai;

pub use {
    model::{ChatMessage, LlmProvider, Role},
    openai::OpenAiProvider,
};
