//! Chat-gateway seam.
//!
//! A messaging platform (Discord today) delivers [`InboundMessage`]s to the
//! session engine and receives summaries back through [`ChannelOutbound`].
//! The engine never sees platform types, only [`ChannelKey`]s.

pub mod plugin;

pub use plugin::{ChannelKey, ChannelOutbound, InboundMessage};
