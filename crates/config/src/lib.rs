//! Configuration loading for recap.
//!
//! Config files (`recap.toml`, `recap.yaml`, `recap.json`) are discovered in
//! the working directory first, then under `~/.config/recap/`. `${VAR}`
//! placeholders are substituted from the environment before parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{config_dir, discover_and_load, load_config},
    schema::{DiscordConfig, ProviderConfig, RecapConfig, SessionDefaults},
};
