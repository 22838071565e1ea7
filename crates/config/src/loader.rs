use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::RecapConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["recap.toml", "recap.yaml", "recap.yml", "recap.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<RecapConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./recap.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/recap/recap.{toml,yaml,yml,json}` (user-global)
///
/// Returns `RecapConfig::default()` if no config file is found or the one
/// found fails to parse.
pub fn discover_and_load() -> RecapConfig {
    let mut dirs = vec![PathBuf::from(".")];
    dirs.extend(config_dir());
    load_first_in(&dirs)
}

/// Load the first config file found in `dirs`, or defaults.
pub fn load_first_in(dirs: &[PathBuf]) -> RecapConfig {
    let Some(path) = find_config_file(dirs) else {
        debug!("no config file found, using defaults");
        return RecapConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    match load_config(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            RecapConfig::default()
        },
    }
}

fn find_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.exists())
}

/// Returns the user-global config directory, `~/.config/recap/` on all platforms.
pub fn config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().join(".config").join("recap"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<RecapConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
