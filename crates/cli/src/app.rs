use std::{path::Path, sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    recap_config::RecapConfig,
    recap_discord::DiscordOutbound,
    recap_providers::OpenAiProvider,
    recap_sessions::{ChannelConfig, ChunkSummarizer, MemorySessionStore, SessionManager},
    secrecy::{ExposeSecret, Secret},
    serenity::http::Http,
    tracing::{info, warn},
};

/// Load `path` when given, otherwise search the standard locations.
pub fn load(path: Option<&Path>) -> Result<RecapConfig> {
    match path {
        Some(path) => recap_config::load_config(path),
        None => Ok(recap_config::discover_and_load()),
    }
}

/// Wire the session engine to Discord and block until the gateway stops.
pub async fn run(config: RecapConfig) -> Result<()> {
    let token = config
        .discord
        .resolve_token()
        .map(Secret::new)
        .context("no discord token: set [discord] token or DISCORD_TOKEN")?;

    let provider = OpenAiProvider::from_config(&config.provider)?;
    if !provider.has_api_key() {
        warn!("no API key configured, requests are sent unauthenticated");
    }
    info!(
        model = %config.provider.model,
        base_url = %config.provider.base_url,
        "generation provider ready"
    );

    let http = Arc::new(Http::new(token.expose_secret()));
    let manager = Arc::new(SessionManager::new(
        Arc::new(MemorySessionStore::new()),
        Arc::new(ChunkSummarizer::new(Arc::new(provider))),
        Arc::new(DiscordOutbound::new(http)),
        ChannelConfig::from(&config.sessions),
    ));

    recap_discord::run_gateway(&token, manager).await
}

/// Human-readable summary of the resolved settings. Secrets are reported as
/// present or missing only.
pub fn check(config: &RecapConfig) -> String {
    let defaults = ChannelConfig::from(&config.sessions);
    let presence = |set: bool| if set { "set" } else { "missing" };
    let custom_prompt = config
        .sessions
        .default_prompt
        .as_deref()
        .is_some_and(|p| !p.trim().is_empty());

    [
        format!(
            "discord token:      {}",
            presence(config.discord.resolve_token().is_some())
        ),
        format!(
            "api key:            {}",
            presence(config.provider.resolve_api_key().is_some())
        ),
        format!("base url:           {}", config.provider.base_url),
        format!("model:              {}", config.provider.model),
        format!(
            "request timeout:    {:?}",
            Duration::from_secs(config.provider.timeout_secs)
        ),
        format!("default frequency:  {} minutes", defaults.frequency_minutes),
        format!(
            "default prompt:     {}",
            if custom_prompt { "custom" } else { "built-in" }
        ),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recap.toml");
        std::fs::write(
            &path,
            "[provider]\nmodel = \"local-model\"\n\n[sessions]\ndefault_frequency_minutes = 7\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.provider.model, "local-model");
        assert_eq!(config.sessions.default_frequency_minutes, 7);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn check_reports_settings_without_secrets() {
        let mut config = RecapConfig::default();
        config.discord.token = Some("very-secret-token".into());
        config.provider.model = "m1".into();

        let report = check(&config);
        assert!(report.contains("discord token:      set"));
        assert!(report.contains("model:              m1"));
        assert!(report.contains("default frequency:  2 minutes"));
        assert!(report.contains("default prompt:     built-in"));
        assert!(!report.contains("very-secret-token"));
    }
}
