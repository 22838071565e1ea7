//! Slash command definitions, option parsing and replies.
//!
//! Parsing works on [`OptionValue`] rather than serenity's option types so
//! the dispatch logic can be exercised without a gateway.

use {
    recap_channels::ChannelKey,
    recap_sessions::{ConfigureOutcome, Finalizer, SessionError, SessionManager},
    serenity::all::{
        ChannelType, CommandDataOption, CommandDataOptionValue, CommandOptionType, CreateCommand,
        CreateCommandOption,
    },
    tracing::debug,
};

pub const CONFIG: &str = "config";
pub const START: &str = "start";
pub const STOP: &str = "stop";

/// Commands registered globally on ready.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(CONFIG)
            .description("Configure settings")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "minutes",
                    "Minutes between interval summaries",
                )
                .required(true)
                .min_int_value(1),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "prompt",
                "System prompt for interval summaries",
            )),
        CreateCommand::new(START)
            .description("Start monitoring")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Channel,
                    "output_channel",
                    "Where summaries are posted",
                )
                .required(true)
                .channel_types(vec![ChannelType::Text]),
            ),
        CreateCommand::new(STOP).description("Stop and evaluate"),
    ]
}

/// A command option value, reduced to the kinds the commands declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Integer(i64),
    String(String),
    Channel(u64),
    Other,
}

impl From<&CommandDataOptionValue> for OptionValue {
    fn from(value: &CommandDataOptionValue) -> Self {
        match value {
            CommandDataOptionValue::Integer(n) => Self::Integer(*n),
            CommandDataOptionValue::String(s) => Self::String(s.clone()),
            CommandDataOptionValue::Channel(id) => Self::Channel(id.get()),
            _ => Self::Other,
        }
    }
}

/// Flatten serenity's option list into name/value pairs.
pub fn collect_options(options: &[CommandDataOption]) -> Vec<(String, OptionValue)> {
    options
        .iter()
        .map(|o| (o.name.clone(), OptionValue::from(&o.value)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Config { minutes: i64, prompt: Option<String> },
    Start { output: ChannelKey },
    Stop,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing or invalid option: {0}")]
    MissingOption(&'static str),
}

pub fn parse(name: &str, options: &[(String, OptionValue)]) -> Result<Invocation, ParseError> {
    let find = |key: &str| options.iter().find(|(n, _)| n == key).map(|(_, v)| v);

    match name {
        CONFIG => {
            let Some(OptionValue::Integer(minutes)) = find("minutes") else {
                return Err(ParseError::MissingOption("minutes"));
            };
            let prompt = match find("prompt") {
                Some(OptionValue::String(p)) => Some(p.clone()),
                _ => None,
            };
            Ok(Invocation::Config {
                minutes: *minutes,
                prompt,
            })
        },
        START => match find("output_channel") {
            Some(OptionValue::Channel(id)) => Ok(Invocation::Start {
                output: ChannelKey::from(*id),
            }),
            _ => Err(ParseError::MissingOption("output_channel")),
        },
        STOP => Ok(Invocation::Stop),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

/// Interaction response text and visibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    pub ephemeral: bool,
}

impl Reply {
    fn public(content: String) -> Self {
        Self {
            content,
            ephemeral: false,
        }
    }

    fn private(content: String) -> Self {
        Self {
            content,
            ephemeral: true,
        }
    }
}

/// Channel mention markup.
pub fn mention(channel: &ChannelKey) -> String {
    format!("<#{channel}>")
}

/// Private reply for an interaction that could not be parsed.
pub fn invalid_invocation(err: &ParseError) -> Reply {
    Reply::private(format!("**🔴 Error**:\n{err}"))
}

fn error_reply(err: &SessionError) -> Reply {
    let content = match err {
        SessionError::AlreadyActive => "**🟡 Invalid Action**:\nAlready monitoring!".to_string(),
        SessionError::NoActiveSession => "**🔴 Error**:\nNo active session.".to_string(),
        SessionError::InvalidFrequency(_) => {
            "**🟡 Invalid Action**:\nFrequency must be at least 1 minute.".to_string()
        },
    };
    Reply::private(content)
}

/// Run a parsed command against the manager.
///
/// A successful stop also returns the [`Finalizer`]; the caller must send
/// the reply first and run the finalizer afterwards.
pub async fn execute(
    manager: &SessionManager,
    channel: &ChannelKey,
    invocation: Invocation,
) -> (Reply, Option<Finalizer>) {
    debug!(channel = %channel, command = ?invocation, "executing command");
    match invocation {
        Invocation::Config { minutes, prompt } => {
            let minutes = u32::try_from(minutes).unwrap_or(0);
            let reply = match manager.configure(channel, minutes, prompt).await {
                Ok(ConfigureOutcome::Saved { frequency_minutes }) => Reply::public(format!(
                    "**🔵 Configuration Saved**:\nFrequency: {frequency_minutes} minutes"
                )),
                Ok(ConfigureOutcome::Updated { frequency_minutes }) => Reply::public(format!(
                    "**🔵 Configuration Updated**:\nFrequency: {frequency_minutes} minutes"
                )),
                Err(e) => error_reply(&e),
            };
            (reply, None)
        },
        Invocation::Start { output } => {
            let reply = match manager.start(channel, output).await {
                Ok(ack) => Reply::public(format!(
                    "**🟢 Session Started**:\nMonitoring for messages from other bots/users and \
                     generating summaries.\nOutput to: {}\nFrequency: Every {} minutes",
                    mention(&ack.output_target),
                    ack.frequency_minutes
                )),
                Err(e) => error_reply(&e),
            };
            (reply, None)
        },
        Invocation::Stop => match manager.stop(channel).await {
            Ok(finalizer) => {
                let reply = Reply::public(format!(
                    "**🟠 Session ended**:\nYou can check the summaries and participant \
                     evaluations at {}.\n",
                    mention(finalizer.output_target())
                ));
                (reply, Some(finalizer))
            },
            Err(e) => (error_reply(&e), None),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use {
        super::*,
        async_trait::async_trait,
        recap_channels::ChannelOutbound,
        recap_providers::{ChatMessage, LlmProvider},
        recap_sessions::{ChannelConfig, ChunkSummarizer, MemorySessionStore},
        tokio::sync::Mutex,
    };

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn id(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
            Ok("ok".into())
        }
    }

    #[derive(Default)]
    struct Sink {
        sent: Mutex<Vec<(ChannelKey, String)>>,
    }

    #[async_trait]
    impl ChannelOutbound for Sink {
        async fn send_text(&self, to: &ChannelKey, text: &str) -> anyhow::Result<()> {
            self.sent.lock().await.push((to.clone(), text.to_string()));
            Ok(())
        }
    }

    fn manager() -> (SessionManager, Arc<Sink>) {
        let sink = Arc::new(Sink::default());
        let manager = SessionManager::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(ChunkSummarizer::new(Arc::new(EchoProvider))),
            sink.clone(),
            ChannelConfig::default(),
        );
        (manager, sink)
    }

    fn opt(name: &str, value: OptionValue) -> (String, OptionValue) {
        (name.to_string(), value)
    }

    #[test]
    fn parses_config_with_and_without_prompt() {
        assert_eq!(
            parse(CONFIG, &[opt("minutes", OptionValue::Integer(5))]).unwrap(),
            Invocation::Config {
                minutes: 5,
                prompt: None
            }
        );
        assert_eq!(
            parse(CONFIG, &[
                opt("prompt", OptionValue::String("brief".into())),
                opt("minutes", OptionValue::Integer(3)),
            ])
            .unwrap(),
            Invocation::Config {
                minutes: 3,
                prompt: Some("brief".into())
            }
        );
    }

    #[test]
    fn parse_rejects_missing_options_and_unknown_commands() {
        assert_eq!(
            parse(CONFIG, &[]).unwrap_err(),
            ParseError::MissingOption("minutes")
        );
        assert_eq!(
            parse(START, &[opt("output_channel", OptionValue::Other)]).unwrap_err(),
            ParseError::MissingOption("output_channel")
        );
        assert_eq!(
            parse("ping", &[]).unwrap_err(),
            ParseError::UnknownCommand("ping".into())
        );
    }

    #[test]
    fn unparseable_command_gets_private_error() {
        let err = parse(CONFIG, &[opt("minutes", OptionValue::String("ten".into()))]).unwrap_err();
        assert_eq!(invalid_invocation(&err), Reply {
            content: "**🔴 Error**:\nmissing or invalid option: minutes".into(),
            ephemeral: true,
        });
    }

    #[test]
    fn start_output_channel_becomes_key() {
        assert_eq!(
            parse(START, &[opt("output_channel", OptionValue::Channel(42))]).unwrap(),
            Invocation::Start {
                output: ChannelKey::new("42")
            }
        );
    }

    #[test]
    fn definitions_cover_all_commands() {
        assert_eq!(definitions().len(), 3);
    }

    #[tokio::test]
    async fn config_reply_reflects_session_presence() {
        let (manager, _) = manager();
        let channel = ChannelKey::new("1");

        let (reply, _) = execute(&manager, &channel, Invocation::Config {
            minutes: 4,
            prompt: None,
        })
        .await;
        assert_eq!(reply, Reply {
            content: "**🔵 Configuration Saved**:\nFrequency: 4 minutes".into(),
            ephemeral: false,
        });

        let (_, _) = execute(&manager, &channel, Invocation::Start {
            output: ChannelKey::new("2"),
        })
        .await;
        let (reply, _) = execute(&manager, &channel, Invocation::Config {
            minutes: 6,
            prompt: None,
        })
        .await;
        assert_eq!(
            reply.content,
            "**🔵 Configuration Updated**:\nFrequency: 6 minutes"
        );
    }

    #[tokio::test]
    async fn negative_minutes_are_rejected_privately() {
        let (manager, _) = manager();
        let (reply, _) = execute(&manager, &ChannelKey::new("1"), Invocation::Config {
            minutes: -3,
            prompt: None,
        })
        .await;
        assert!(reply.ephemeral);
        assert!(manager.session(&ChannelKey::new("1")).await.is_none());
    }

    #[tokio::test]
    async fn start_acks_and_posts_banner() {
        let (manager, sink) = manager();
        let channel = ChannelKey::new("1");

        let (reply, finalizer) = execute(&manager, &channel, Invocation::Start {
            output: ChannelKey::new("99"),
        })
        .await;
        assert!(finalizer.is_none());
        assert!(!reply.ephemeral);
        assert_eq!(
            reply.content,
            "**🟢 Session Started**:\nMonitoring for messages from other bots/users and \
             generating summaries.\nOutput to: <#99>\nFrequency: Every 2 minutes"
        );

        let sent = sink.sent.lock().await.clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelKey::new("99"));
        assert!(sent[0].1.starts_with("# Summary: "));

        let (again, _) = execute(&manager, &channel, Invocation::Start {
            output: ChannelKey::new("99"),
        })
        .await;
        assert_eq!(again, Reply {
            content: "**🟡 Invalid Action**:\nAlready monitoring!".into(),
            ephemeral: true,
        });
    }

    #[tokio::test]
    async fn stop_without_session_is_private_error() {
        let (manager, _) = manager();
        let (reply, finalizer) = execute(&manager, &ChannelKey::new("1"), Invocation::Stop).await;
        assert!(finalizer.is_none());
        assert_eq!(reply, Reply {
            content: "**🔴 Error**:\nNo active session.".into(),
            ephemeral: true,
        });
    }

    #[tokio::test]
    async fn stop_returns_finalizer_after_ack() {
        let (manager, sink) = manager();
        let channel = ChannelKey::new("1");
        let _ = execute(&manager, &channel, Invocation::Start {
            output: ChannelKey::new("99"),
        })
        .await;

        let (reply, finalizer) = execute(&manager, &channel, Invocation::Stop).await;
        assert_eq!(
            reply.content,
            "**🟠 Session ended**:\nYou can check the summaries and participant evaluations \
             at <#99>.\n"
        );

        let report = finalizer.unwrap().run().await;
        assert_eq!(report.evaluation, "ok");
        assert!(manager.session(&channel).await.is_none());
        let last = sink.sent.lock().await.last().cloned().unwrap();
        assert_eq!(last.1, "**📊 Participant Evaluation**:\nok");
    }
}
