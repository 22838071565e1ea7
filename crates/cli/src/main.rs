mod app;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "recap", about = "Recap: periodic chat summaries for Discord channels")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Connect to Discord and serve slash commands (default).
    Run,
    /// Load the config and print the resolved settings.
    Check,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "recap starting");

    let config = app::load(cli.config.as_deref())?;
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => app::run(config).await,
        Commands::Check => {
            println!("{}", app::check(&config));
            Ok(())
        },
    }
}
