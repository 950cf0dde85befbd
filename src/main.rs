//! # ThreadWatch — escalating alerts for unanswered Discord threads
//!
//! Usage:
//!   threadwatch                              # Load ~/.threadwatch/config.toml and run
//!   threadwatch --config ./threadwatch.toml  # Custom config
//!   threadwatch --port 8080                  # Override ingress port
//!   threadwatch check-config                 # Validate config and exit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use threadwatch_channels::{DiscordResolver, SmtpMailer, WebhookPoster};
use threadwatch_core::ThreadWatchConfig;
use threadwatch_core::traits::EmailTransport;
use threadwatch_gateway::AppState;
use threadwatch_scheduler::{AlertFormatter, Dispatcher, EscalationEngine, EventIngestor, Thresholds, TrackingStore};

#[derive(Parser)]
#[command(
    name = "threadwatch",
    version,
    about = "👀 ThreadWatch — escalating alerts for unanswered Discord threads"
)]
struct Cli {
    /// Config file (default: ~/.threadwatch/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Ingress port (overrides gateway.port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load and validate the configuration, print the effective thresholds, and exit
    CheckConfig,
}

fn log_filter(verbose: bool) -> &'static str {
    if verbose {
        "threadwatch=debug,threadwatch_core=debug,threadwatch_scheduler=debug,\
         threadwatch_channels=debug,threadwatch_gateway=debug,tower_http=debug"
    } else {
        "threadwatch=info,threadwatch_core=info,threadwatch_scheduler=info,\
         threadwatch_channels=info,threadwatch_gateway=info"
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ThreadWatchConfig::load_from(&ThreadWatchConfig::expand_path(path))?,
        None => ThreadWatchConfig::load()?,
    };
    if let Some(port) = cli.port {
        config.gateway.port = port;
    }

    // Initialize logging
    let filter = log_filter(cli.verbose || config.debug);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    config.validate()?;

    if let Some(Command::CheckConfig) = cli.command {
        println!("✅ Configuration OK");
        println!("   📺 Channel:     {}", config.discord.channel_id);
        println!(
            "   ⏱️  Thresholds:  {} / {} / {} min",
            config.alerts.first_mins, config.alerts.second_mins, config.alerts.escalation_mins
        );
        println!("   🔁 Sweep every: {}s", config.alerts.sweep_interval_secs);
        println!(
            "   📧 Email tier:  {}",
            if config.email.is_some() { "enabled" } else { "not configured" }
        );
        return Ok(());
    }

    let store = TrackingStore::new();

    let resolver = Arc::new(DiscordResolver::from_config(&config.discord));
    let ingestor = Arc::new(EventIngestor::new(store.clone(), resolver, &config.discord.channel_id));

    let chat = Arc::new(WebhookPoster::new(config.discord.timeout_secs));
    let email: Option<Arc<dyn EmailTransport>> = match &config.email {
        Some(email_cfg) => Some(Arc::new(SmtpMailer::new(email_cfg)?) as Arc<dyn EmailTransport>),
        None => {
            tracing::warn!("⚠️ No [email] section — second-tier alerts will be logged as failed");
            None
        }
    };
    let dispatcher = Dispatcher::from_config(&config.alerts, chat, email);

    let engine = Arc::new(EscalationEngine::new(
        store.clone(),
        Thresholds::from_config(&config.alerts),
        AlertFormatter::from_config(&config.discord),
        Arc::new(dispatcher),
    ));

    tracing::info!(
        "👀 ThreadWatch v{} watching channel {} ({} / {} / {} min)",
        env!("CARGO_PKG_VERSION"),
        config.discord.channel_id,
        config.alerts.first_mins,
        config.alerts.second_mins,
        config.alerts.escalation_mins
    );

    tokio::spawn(threadwatch_scheduler::spawn_sweeper(
        engine,
        config.alerts.sweep_interval_secs,
    ));

    let state = Arc::new(AppState::new(store, ingestor));
    threadwatch_gateway::start_server(&config.gateway, state, shutdown_signal()).await?;

    tracing::info!("👋 ThreadWatch stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
