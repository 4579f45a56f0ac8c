//! # remindd — recurring study-reminder push daemon
//!
//! Background process for the study app backend: every interval it checks
//! which subscribers' reminder times match the current minute in the target
//! timezone and pushes a notification through FCM or Expo, whichever accepts
//! the stored device token.
//!
//! Usage:
//!   remindd                      # run with ~/.remindd/config.toml + env
//!   remindd --simulate           # log would-be sends, no network, no dedup
//!   remindd --config ./dev.toml  # explicit config file

use anyhow::Result;
use clap::Parser;
use remindd_channels::{ChannelSet, ExpoChannel, FcmChannel};
use remindd_core::RemindConfig;
use remindd_scheduler::ReminderEngine;
use remindd_store::SupabaseStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "remindd", version, about = "📚 Study-reminder push scheduler")]
struct Cli {
    /// Config file path (default: ~/.remindd/config.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Simulation mode: widened match window, no network sends, no dedup
    #[arg(long)]
    simulate: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "remindd=debug,remindd_scheduler=debug,remindd_store=debug,remindd_channels=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    let mut config = match &cli.config {
        Some(path) => {
            let mut c = RemindConfig::load_from(std::path::Path::new(path))?;
            c.apply_env();
            c
        }
        None => RemindConfig::load()?,
    };
    if cli.simulate {
        config.notify.simulate = true;
    }

    if config.store.url.is_empty() {
        anyhow::bail!("Subscriber store URL not configured (set [store].url or SUPABASE_URL)");
    }

    let simulate = config.notify.simulate;
    let store = Arc::new(SupabaseStore::new(config.store.clone()));
    let channels = ChannelSet::new(
        Arc::new(FcmChannel::new(config.fcm.clone(), simulate)),
        Arc::new(ExpoChannel::new(simulate)),
    );
    let engine = Arc::new(ReminderEngine::new(config.notify, store, channels));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let loop_handle = tokio::spawn(engine.run(shutdown_rx));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down — letting the current cycle finish");
    let _ = shutdown_tx.send(true);
    loop_handle.await?;
    Ok(())
}
