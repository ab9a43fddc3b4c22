//! Raise one SOS against a donor file and report the outcome
//!
//! Used to rehearse a fan-out before wiring the engine into intake. Prints the
//! final session snapshot as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use sos_core::config::Config;
use sos_core::domains::donor::InMemoryDonorRegistry;
use sos_core::domains::matching::SosRequest;
use sos_core::kernel::{BaseNotifier, EngineDeps, LogNotifier, SosKernel, TwilioNotifier};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twilio::TwilioService;

#[derive(Parser)]
#[command(name = "sos_drill")]
#[command(about = "Raise an SOS against a donor file and wait for the fan-out to settle")]
struct Cli {
    /// JSON array of donor records
    #[arg(long)]
    donors: PathBuf,

    /// Requested blood type, e.g. "O-" or "AB+"
    #[arg(long)]
    blood_type: String,

    #[arg(long, default_value_t = 1)]
    units: i64,

    #[arg(long)]
    city: Option<String>,

    /// normal | high | critical
    #[arg(long)]
    urgency: Option<String>,

    /// Log messages instead of sending them, even when Twilio is configured
    #[arg(long)]
    dry_run: bool,

    /// How long to wait for the session to settle before printing it
    #[arg(long, default_value_t = 30)]
    wait_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sos_core=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let registry = InMemoryDonorRegistry::from_json_file(&cli.donors).await?;

    let notifier: Arc<dyn BaseNotifier> = match (&config.twilio, cli.dry_run) {
        (Some(options), false) => {
            tracing::info!("Sending through Twilio");
            Arc::new(TwilioNotifier::new(Arc::new(TwilioService::new(options.clone()))))
        }
        _ => {
            tracing::info!("Dry run, messages are logged only");
            Arc::new(LogNotifier)
        }
    };

    let kernel = SosKernel::new(EngineDeps::new(Arc::new(registry), notifier), config.engine);

    let session = kernel
        .raise_sos(SosRequest {
            blood_type: Some(cli.blood_type),
            units_needed: cli.units,
            city: cli.city,
            urgency: cli.urgency,
        })
        .await
        .context("Failed to raise SOS")?;

    if session.targets.is_empty() {
        tracing::warn!("No donors found for this request");
    }

    let status = kernel
        .wait_for_settlement(session.id, Duration::from_secs(cli.wait_secs))
        .await?;
    tracing::info!(session_id = %session.id, status = ?status, "Drill finished");

    let snapshot = kernel.get_session(session.id).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize session")?
    );

    Ok(())
}
