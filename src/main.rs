//! Contact Relay CLI - submit a contact form from the command line
//!
//! `contact-relay <form.json>` saves the form as a draft and submits it.
//! `contact-relay --resume` submits the saved draft.

use anyhow::{bail, Context, Result};
use contact_relay::clock::SystemClock;
use contact_relay::config::RelayConfig;
use contact_relay::draft::{DraftStore, FileDraftStore, MemoryDraftStore};
use contact_relay::fallback::ActionTarget;
use contact_relay::notify::LogNotifier;
use contact_relay::tracking::LogTracker;
use contact_relay::{FormInput, FormSubmissionPipeline, HttpRelay, SubmissionOutcome};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contact_relay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let arg = std::env::args().nth(1);
    let Some(arg) = arg else {
        bail!("usage: contact-relay <form.json> | --resume");
    };

    let settings = RelayConfig::load()?.with_env_overrides().resolve()?;

    let store: Arc<dyn DraftStore> = match &settings.draft_dir {
        Some(dir) => Arc::new(FileDraftStore::new(dir)),
        None => {
            tracing::warn!("No data directory available, drafts will not persist");
            Arc::new(MemoryDraftStore::new())
        }
    };

    let relay = HttpRelay::new(&settings)?;
    tracing::info!(url = relay.url(), "Using form relay");

    let pipeline =
        FormSubmissionPipeline::builder(Arc::new(relay), store, Arc::new(SystemClock))
            .settings(&settings)
            .tracker(Arc::new(LogTracker))
            .notifier(Arc::new(LogNotifier))
            .build();

    let input = if arg == "--resume" {
        pipeline
            .load_draft()
            .context("No saved draft to resume (drafts expire after 24 hours)")?
    } else {
        let content = std::fs::read_to_string(&arg)
            .with_context(|| format!("Failed to read form from {arg}"))?;
        let input: FormInput = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse form in {arg}"))?;
        pipeline.save_draft(&input);
        input
    };

    match pipeline.submit(&input).await {
        SubmissionOutcome::Submitted { id, message } => {
            println!("{message}");
            println!("Submission id: {id}");
            Ok(())
        }
        SubmissionOutcome::Invalid { errors } => {
            for error in &errors {
                eprintln!("- {error}");
            }
            std::process::exit(1);
        }
        SubmissionOutcome::Failed { error, fallback } => {
            eprintln!("{}", fallback.message);
            eprintln!("({error})");
            for action in &fallback.actions {
                match action.invoke() {
                    ActionTarget::OpenUrl(url) => eprintln!("  {}: {url}", action.label),
                    ActionTarget::Retry(_) => {
                        eprintln!("  {}: contact-relay --resume", action.label)
                    }
                }
            }
            std::process::exit(1);
        }
        SubmissionOutcome::AlreadyInFlight => Ok(()),
    }
}
