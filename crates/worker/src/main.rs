//! Batch worker for the estate listing service.
//!
//! Each subcommand runs one job against the database and prints its report
//! as JSON. `sweep-subscriptions --interval` keeps running until Ctrl-C.

mod cli;
mod images;
mod maintenance;
mod sweep;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use estate_events::{EmailConfig, EmailTemplates, LogMailer, Mailer, Notifier, SmtpMailer};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::sweep::PgSweepStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "estate_worker=debug,estate_events=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = estate_db::create_pool(&database_url).await?;
    estate_db::run_migrations(&pool).await?;

    match cli.command {
        Command::SweepSubscriptions(args) => {
            let notifier = build_notifier()?;
            let store = PgSweepStore::new(pool);
            match args.interval {
                Some(secs) => {
                    let cancel = CancellationToken::new();
                    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
                    sweep::run_loop(
                        &store,
                        &notifier,
                        Duration::from_secs(secs.max(1)),
                        args.mode.dry_run,
                        cancel,
                    )
                    .await;
                }
                None => {
                    let report =
                        sweep::run_sweep(&store, &notifier, Utc::now(), args.mode.dry_run).await?;
                    print_report(&report)?;
                }
            }
        }
        Command::DetectDuplicates(args) => {
            print_report(&images::detect_duplicates(&pool, args.dry_run).await?)?;
        }
        Command::DetectFakeImages(args) => {
            let report = images::detect_fake_images(&pool, args.limit, args.mode.dry_run).await?;
            print_report(&report)?;
        }
        Command::SeedLegalPages => {
            print_report(&maintenance::seed_legal_pages(&pool).await?)?;
        }
        Command::CleanupOrphanedFiles(args) => {
            let report =
                maintenance::cleanup_orphaned_files(&pool, &args.media_root, args.mode.dry_run)
                    .await?;
            print_report(&report)?;
        }
        Command::PremiumSummary => {
            print_report(&maintenance::premium_summary(&pool).await?)?;
        }
    }

    Ok(())
}

/// SMTP when `SMTP_HOST` is configured, the log otherwise.
fn build_notifier() -> anyhow::Result<Notifier> {
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(smtp_host = %config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(config)?)
        }
        None => Arc::new(LogMailer),
    };
    Ok(Notifier::new(mailer, EmailTemplates::from_env()?))
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Interrupt received, stopping");
    cancel.cancel();
}

fn print_report<T: Serialize>(report: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
