//! Command-line interface of the batch worker.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "estate-worker",
    about = "Periodic and maintenance jobs for the estate listing service",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send expiry reminders and deactivate ended premium listings
    SweepSubscriptions(SweepArgs),
    /// Mark images whose content hash matches an earlier image
    DetectDuplicates(DryRunArgs),
    /// Flag images the fake-image heuristic suspects
    DetectFakeImages(FakeImageArgs),
    /// Insert the default privacy policy and terms of service if missing
    SeedLegalPages,
    /// Delete uploaded files that no image row references
    CleanupOrphanedFiles(CleanupArgs),
    /// Print premium listing counts and upcoming expirations
    PremiumSummary,
}

#[derive(Args, Debug, Default)]
pub struct DryRunArgs {
    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    #[command(flatten)]
    pub mode: DryRunArgs,
    /// Keep running, sweeping every N seconds until interrupted
    #[arg(long, value_name = "SECS")]
    pub interval: Option<u64>,
}

#[derive(Args, Debug)]
pub struct FakeImageArgs {
    #[command(flatten)]
    pub mode: DryRunArgs,
    /// Scan at most this many images
    #[arg(long)]
    pub limit: Option<i64>,
}

#[derive(Args, Debug)]
pub struct CleanupArgs {
    #[command(flatten)]
    pub mode: DryRunArgs,
    /// Media root to scan; defaults to MEDIA_ROOT or `media`
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    pub media_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sweep_flags() {
        let cli = Cli::parse_from(["estate-worker", "sweep-subscriptions", "--dry-run", "--interval", "3600"]);
        match cli.command {
            Command::SweepSubscriptions(args) => {
                assert!(args.mode.dry_run);
                assert_eq!(args.interval, Some(3600));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_fake_image_limit() {
        let cli = Cli::parse_from(["estate-worker", "detect-fake-images", "--limit", "50"]);
        match cli.command {
            Command::DetectFakeImages(args) => {
                assert!(!args.mode.dry_run);
                assert_eq!(args.limit, Some(50));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
