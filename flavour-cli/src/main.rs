//! Flavours - feature graph and canonical release naming for image builds
//!
//! Usage:
//!   flavours features [--kind platform]        List features
//!   flavours expand [--set all] [--json]       Expand flavour sets
//!   flavours manifest-key --committish <sha> <platform> [modifiers...]

use clap::Parser;
use std::process;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "flavour_cli=debug,convenient_flavour=debug"
    } else {
        "flavour_cli=info,convenient_flavour=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let registry = cli.registry();

    let result = match &cli.command {
        Commands::Features { kind } => commands::features::list(&registry, kind.map(Into::into)),
        Commands::Closure { feature, direct } => {
            commands::features::closure(&registry, feature, *direct)
        }
        Commands::Check => commands::features::check(&registry),
        Commands::Expand { set, json } => {
            commands::flavours::expand(&registry, &cli.flavours_file, set.as_deref(), *json)
        }
        Commands::Canonical {
            platform,
            modifiers,
        } => commands::naming::canonical(&registry, platform, modifiers),
        Commands::ManifestKey {
            committish,
            release_version,
            epoch,
            arch,
            platform,
            modifiers,
        } => commands::naming::manifest_key(
            &registry,
            &cli.version_file,
            commands::naming::KeyRequest {
                committish,
                version: release_version.as_deref(),
                epoch: *epoch,
                arch,
                platform,
                modifiers,
            },
        ),
        Commands::Epoch { date } => commands::epoch::epoch(&cli.version_file, date.as_deref()),
        Commands::SnapshotDate { epoch } => {
            commands::epoch::snapshot_date(&cli.version_file, *epoch)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
