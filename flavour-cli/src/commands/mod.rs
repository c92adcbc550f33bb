//! Flavour command-line interface
//!
//! - `features`: list known features
//! - `closure`: show what a feature includes
//! - `expand`: expand declared flavour sets into concrete flavours
//! - `canonical`: canonical feature names of a flavour
//! - `manifest-key`: canonical release manifest key
//! - `epoch` / `snapshot-date`: build epoch arithmetic
//! - `check`: feature graph integrity check

use clap::{Parser, Subcommand, ValueEnum};
use convenient_flavour::{DirectorySource, FeatureKind, FeatureRegistry};
use std::path::PathBuf;

pub mod epoch;
pub mod features;
pub mod flavours;
pub mod naming;

/// Result type of command functions
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Flavours - feature graph and canonical naming for image builds
#[derive(Parser)]
#[command(name = "flavours")]
#[command(about = "Expand build flavours and derive canonical release names")]
#[command(version)]
pub struct Cli {
    /// Directory holding `<feature>/info.yaml` descriptors
    #[arg(long, global = true, default_value = "features", env = "FLAVOUR_FEATURES_DIR")]
    pub features_dir: PathBuf,

    /// Flavour set declaration file
    #[arg(long, global = true, default_value = "flavours.yaml", env = "FLAVOUR_SET_FILE")]
    pub flavours_file: PathBuf,

    /// Version file configuring the build epoch
    #[arg(long, global = true, default_value = "VERSION", env = "FLAVOUR_VERSION_FILE")]
    pub version_file: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Registry over the configured features directory (loaded on first use)
    pub fn registry(&self) -> FeatureRegistry {
        FeatureRegistry::new(DirectorySource::new(&self.features_dir))
    }
}

/// Feature kind filter
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    /// Platform features only
    Platform,
    /// Modifier features only
    Modifier,
}

impl From<KindArg> for FeatureKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Platform => FeatureKind::Platform,
            KindArg::Modifier => FeatureKind::Modifier,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known features
    Features {
        /// Only list features of this kind
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },

    /// Show the features included by a feature
    Closure {
        /// Feature name
        feature: String,

        /// Only direct includes
        #[arg(long)]
        direct: bool,
    },

    /// Expand flavour sets into concrete flavours
    Expand {
        /// Only expand the named flavour set
        #[arg(short, long)]
        set: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical feature names of a flavour
    Canonical {
        /// Platform feature
        platform: String,

        /// Modifier features
        modifiers: Vec<String>,
    },

    /// Print the canonical release manifest key
    ManifestKey {
        /// Commit the release is built from
        #[arg(long)]
        committish: String,

        /// Release version (defaults to `<epoch>-<committish[:6]>`)
        #[arg(long = "release-version")]
        release_version: Option<String>,

        /// Build epoch (defaults to the version file)
        #[arg(long)]
        epoch: Option<u32>,

        /// Target architecture
        #[arg(long, default_value = "amd64")]
        arch: String,

        /// Platform feature
        platform: String,

        /// Modifier features
        modifiers: Vec<String>,
    },

    /// Print the build epoch of a date, or the configured one
    Epoch {
        /// ISO-8601 date (defaults to the version file)
        #[arg(long)]
        date: Option<String>,
    },

    /// Print the snapshot repository date of an epoch
    SnapshotDate {
        /// Build epoch (defaults to the version file)
        #[arg(allow_negative_numbers = true)]
        epoch: Option<i64>,
    },

    /// Verify that all includes resolve and the graph is acyclic
    Check,
}
