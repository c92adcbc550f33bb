//! Error types shared by every stage of flavour resolution.

use std::path::PathBuf;

/// Errors raised while loading features or deriving flavour identities.
#[derive(Debug, thiserror::Error)]
pub enum FlavourError {
    /// A referenced feature name does not exist in the registry
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Two descriptors declare the same feature name
    #[error("Duplicate feature: {0}")]
    DuplicateFeature(String),

    /// Expanding includes revisited a feature on the current path
    #[error("Cyclic feature graph: {}", path.join(" -> "))]
    CyclicFeatureGraph {
        /// Include chain, ending with the feature that closed the cycle
        path: Vec<String>,
    },

    /// Platform or modifiers are unknown or of the wrong kind
    #[error("Invalid flavour for platform '{platform}': unknown or mis-typed features {invalid:?}")]
    InvalidFlavour {
        /// Platform name as given by the caller
        platform: String,
        /// Every offending name (sorted)
        invalid: Vec<String>,
    },

    /// Architecture name not understood
    #[error("Invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// Version line is neither `<int>[.<minor>]` nor `today`
    #[error("Malformed version spec: {0:?} (expected <major>.<minor> or \"today\")")]
    MalformedVersionSpec(String),

    /// Epoch predates the project's inception date
    #[error("Epoch {0} predates inception (must be >= 1)")]
    EpochBeforeInception(i64),

    /// Epoch lies beyond the representable calendar
    #[error("Epoch {0} is out of range")]
    EpochOutOfRange(i64),

    /// Release manifest carries no file with the requested suffix
    #[error("No release file with suffix {0:?}")]
    NoSuchReleaseFile(String),

    /// File system I/O error
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, String),

    /// YAML parsing error
    #[error("Parse error in {0}: {1}")]
    ParseError(PathBuf, String),
}

/// Result type for flavour operations.
pub type FlavourResult<T> = Result<T, FlavourError>;
