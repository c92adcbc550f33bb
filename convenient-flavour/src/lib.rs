//! Feature graph closure and canonical naming for multi-flavour OS image builds.
//!
//! An image flavour is one platform feature plus any number of modifier
//! features. Features include other features, forming a directed acyclic
//! graph. This crate provides:
//!
//! - A lazily loaded [`FeatureRegistry`] over `features/<name>/info.yaml` descriptors
//! - Transitive closure of feature includes with cycle detection
//! - Normalization of modifier lists to their full effective set
//! - Canonicalization of modifier lists to their minimal generating set
//! - Expansion of declarative flavour combinations into concrete flavours
//! - Deterministic release manifest keys and build epoch arithmetic
//!
//! # Example
//!
//! ```
//! use convenient_flavour::{Feature, FeatureKind, FeatureRegistry};
//!
//! let registry = FeatureRegistry::from_features(vec![
//!     Feature::new("aws", FeatureKind::Platform, ["cloud"]),
//!     Feature::new("cloud", FeatureKind::Modifier, Vec::<String>::new()),
//!     Feature::new("gardener", FeatureKind::Modifier, ["cloud"]),
//! ]);
//!
//! let normalized = registry.normalized_modifiers("aws", &["gardener"]).unwrap();
//! assert_eq!(normalized, vec!["cloud", "gardener"]);
//!
//! let canonical = registry.canonical_feature_names("aws", &normalized).unwrap();
//! assert_eq!(canonical, vec!["aws", "gardener"]);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod canonical;
pub mod closure;
pub mod epoch;
pub mod error;
pub mod feature;
pub mod flavour;
pub mod registry;
pub mod release;
pub mod source;

pub use closure::IncludedFeatures;
pub use epoch::{
    INCEPTION_DATE, check_epoch, epoch_for_date, epoch_from_str, epoch_from_version_file,
    epoch_from_version_spec, snapshot_date, today_epoch,
};
pub use error::{FlavourError, FlavourResult};
pub use feature::{Feature, FeatureDescriptor, FeatureIncludes, FeatureKind};
pub use flavour::{Architecture, FlavourCombination, FlavourSet, FlavourSpec, FlavoursFile};
pub use registry::FeatureRegistry;
pub use release::{
    OnlineReleaseManifest, PipelineFlavour, PublishedImageMetadata, ReleaseFile,
    ReleaseIdentity, ReleaseManifest, ReleaseManifestSet,
};
pub use source::{DirectorySource, FeatureSource, StaticSource};
