//! Flavours and their declarative cross-product generators.
//!
//! Flavour sets are declared in `flavours.yaml`:
//!
//! ```yaml
//! flavour_sets:
//!   - name: all
//!     flavour_combinations:
//!       - architectures: [amd64]
//!         platforms: [aws, gcp]
//!         modifiers: [[_prod, gardener], [_dev]]
//! ```
//!
//! Each combination expands to the cross product of its architectures,
//! platforms and modifier sets.

use crate::error::{FlavourError, FlavourResult};
use crate::feature::{Feature, FeatureKind};
use crate::registry::FeatureRegistry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Target architecture, following Debian's naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// x86-64
    Amd64,
    /// AArch64
    Arm64,
}

impl Architecture {
    /// Debian architecture name
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Architecture {
    type Err = FlavourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "amd64" => Ok(Architecture::Amd64),
            "arm64" => Ok(Architecture::Arm64),
            other => Err(FlavourError::InvalidArchitecture(other.to_string())),
        }
    }
}

/// One concrete build target.
///
/// Construction validates that the platform is a known platform feature and
/// every modifier a known modifier feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FlavourSpec {
    architecture: Architecture,
    platform: String,
    modifiers: Vec<String>,
}

impl FlavourSpec {
    /// Validate and create a flavour.
    ///
    /// # Errors
    ///
    /// Returns `FlavourError::InvalidFlavour` listing every name that is
    /// unknown or of the wrong kind.
    pub fn new<S: AsRef<str>>(
        registry: &FeatureRegistry,
        architecture: Architecture,
        platform: &str,
        modifiers: &[S],
    ) -> FlavourResult<Self> {
        let mut invalid = Vec::new();

        if !has_kind(registry, platform, FeatureKind::Platform)? {
            invalid.push(platform.to_string());
        }
        for modifier in modifiers {
            let modifier = modifier.as_ref();
            if !has_kind(registry, modifier, FeatureKind::Modifier)? {
                invalid.push(modifier.to_string());
            }
        }

        if !invalid.is_empty() {
            invalid.sort();
            invalid.dedup();
            return Err(FlavourError::InvalidFlavour {
                platform: platform.to_string(),
                invalid,
            });
        }

        // modifiers form a set: keep the first occurrence of each name
        let mut seen = BTreeSet::new();
        let modifiers = modifiers
            .iter()
            .map(|m| m.as_ref())
            .filter(|m| seen.insert(*m))
            .map(str::to_string)
            .collect();

        Ok(Self {
            architecture,
            platform: platform.to_string(),
            modifiers,
        })
    }

    /// Create a flavour whose modifiers are the normalized closure of `modifiers`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFlavour` for an unknown or mis-typed platform, or any
    /// error of [`FeatureRegistry::normalized_modifiers`] and
    /// [`FlavourSpec::new`].
    pub fn normalized<S: AsRef<str>>(
        registry: &FeatureRegistry,
        architecture: Architecture,
        platform: &str,
        modifiers: &[S],
    ) -> FlavourResult<Self> {
        if !has_kind(registry, platform, FeatureKind::Platform)? {
            return Err(FlavourError::InvalidFlavour {
                platform: platform.to_string(),
                invalid: vec![platform.to_string()],
            });
        }
        let normalized = registry
            .normalized_modifiers(platform, modifiers)
            .map_err(|e| match e {
                FlavourError::UnknownFeature(name) => FlavourError::InvalidFlavour {
                    platform: platform.to_string(),
                    invalid: vec![name],
                },
                other => other,
            })?;
        Self::new(registry, architecture, platform, &normalized)
    }

    /// Target architecture
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Platform feature name
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Modifier feature names
    pub fn modifiers(&self) -> &[String] {
        &self.modifiers
    }

    /// `<platform>-<modifiers>`, modifiers sorted lexicographically and joined with `_`.
    pub fn filename_prefix(&self) -> String {
        let mut modifiers: Vec<&str> = self.modifiers.iter().map(String::as_str).collect();
        modifiers.sort_unstable();
        format!("{}-{}", self.platform, modifiers.join("_"))
    }

    /// `<architecture>/<filename prefix>`
    pub fn canonical_name_prefix(&self) -> String {
        format!("{}/{}", self.architecture, self.filename_prefix())
    }

    /// Everything this flavour consists of: the platform's closure followed by
    /// the normalized modifiers.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from the expansion.
    pub fn calculate_modifiers<'a>(
        &self,
        registry: &'a FeatureRegistry,
    ) -> FlavourResult<Vec<&'a Feature>> {
        let platform = registry.by_name(&self.platform)?;
        let mut features = registry
            .included_features(platform, true)
            .collect::<FlavourResult<Vec<_>>>()?;

        for name in registry.normalized_modifiers(&self.platform, &self.modifiers)? {
            features.push(registry.by_name(&name)?);
        }
        Ok(features)
    }
}

impl fmt::Display for FlavourSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_name_prefix())
    }
}

fn has_kind(registry: &FeatureRegistry, name: &str, kind: FeatureKind) -> FlavourResult<bool> {
    match registry.by_name(name) {
        Ok(feature) => Ok(feature.kind() == kind),
        Err(FlavourError::UnknownFeature(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Declaration of flavours as a cross product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavourCombination {
    /// Architectures to build for
    pub architectures: Vec<Architecture>,
    /// Platform feature names
    pub platforms: Vec<String>,
    /// Modifier sets, one flavour per set
    pub modifiers: Vec<Vec<String>>,
}

impl FlavourCombination {
    /// Number of flavours this combination expands to
    pub fn len(&self) -> usize {
        self.architectures.len() * self.platforms.len() * self.modifiers.len()
    }

    /// Whether this combination expands to nothing
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cross product in (architecture, platform, modifier set) order.
    pub fn tuples(&self) -> impl Iterator<Item = (Architecture, &str, &[String])> + '_ {
        self.architectures.iter().flat_map(move |&arch| {
            self.platforms.iter().flat_map(move |platform| {
                self.modifiers
                    .iter()
                    .map(move |mods| (arch, platform.as_str(), mods.as_slice()))
            })
        })
    }
}

/// A named set of flavour combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavourSet {
    /// Set name
    pub name: String,
    /// Combinations, expanded in declaration order
    pub flavour_combinations: Vec<FlavourCombination>,
}

impl FlavourSet {
    /// Lazily expand into concrete flavours with normalized modifiers.
    ///
    /// The sequence is restartable and its order stable: combinations in
    /// declaration order, then architecture, platform, modifier set.
    pub fn flavours<'a>(
        &'a self,
        registry: &'a FeatureRegistry,
    ) -> impl Iterator<Item = FlavourResult<FlavourSpec>> + 'a {
        self.flavour_combinations
            .iter()
            .flat_map(|combination| combination.tuples())
            .map(move |(arch, platform, modifiers)| {
                FlavourSpec::normalized(registry, arch, platform, modifiers)
            })
    }

    /// Expand all flavours, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by [`FlavourSet::flavours`].
    pub fn expand(&self, registry: &FeatureRegistry) -> FlavourResult<Vec<FlavourSpec>> {
        let flavours = self.flavours(registry).collect::<FlavourResult<Vec<_>>>()?;
        debug!("Expanded flavour set {} into {} flavours", self.name, flavours.len());
        Ok(flavours)
    }
}

/// Contents of a `flavours.yaml` declaration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlavoursFile {
    /// Declared flavour sets
    #[serde(default)]
    pub flavour_sets: Vec<FlavourSet>,
}

impl FlavoursFile {
    /// Parse a declaration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `FlavourError::ParseError` (with `origin` as path) on invalid YAML.
    pub fn parse(content: &str, origin: &Path) -> FlavourResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| FlavourError::ParseError(origin.to_path_buf(), e.to_string()))
    }

    /// Load a declaration file.
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be read and `ParseError` if it is
    /// not a valid declaration.
    pub fn load(path: impl AsRef<Path>) -> FlavourResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlavourError::IoError(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content, path)
    }

    /// Find a flavour set by name
    pub fn flavour_set(&self, name: &str) -> Option<&FlavourSet> {
        self.flavour_sets.iter().find(|set| set.name == name)
    }
}
