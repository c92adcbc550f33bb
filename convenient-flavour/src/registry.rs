//! Feature registry: the loaded feature set, indexed by name.
//!
//! The registry is constructed once by the entry point and handed to every
//! consumer by reference. Loading happens lazily on first access and at most
//! once; concurrent first callers serialize on the initialization cell and
//! afterwards read the immutable set without locking. A failed load is not
//! cached.

use crate::error::{FlavourError, FlavourResult};
use crate::feature::{Feature, FeatureKind};
use crate::source::{FeatureSource, StaticSource};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Lazily loaded, immutable set of features.
pub struct FeatureRegistry {
    source: Box<dyn FeatureSource>,
    features: OnceCell<BTreeMap<String, Feature>>,
}

impl fmt::Debug for FeatureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureRegistry")
            .field("loaded", &self.features.get().map(BTreeMap::len))
            .finish_non_exhaustive()
    }
}

impl FeatureRegistry {
    /// Create a registry that loads from `source` on first use.
    pub fn new(source: impl FeatureSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            features: OnceCell::new(),
        }
    }

    /// Create a registry over an in-memory feature list.
    pub fn from_features(features: impl IntoIterator<Item = Feature>) -> Self {
        Self::new(StaticSource::new(features))
    }

    fn index(&self) -> FlavourResult<&BTreeMap<String, Feature>> {
        self.features.get_or_try_init(|| {
            let loaded = self.source.load()?;
            let mut index = BTreeMap::new();

            for feature in loaded {
                let name = feature.name().to_string();
                if index.insert(name.clone(), feature).is_some() {
                    return Err(FlavourError::DuplicateFeature(name));
                }
            }

            debug!("Loaded {} features", index.len());
            Ok(index)
        })
    }

    /// Whether the features have been loaded already
    pub fn is_loaded(&self) -> bool {
        self.features.get().is_some()
    }

    /// All features, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails.
    pub fn load_all(&self) -> FlavourResult<Vec<&Feature>> {
        Ok(self.index()?.values().collect())
    }

    /// Look up a feature by name.
    ///
    /// # Errors
    ///
    /// - `FlavourError::UnknownFeature` if no feature has this name
    /// - the source's error if the first load fails
    pub fn by_name(&self, name: &str) -> FlavourResult<&Feature> {
        self.index()?
            .get(name)
            .ok_or_else(|| FlavourError::UnknownFeature(name.to_string()))
    }

    /// Whether a feature of the given name exists.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails.
    pub fn contains(&self, name: &str) -> FlavourResult<bool> {
        Ok(self.index()?.contains_key(name))
    }

    /// All features of the given kind, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails.
    pub fn of_kind(&self, kind: FeatureKind) -> FlavourResult<Vec<&Feature>> {
        Ok(self
            .index()?
            .values()
            .filter(|feature| feature.kind() == kind)
            .collect())
    }

    /// All platform features.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails.
    pub fn platforms(&self) -> FlavourResult<Vec<&Feature>> {
        self.of_kind(FeatureKind::Platform)
    }

    /// All modifier features.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the first load fails.
    pub fn modifiers(&self) -> FlavourResult<Vec<&Feature>> {
        self.of_kind(FeatureKind::Modifier)
    }

    /// Verify that every include resolves and that no feature reaches itself.
    ///
    /// # Errors
    ///
    /// Returns the first `UnknownFeature` or `CyclicFeatureGraph` found,
    /// walking features in name order.
    pub fn check_integrity(&self) -> FlavourResult<()> {
        for feature in self.load_all()? {
            for included in self.included_features(feature, true) {
                if let Err(e) = included {
                    warn!("Feature {} failed integrity check: {}", feature.name(), e);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}
