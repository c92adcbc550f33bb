//! Canonical (minimal) feature sets.
//!
//! Many modifier lists expand to the same effective set. The canonical form
//! keeps only the modifiers that are not implied by the platform or by another
//! kept modifier, so equal flavours always get byte-identical names.

use crate::error::FlavourResult;
use crate::feature::{Feature, canonical_order};
use crate::registry::FeatureRegistry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

impl FeatureRegistry {
    /// Platform followed by the minimal generating modifier set.
    ///
    /// Modifiers implied by the platform's closure are dropped first. Of the
    /// remaining ones, every modifier included (transitively) by another
    /// remaining modifier is dropped as well. The survivors are ordered by
    /// upper-cased name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` if the platform or a modifier does not exist,
    /// or `CyclicFeatureGraph` if expansion hits a cycle.
    pub fn canonical_features<S: AsRef<str>>(
        &self,
        platform: &str,
        modifiers: &[S],
    ) -> FlavourResult<Vec<&Feature>> {
        let platform = self.by_name(platform)?;

        let mut minimal: BTreeMap<&str, &Feature> = BTreeMap::new();
        for name in modifiers {
            let modifier = self.by_name(name.as_ref())?;
            let _ = minimal.insert(modifier.name(), modifier);
        }

        let _ = minimal.remove(platform.name());
        for implied in self.closure_names(platform)? {
            let _ = minimal.remove(implied.as_str());
        }

        let survivors: Vec<&Feature> = minimal.values().copied().collect();
        let mut implied_by_modifiers = BTreeSet::new();
        for modifier in survivors {
            implied_by_modifiers.extend(self.closure_names(modifier)?);
        }
        for implied in &implied_by_modifiers {
            let _ = minimal.remove(implied.as_str());
        }

        let mut canonical: Vec<&Feature> = minimal.into_values().collect();
        canonical.sort_by(|a, b| canonical_order(a.name(), b.name()));
        canonical.insert(0, platform);

        debug!(
            "Canonical features for {}: {}",
            platform.name(),
            canonical_names(&canonical).join(",")
        );
        Ok(canonical)
    }

    /// Names of [`canonical_features`](Self::canonical_features).
    ///
    /// # Errors
    ///
    /// See [`canonical_features`](Self::canonical_features).
    pub fn canonical_feature_names<S: AsRef<str>>(
        &self,
        platform: &str,
        modifiers: &[S],
    ) -> FlavourResult<Vec<String>> {
        Ok(canonical_names(&self.canonical_features(platform, modifiers)?)
            .into_iter()
            .map(str::to_string)
            .collect())
    }
}

fn canonical_names<'a>(features: &[&'a Feature]) -> Vec<&'a str> {
    features.iter().map(|f| f.name()).collect()
}
