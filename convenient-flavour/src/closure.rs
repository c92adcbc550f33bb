//! Transitive closure over feature includes.
//!
//! Expansion walks the include graph with an explicit stack. Revisiting a
//! feature that is still on the current expansion path is reported as
//! [`FlavourError::CyclicFeatureGraph`] instead of recursing forever.

use crate::error::{FlavourError, FlavourResult};
use crate::feature::{Feature, canonical_order};
use crate::registry::FeatureRegistry;
use std::collections::BTreeSet;
use tracing::trace;

/// Lazy sequence of the features included by a root feature.
///
/// Dependencies of a dependency are yielded before the dependency itself
/// (post-order). The sequence is not deduplicated: a feature reachable along
/// several paths is yielded once per path. After the first error the iterator
/// is exhausted.
#[derive(Debug)]
pub struct IncludedFeatures<'a> {
    registry: &'a FeatureRegistry,
    transitive: bool,
    // (feature, index of the next include to visit)
    stack: Vec<(&'a Feature, usize)>,
    done: bool,
}

impl<'a> IncludedFeatures<'a> {
    fn new(registry: &'a FeatureRegistry, root: &'a Feature, transitive: bool) -> Self {
        Self {
            registry,
            transitive,
            stack: vec![(root, 0)],
            done: false,
        }
    }

    fn fail(&mut self, error: FlavourError) -> Option<FlavourResult<&'a Feature>> {
        self.done = true;
        self.stack.clear();
        Some(Err(error))
    }

    fn on_path(&self, name: &str) -> bool {
        self.stack.iter().any(|(feature, _)| feature.name() == name)
    }
}

impl<'a> Iterator for IncludedFeatures<'a> {
    type Item = FlavourResult<&'a Feature>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let Some((current, cursor)) = self.stack.last_mut() else {
                self.done = true;
                return None;
            };
            let current: &'a Feature = *current;

            if let Some(name) = current.included_feature_names().get(*cursor) {
                *cursor += 1;

                let included = match self.registry.by_name(name) {
                    Ok(feature) => feature,
                    Err(e) => return self.fail(e),
                };

                if !self.transitive {
                    return Some(Ok(included));
                }

                if self.on_path(included.name()) {
                    let mut path: Vec<String> = self
                        .stack
                        .iter()
                        .map(|(feature, _)| feature.name().to_string())
                        .collect();
                    path.push(included.name().to_string());
                    return self.fail(FlavourError::CyclicFeatureGraph { path });
                }

                trace!("Expanding {} -> {}", current.name(), included.name());
                self.stack.push((included, 0));
                continue;
            }

            // All includes of `current` visited
            let _ = self.stack.pop();
            if self.stack.is_empty() {
                // root is not part of its own closure
                self.done = true;
                return None;
            }
            return Some(Ok(current));
        }
    }
}

impl FeatureRegistry {
    /// Features included by `feature`, transitively or only directly.
    ///
    /// Resolution errors (`UnknownFeature`, `CyclicFeatureGraph`) surface as
    /// items of the sequence.
    pub fn included_features<'a>(
        &'a self,
        feature: &'a Feature,
        transitive: bool,
    ) -> IncludedFeatures<'a> {
        IncludedFeatures::new(self, feature, transitive)
    }

    /// Names of all features transitively included by `feature`, deduplicated.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from the expansion.
    pub fn closure_names(&self, feature: &Feature) -> FlavourResult<BTreeSet<String>> {
        self.included_features(feature, true)
            .map(|f| f.map(|f| f.name().to_string()))
            .collect()
    }

    /// Full effective modifier set of a flavour, in canonical order.
    ///
    /// This is the union of the modifiers themselves, everything they include
    /// transitively, and everything the platform includes transitively. The
    /// platform's own name is not part of the result.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` if the platform or a modifier does not exist,
    /// or `CyclicFeatureGraph` if expansion hits a cycle.
    pub fn normalized_modifiers<S: AsRef<str>>(
        &self,
        platform: &str,
        modifiers: &[S],
    ) -> FlavourResult<Vec<String>> {
        let platform = self.by_name(platform)?;
        let mut all_modifiers = BTreeSet::new();

        for name in modifiers {
            let modifier = self.by_name(name.as_ref())?;
            let _ = all_modifiers.insert(modifier.name().to_string());
            all_modifiers.extend(self.closure_names(modifier)?);
        }

        all_modifiers.extend(self.closure_names(platform)?);

        let mut normalized: Vec<String> = all_modifiers.into_iter().collect();
        normalized.sort_by(|a, b| canonical_order(a, b));
        Ok(normalized)
    }
}
