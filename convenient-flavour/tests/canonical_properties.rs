//! Property tests for closure and canonicalization over random acyclic graphs.
//!
//! Graphs are generated as lower-triangular adjacency matrices (node `i` may
//! only include nodes `j < i`), so every generated graph is acyclic while still
//! containing diamonds and long chains.

use convenient_flavour::{Feature, FeatureKind, FeatureRegistry};
use proptest::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
struct GraphCase {
    includes: Vec<Vec<usize>>,
    platform: usize,
    modifiers: Vec<usize>,
}

fn node_name(i: usize) -> String {
    // mixed case and underscores exercise the upper-case ordering
    match i % 3 {
        0 => format!("f{i}"),
        1 => format!("F{i}"),
        _ => format!("_m{i}"),
    }
}

impl GraphCase {
    fn registry(&self) -> FeatureRegistry {
        FeatureRegistry::from_features(self.includes.iter().enumerate().map(|(i, deps)| {
            let kind = if i == self.platform {
                FeatureKind::Platform
            } else {
                FeatureKind::Modifier
            };
            Feature::new(node_name(i), kind, deps.iter().map(|&j| node_name(j)))
        }))
    }

    fn platform(&self) -> String {
        node_name(self.platform)
    }

    fn modifier_names(&self) -> Vec<String> {
        self.modifiers.iter().map(|&i| node_name(i)).collect()
    }
}

fn graph_case() -> impl Strategy<Value = GraphCase> {
    (1usize..12)
        .prop_flat_map(|n| {
            (
                Just(n),
                prop::collection::vec(prop::collection::vec(any::<bool>(), n), n),
                0..n,
                prop::collection::vec(any::<bool>(), n),
            )
        })
        .prop_map(|(n, matrix, platform, selected)| {
            let includes = (0..n)
                .map(|i| (0..i).filter(|&j| matrix[i][j]).collect())
                .collect();
            let modifiers = (0..n).filter(|&i| selected[i] && i != platform).collect();
            GraphCase {
                includes,
                platform,
                modifiers,
            }
        })
}

fn as_set(names: Vec<String>) -> BTreeSet<String> {
    names.into_iter().collect()
}

proptest! {
    #[test]
    fn closure_never_contains_root(case in graph_case()) {
        let registry = case.registry();
        for feature in registry.load_all().unwrap() {
            let closure = registry.closure_names(feature).unwrap();
            prop_assert!(!closure.contains(feature.name()));
        }
    }

    #[test]
    fn canonicalization_is_idempotent(case in graph_case()) {
        let registry = case.registry();
        let platform = case.platform();
        let modifiers = case.modifier_names();

        let normalized = registry.normalized_modifiers(&platform, &modifiers).unwrap();
        prop_assert_eq!(
            registry.canonical_feature_names(&platform, &normalized).unwrap(),
            registry.canonical_feature_names(&platform, &modifiers).unwrap()
        );
    }

    #[test]
    fn canonical_form_reproduces_effective_set(case in graph_case()) {
        let registry = case.registry();
        let platform = case.platform();
        let modifiers = case.modifier_names();

        let canonical = registry.canonical_feature_names(&platform, &modifiers).unwrap();
        prop_assert_eq!(&canonical[0], &platform);

        prop_assert_eq!(
            registry.normalized_modifiers(&platform, &canonical[1..]).unwrap(),
            registry.normalized_modifiers(&platform, &modifiers).unwrap()
        );
    }

    #[test]
    fn canonical_form_is_minimal(case in graph_case()) {
        let registry = case.registry();
        let platform = case.platform();
        let modifiers = case.modifier_names();

        let canonical = registry.canonical_feature_names(&platform, &modifiers).unwrap();
        let full = as_set(registry.normalized_modifiers(&platform, &canonical[1..]).unwrap());

        for skip in 1..canonical.len() {
            let reduced: Vec<&String> = canonical[1..]
                .iter()
                .enumerate()
                .filter(|&(i, _)| i + 1 != skip)
                .map(|(_, name)| name)
                .collect();
            let reduced_closure = as_set(registry.normalized_modifiers(&platform, &reduced).unwrap());
            prop_assert_ne!(&reduced_closure, &full);
        }
    }

    #[test]
    fn canonicalization_ignores_order_and_duplicates(case in graph_case()) {
        let registry = case.registry();
        let platform = case.platform();
        let modifiers = case.modifier_names();

        let mut shuffled: Vec<String> = modifiers.iter().rev().cloned().collect();
        shuffled.extend(modifiers.iter().cloned());

        prop_assert_eq!(
            registry.canonical_feature_names(&platform, &shuffled).unwrap(),
            registry.canonical_feature_names(&platform, &modifiers).unwrap()
        );
        prop_assert_eq!(
            registry.normalized_modifiers(&platform, &shuffled).unwrap(),
            registry.normalized_modifiers(&platform, &modifiers).unwrap()
        );
    }

    #[test]
    fn normalized_order_is_total_and_sorted(case in graph_case()) {
        let registry = case.registry();
        let platform = case.platform();
        let normalized = registry
            .normalized_modifiers(&platform, &case.modifier_names())
            .unwrap();

        for pair in normalized.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(
                (a.to_uppercase(), a) < (b.to_uppercase(), b),
                "{} must sort before {}", a, b
            );
        }
    }
}
