//! Feature records and their `info.yaml` descriptor format.
//!
//! A feature descriptor looks like this:
//!
//! ```yaml
//! description: "Amazon Web Services"
//! type: platform
//! features:
//!   include:
//!     - cloud
//! ```
//!
//! The feature's name is not part of the descriptor; it comes from the
//! directory the descriptor lives in (`features/<name>/info.yaml`).

use serde::{Deserialize, Serialize};
use std::fmt;

const NO_DESCRIPTION: &str = "no description available";

/// Role of a feature within a flavour.
///
/// Each flavour specifies exactly one platform and any number of modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// Mandatory base of a flavour (e.g. a cloud provider or bare metal)
    Platform,
    /// Optional feature layered onto a platform
    Modifier,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Platform => write!(f, "platform"),
            FeatureKind::Modifier => write!(f, "modifier"),
        }
    }
}

/// Nested `features:` section of a descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureIncludes {
    /// Names of directly included features
    #[serde(default)]
    pub include: Vec<String>,
}

/// Parsed `info.yaml` content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    /// Feature kind (`platform` or `modifier`)
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    /// Human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Include references to other features
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureIncludes>,
}

/// A named node in the feature dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Feature {
    name: String,
    kind: FeatureKind,
    description: String,
    includes: Vec<String>,
}

impl Feature {
    /// Create a feature without description.
    ///
    /// Repeated include names are dropped, keeping the first occurrence.
    pub fn new<I, S>(name: impl Into<String>, kind: FeatureKind, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for include in includes {
            let include = include.into();
            if !unique.contains(&include) {
                unique.push(include);
            }
        }

        Self {
            name: name.into(),
            kind,
            description: NO_DESCRIPTION.to_string(),
            includes: unique,
        }
    }

    /// Build a feature from its descriptor and the name of its directory.
    pub fn from_descriptor(name: impl Into<String>, descriptor: FeatureDescriptor) -> Self {
        let includes = descriptor.features.map(|f| f.include).unwrap_or_default();
        let mut feature = Self::new(name, descriptor.kind, includes);
        if let Some(description) = descriptor.description {
            feature.description = description;
        }
        feature
    }

    /// Replace the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Unique feature name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Platform or modifier
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Description (defaults to "no description available")
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Names of the features immediately depended on by this feature
    pub fn included_feature_names(&self) -> &[String] {
        &self.includes
    }

    /// Whether this feature is a platform
    pub fn is_platform(&self) -> bool {
        self.kind == FeatureKind::Platform
    }

    /// Whether this feature is a modifier
    pub fn is_modifier(&self) -> bool {
        self.kind == FeatureKind::Modifier
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Sort key used for canonical ordering: upper-cased name, ties broken by the raw name.
///
/// Upper-casing places `_` after letters, so `_prod` sorts behind `gardener`.
pub(crate) fn canonical_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_uppercase()
        .cmp(&b.to_uppercase())
        .then_with(|| a.cmp(b))
}
