//! Release identities, manifests and their canonical storage keys.
//!
//! A release is identified by its canonical flavour name and version. The
//! canonical flavour name is derived from
//! [`FeatureRegistry::canonical_features`], never from the raw modifier list,
//! so redundant or reordered modifiers map to the same key.

use crate::error::{FlavourError, FlavourResult};
use crate::flavour::{Architecture, FlavourSpec};
use crate::registry::FeatureRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key prefix of single release manifests
pub const MANIFEST_KEY_PREFIX: &str = "meta/singles";

/// Key prefix of release manifest sets
pub const MANIFEST_SET_KEY_PREFIX: &str = "meta/sets";

/// Kind of pipeline run that produced a release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineFlavour {
    /// Nightly or ad-hoc build
    Snapshot,
    /// Versioned release
    Release,
}

impl fmt::Display for PipelineFlavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineFlavour::Snapshot => write!(f, "snapshot"),
            PipelineFlavour::Release => write!(f, "release"),
        }
    }
}

/// Attributes that unambiguously identify a release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseIdentity {
    /// Commit the release was built from
    pub build_committish: String,
    /// `<epoch>-<commit[:6]>` for snapshots, the release version otherwise
    pub version: String,
    /// Build epoch (days since inception, starting at 1)
    pub epoch: u32,
    /// Target architecture
    pub architecture: Architecture,
    /// Platform feature name
    pub platform: String,
    /// Modifier feature names as recorded (not necessarily normalized)
    pub modifiers: Vec<String>,
}

impl ReleaseIdentity {
    /// Flavour of this release, with normalized modifiers.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFlavour` if platform or modifiers are invalid.
    pub fn flavour(&self, registry: &FeatureRegistry) -> FlavourResult<FlavourSpec> {
        FlavourSpec::normalized(registry, self.architecture, &self.platform, &self.modifiers)
    }

    /// Copy of this identity with its modifiers normalized.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from the expansion.
    pub fn normalised(&self, registry: &FeatureRegistry) -> FlavourResult<Self> {
        Ok(Self {
            modifiers: registry.normalized_modifiers(&self.platform, &self.modifiers)?,
            ..self.clone()
        })
    }

    /// Canonical feature names joined by `-`: the platform, then the minimal modifiers.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from canonicalization.
    pub fn canonical_flavour_name(&self, registry: &FeatureRegistry) -> FlavourResult<String> {
        Ok(registry
            .canonical_feature_names(&self.platform, &self.modifiers)?
            .join("-"))
    }

    /// `<canonical flavour name>-<version>`
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from canonicalization.
    pub fn canonical_manifest_key_suffix(
        &self,
        registry: &FeatureRegistry,
    ) -> FlavourResult<String> {
        Ok(format!(
            "{}-{}",
            self.canonical_flavour_name(registry)?,
            self.version
        ))
    }

    /// `meta/singles/<canonical flavour name>-<version>`
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from canonicalization.
    pub fn canonical_manifest_key(&self, registry: &FeatureRegistry) -> FlavourResult<String> {
        Ok(format!(
            "{}/{}",
            MANIFEST_KEY_PREFIX,
            self.canonical_manifest_key_suffix(registry)?
        ))
    }

    /// Whether both identities name the same release: equal version and equal
    /// canonical features.
    ///
    /// # Errors
    ///
    /// Returns `UnknownFeature` or `CyclicFeatureGraph` from canonicalization.
    pub fn same_release(&self, other: &Self, registry: &FeatureRegistry) -> FlavourResult<bool> {
        if self.version != other.version {
            return Ok(false);
        }
        Ok(registry.canonical_feature_names(&self.platform, &self.modifiers)?
            == registry.canonical_feature_names(&other.platform, &other.modifiers)?)
    }
}

/// A single build result file stored in S3
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseFile {
    /// File name
    pub name: String,
    /// Suffix identifying the artifact type (e.g. `rootfs.tar.xz`)
    pub suffix: String,
    /// Object key
    pub s3_key: String,
    /// Bucket holding the object
    pub s3_bucket_name: String,
}

/// Image published to AWS
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsPublishedImage {
    /// AMI id
    pub ami_id: String,
    /// Region the AMI lives in
    pub aws_region_id: String,
    /// Image name
    pub image_name: String,
}

/// Image published to Alibaba Cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlicloudPublishedImage {
    /// Image id
    pub image_id: String,
    /// Region the image lives in
    pub region_id: String,
    /// Image name
    pub image_name: String,
}

/// Cloud provider metadata of a published release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PublishedImageMetadata {
    /// AMIs in one or more regions
    Aws {
        /// Published images
        published_aws_images: Vec<AwsPublishedImage>,
    },
    /// Alicloud images in one or more regions
    Alicloud {
        /// Published images
        published_alicloud_images: Vec<AlicloudPublishedImage>,
    },
    /// Google Cloud image
    Gcp {
        /// Image name
        gcp_image_name: String,
        /// Project the image belongs to
        gcp_project_name: String,
    },
}

/// Metadata of a release that can be (or was) uploaded to the build result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifest {
    /// Identifying attributes
    #[serde(flatten)]
    pub identity: ReleaseIdentity,
    /// ISO-8601 build timestamp
    pub build_timestamp: String,
    /// Uploaded build result files
    #[serde(default)]
    pub paths: Vec<ReleaseFile>,
    /// Publishing metadata, once published
    #[serde(default)]
    pub published_image_metadata: Option<PublishedImageMetadata>,
}

impl ReleaseManifest {
    /// Identity of this release
    pub fn release_identity(&self) -> &ReleaseIdentity {
        &self.identity
    }

    /// Find the release file with the given suffix.
    ///
    /// # Errors
    ///
    /// Returns `FlavourError::NoSuchReleaseFile` if no file has this suffix.
    pub fn path_by_suffix(&self, suffix: &str) -> FlavourResult<&ReleaseFile> {
        self.paths
            .iter()
            .find(|path| path.suffix == suffix)
            .ok_or_else(|| FlavourError::NoSuchReleaseFile(suffix.to_string()))
    }

    /// Parse a manifest from YAML (JSON is accepted as well).
    ///
    /// # Errors
    ///
    /// Returns `FlavourError::ParseError` on malformed input.
    pub fn from_yaml(content: &str) -> FlavourResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| FlavourError::ParseError("<manifest>".into(), e.to_string()))
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns `FlavourError::ParseError` if serialization fails.
    pub fn to_yaml(&self) -> FlavourResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| FlavourError::ParseError("<manifest>".into(), e.to_string()))
    }
}

/// A [`ReleaseManifest`] as retrieved from S3, with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineReleaseManifest {
    /// Manifest content
    #[serde(flatten)]
    pub manifest: ReleaseManifest,
    /// Key the manifest was read from
    pub s3_key: String,
    /// Bucket the manifest was read from
    pub s3_bucket: String,
}

impl OnlineReleaseManifest {
    /// Manifest without storage location
    pub fn stripped_manifest(&self) -> ReleaseManifest {
        self.manifest.clone()
    }
}

/// All release manifests of one flavour set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseManifestSet {
    /// Member manifests
    pub manifests: Vec<OnlineReleaseManifest>,
    /// Name of the flavour set
    pub flavour_set_name: String,
}

impl ReleaseManifestSet {
    /// `meta/sets/<flavour set name>`
    pub fn key(&self) -> String {
        format!("{}/{}", MANIFEST_SET_KEY_PREFIX, self.flavour_set_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Feature, FeatureKind};

    fn registry() -> FeatureRegistry {
        FeatureRegistry::from_features(vec![
            Feature::new("aws", FeatureKind::Platform, ["cloud"]),
            Feature::new("cloud", FeatureKind::Modifier, ["base"]),
            Feature::new("base", FeatureKind::Modifier, Vec::<String>::new()),
            Feature::new("gardener", FeatureKind::Modifier, ["base"]),
            Feature::new("_prod", FeatureKind::Modifier, Vec::<String>::new()),
        ])
    }

    fn identity(modifiers: &[&str]) -> ReleaseIdentity {
        ReleaseIdentity {
            build_committish: "a1b2c3d4e5f6".to_string(),
            version: "184.0".to_string(),
            epoch: 184,
            architecture: Architecture::Amd64,
            platform: "aws".to_string(),
            modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn test_canonical_manifest_key() {
        let registry = registry();
        let id = identity(&["base", "cloud", "gardener", "_prod"]);

        assert_eq!(
            id.canonical_manifest_key_suffix(&registry).unwrap(),
            "aws-gardener-_prod-184.0"
        );
        assert_eq!(
            id.canonical_manifest_key(&registry).unwrap(),
            "meta/singles/aws-gardener-_prod-184.0"
        );
    }

    #[test]
    fn test_key_ignores_order_and_redundancy() {
        let registry = registry();
        let a = identity(&["_prod", "gardener"]);
        let b = identity(&["gardener", "base", "_prod", "cloud", "gardener"]);

        assert_eq!(
            a.canonical_manifest_key(&registry).unwrap(),
            b.canonical_manifest_key(&registry).unwrap()
        );
        assert!(a.same_release(&b, &registry).unwrap());
    }

    #[test]
    fn test_different_version_is_different_release() {
        let registry = registry();
        let a = identity(&["_prod"]);
        let mut b = a.clone();
        b.version = "185.0".to_string();

        assert!(!a.same_release(&b, &registry).unwrap());
    }

    #[test]
    fn test_normalised_identity() {
        let registry = registry();
        let id = identity(&["gardener"]).normalised(&registry).unwrap();
        assert_eq!(id.modifiers, vec!["base", "cloud", "gardener"]);

        let flavour = id.flavour(&registry).unwrap();
        assert_eq!(flavour.filename_prefix(), "aws-base_cloud_gardener");
    }

    #[test]
    fn test_manifest_yaml() {
        let yaml = r#"
build_committish: a1b2c3d4e5f6
version: "184.0"
epoch: 184
architecture: amd64
platform: aws
modifiers: [gardener, _prod]
build_timestamp: "2020-10-01T12:00:00Z"
paths:
  - name: rootfs
    suffix: rootfs.tar.xz
    s3_key: objects/abc
    s3_bucket_name: images
published_image_metadata:
  published_aws_images:
    - ami_id: ami-123
      aws_region_id: eu-central-1
      image_name: test-image
"#;
        let manifest = ReleaseManifest::from_yaml(yaml).unwrap();

        assert_eq!(manifest.release_identity().epoch, 184);
        assert_eq!(manifest.path_by_suffix("rootfs.tar.xz").unwrap().s3_key, "objects/abc");
        assert!(matches!(
            manifest.path_by_suffix("vmdk"),
            Err(FlavourError::NoSuchReleaseFile(suffix)) if suffix == "vmdk"
        ));
        assert!(matches!(
            manifest.published_image_metadata,
            Some(PublishedImageMetadata::Aws { .. })
        ));

        let reparsed = ReleaseManifest::from_yaml(&manifest.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed, manifest);
    }

    #[test]
    fn test_online_manifest_and_set() {
        let manifest = ReleaseManifest {
            identity: identity(&["_prod"]),
            build_timestamp: "2020-10-01T12:00:00Z".to_string(),
            paths: vec![],
            published_image_metadata: Some(PublishedImageMetadata::Gcp {
                gcp_image_name: "img".to_string(),
                gcp_project_name: "proj".to_string(),
            }),
        };
        let online = OnlineReleaseManifest {
            manifest: manifest.clone(),
            s3_key: "meta/singles/aws-_prod-184.0".to_string(),
            s3_bucket: "images".to_string(),
        };
        assert_eq!(online.stripped_manifest(), manifest);

        let set = ReleaseManifestSet {
            manifests: vec![online],
            flavour_set_name: "all".to_string(),
        };
        assert_eq!(set.key(), "meta/sets/all");
    }
}
