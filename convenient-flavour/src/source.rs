//! Where feature descriptors come from.
//!
//! The registry does not care how descriptors are stored; it asks a
//! [`FeatureSource`] once and keeps the result.

use crate::error::{FlavourError, FlavourResult};
use crate::feature::{Feature, FeatureDescriptor};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// File name of a feature descriptor inside its feature directory
pub const DESCRIPTOR_FILE: &str = "info.yaml";

/// Supplier of the complete set of feature definitions.
pub trait FeatureSource: Send + Sync {
    /// Load every feature.
    ///
    /// # Errors
    ///
    /// Returns an error if descriptors cannot be read or parsed.
    fn load(&self) -> FlavourResult<Vec<Feature>>;
}

/// Reads `<root>/<name>/info.yaml` descriptors from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    /// Create a source rooted at the given features directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Features directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find all descriptor files below the root, in a stable order
    pub fn descriptor_files(&self) -> FlavourResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).follow_links(true).sort_by_file_name() {
            let entry =
                entry.map_err(|e| FlavourError::IoError(self.root.clone(), e.to_string()))?;
            if entry.file_type().is_file() && entry.file_name() == DESCRIPTOR_FILE {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Parse one descriptor, naming the feature after its parent directory
    pub fn load_descriptor(path: &Path) -> FlavourResult<Feature> {
        let name = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                FlavourError::ParseError(
                    path.to_path_buf(),
                    "cannot derive feature name from directory".to_string(),
                )
            })?
            .to_string();

        let content = std::fs::read_to_string(path)
            .map_err(|e| FlavourError::IoError(path.to_path_buf(), e.to_string()))?;
        let descriptor: FeatureDescriptor = serde_yaml::from_str(&content)
            .map_err(|e| FlavourError::ParseError(path.to_path_buf(), e.to_string()))?;

        debug!("Loaded feature {} ({}) from {}", name, descriptor.kind, path.display());
        Ok(Feature::from_descriptor(name, descriptor))
    }
}

impl FeatureSource for DirectorySource {
    fn load(&self) -> FlavourResult<Vec<Feature>> {
        if !self.root.is_dir() {
            return Err(FlavourError::IoError(
                self.root.clone(),
                "features directory does not exist".to_string(),
            ));
        }

        self.descriptor_files()?
            .iter()
            .map(|path| Self::load_descriptor(path))
            .collect()
    }
}

/// Features held in memory, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    features: Vec<Feature>,
}

impl StaticSource {
    /// Wrap an existing list of features
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        Self {
            features: features.into_iter().collect(),
        }
    }
}

impl FeatureSource for StaticSource {
    fn load(&self) -> FlavourResult<Vec<Feature>> {
        Ok(self.features.clone())
    }
}
