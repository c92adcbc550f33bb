//! End-to-end tests over a feature tree on disk.
//!
//! Builds a small `features/` directory the way image repositories lay it out
//! and runs loading, expansion and naming against it.

use convenient_flavour::{
    Architecture, DirectorySource, FeatureKind, FeatureRegistry, FlavourError, FlavoursFile,
    ReleaseIdentity,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create `<root>/<name>/info.yaml`
fn write_feature(root: &Path, name: &str, content: &str) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("info.yaml"), content).unwrap();
}

fn feature_tree() -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("features");

    write_feature(&root, "base", "description: base system\ntype: modifier\n");
    write_feature(
        &root,
        "cloud",
        "type: modifier\nfeatures:\n  include:\n    - base\n",
    );
    write_feature(
        &root,
        "server",
        "type: modifier\nfeatures:\n  include:\n    - base\n",
    );
    write_feature(
        &root,
        "aws",
        "description: Amazon Web Services\ntype: platform\nfeatures:\n  include:\n    - cloud\n",
    );
    write_feature(
        &root,
        "gcp",
        "type: platform\nfeatures:\n  include:\n    - cloud\n",
    );
    write_feature(&root, "metal", "type: platform\n");
    write_feature(
        &root,
        "gardener",
        "type: modifier\nfeatures:\n  include:\n    - server\n    - cloud\n",
    );
    write_feature(&root, "_prod", "type: modifier\n");
    // not a descriptor
    std::fs::write(root.join("README.md"), "# features\n").unwrap();

    (temp, root)
}

#[test]
fn test_loads_tree() {
    let (_temp, root) = feature_tree();
    let registry = FeatureRegistry::new(DirectorySource::new(&root));

    let names: Vec<&str> = registry
        .load_all()
        .unwrap()
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(
        names,
        vec!["_prod", "aws", "base", "cloud", "gardener", "gcp", "metal", "server"]
    );

    let platforms: Vec<&str> = registry
        .platforms()
        .unwrap()
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(platforms, vec!["aws", "gcp", "metal"]);
    assert_eq!(registry.modifiers().unwrap().len(), 5);

    let aws = registry.by_name("aws").unwrap();
    assert_eq!(aws.kind(), FeatureKind::Platform);
    assert_eq!(aws.description(), "Amazon Web Services");

    registry.check_integrity().unwrap();
}

#[test]
fn test_tree_is_read_once() {
    let (_temp, root) = feature_tree();
    let registry = FeatureRegistry::new(DirectorySource::new(&root));
    assert_eq!(registry.load_all().unwrap().len(), 8);

    // later changes on disk are not picked up
    write_feature(&root, "kvm", "type: platform\n");
    assert_eq!(registry.load_all().unwrap().len(), 8);
    assert!(matches!(
        registry.by_name("kvm"),
        Err(FlavourError::UnknownFeature(_))
    ));
}

#[test]
fn test_missing_directory() {
    let temp = TempDir::new().unwrap();
    let registry = FeatureRegistry::new(DirectorySource::new(temp.path().join("nope")));
    assert!(matches!(registry.load_all(), Err(FlavourError::IoError(_, _))));
}

#[test]
fn test_malformed_descriptor() {
    let (_temp, root) = feature_tree();
    write_feature(&root, "broken", "type: [platform\n");
    let registry = FeatureRegistry::new(DirectorySource::new(&root));

    match registry.load_all() {
        Err(FlavourError::ParseError(path, _)) => {
            assert!(path.ends_with("broken/info.yaml"));
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_cyclic_tree_detected() {
    let (_temp, root) = feature_tree();
    write_feature(
        &root,
        "base",
        "type: modifier\nfeatures:\n  include:\n    - gardener\n",
    );
    let registry = FeatureRegistry::new(DirectorySource::new(&root));

    assert!(matches!(
        registry.check_integrity(),
        Err(FlavourError::CyclicFeatureGraph { .. })
    ));
    assert!(matches!(
        registry.normalized_modifiers("aws", &["_prod"]),
        Err(FlavourError::CyclicFeatureGraph { .. })
    ));
}

#[test]
fn test_expand_and_name() {
    let (temp, root) = feature_tree();
    let registry = FeatureRegistry::new(DirectorySource::new(&root));

    let flavours_path = temp.path().join("flavours.yaml");
    std::fs::write(
        &flavours_path,
        r#"
flavour_sets:
  - name: all
    flavour_combinations:
      - architectures: [amd64]
        platforms: [aws, metal]
        modifiers:
          - [gardener, _prod]
          - [server]
"#,
    )
    .unwrap();

    let file = FlavoursFile::load(&flavours_path).unwrap();
    let flavours = file.flavour_set("all").unwrap().expand(&registry).unwrap();
    let prefixes: Vec<String> = flavours.iter().map(|f| f.filename_prefix()).collect();

    assert_eq!(
        prefixes,
        vec![
            "aws-_prod_base_cloud_gardener_server",
            "aws-base_cloud_server",
            "metal-_prod_base_cloud_gardener_server",
            "metal-base_server",
        ]
    );

    let keys: Vec<String> = flavours
        .iter()
        .map(|flavour| {
            ReleaseIdentity {
                build_committish: "0123456789ab".to_string(),
                version: "27.0".to_string(),
                epoch: 27,
                architecture: flavour.architecture(),
                platform: flavour.platform().to_string(),
                modifiers: flavour.modifiers().to_vec(),
            }
            .canonical_manifest_key(&registry)
            .unwrap()
        })
        .collect();

    assert_eq!(
        keys,
        vec![
            "meta/singles/aws-gardener-_prod-27.0",
            "meta/singles/aws-server-27.0",
            "meta/singles/metal-gardener-_prod-27.0",
            "meta/singles/metal-server-27.0",
        ]
    );
}

#[test]
fn test_keys_stable_under_reordering() {
    let (_temp, root) = feature_tree();
    let registry = FeatureRegistry::new(DirectorySource::new(&root));

    let identity = |modifiers: &[&str]| ReleaseIdentity {
        build_committish: "0123456789ab".to_string(),
        version: "27.0".to_string(),
        epoch: 27,
        architecture: Architecture::Arm64,
        platform: "gcp".to_string(),
        modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
    };

    let a = identity(&["_prod", "gardener"]);
    let b = identity(&["server", "gardener", "cloud", "_prod", "base"]);

    assert_eq!(
        a.canonical_manifest_key(&registry).unwrap(),
        b.canonical_manifest_key(&registry).unwrap()
    );
    assert_eq!(
        a.flavour(&registry).unwrap().filename_prefix(),
        b.flavour(&registry).unwrap().filename_prefix()
    );
}
