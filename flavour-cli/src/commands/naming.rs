//! Canonical names and manifest keys

use super::CommandResult;
use convenient_flavour::{
    Architecture, FeatureRegistry, ReleaseIdentity, check_epoch, epoch_from_version_file,
};
use std::path::Path;
use tracing::debug;

/// Print the canonical feature names, hyphen-joined
pub fn canonical(registry: &FeatureRegistry, platform: &str, modifiers: &[String]) -> CommandResult {
    println!("{}", registry.canonical_feature_names(platform, modifiers)?.join("-"));
    Ok(())
}

/// Arguments of `manifest-key`
pub struct KeyRequest<'a> {
    pub committish: &'a str,
    pub version: Option<&'a str>,
    pub epoch: Option<u32>,
    pub arch: &'a str,
    pub platform: &'a str,
    pub modifiers: &'a [String],
}

/// Snapshot version: `<epoch>-<first six characters of the commit>`
fn snapshot_version(epoch: u32, committish: &str) -> String {
    let short: String = committish.chars().take(6).collect();
    format!("{}-{}", epoch, short)
}

/// Print the canonical manifest key of a release
pub fn manifest_key(
    registry: &FeatureRegistry,
    version_file: &Path,
    request: KeyRequest<'_>,
) -> CommandResult {
    let epoch = match request.epoch {
        Some(epoch) => check_epoch(i64::from(epoch))?,
        None => epoch_from_version_file(version_file)?,
    };
    let version = request
        .version
        .map(str::to_string)
        .unwrap_or_else(|| snapshot_version(epoch, request.committish));

    let identity = ReleaseIdentity {
        build_committish: request.committish.to_string(),
        version,
        epoch,
        architecture: request.arch.parse::<Architecture>()?,
        platform: request.platform.to_string(),
        modifiers: request.modifiers.to_vec(),
    };
    // validates platform and modifier kinds
    let flavour = identity.flavour(registry)?;
    debug!("Flavour {}", flavour);

    println!("{}", identity.canonical_manifest_key(registry)?);
    Ok(())
}
