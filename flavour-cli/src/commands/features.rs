//! Feature listing, closure inspection and integrity checks

use super::CommandResult;
use convenient_flavour::{FeatureKind, FeatureRegistry};
use tracing::info;

/// List features, optionally filtered by kind
pub fn list(registry: &FeatureRegistry, kind: Option<FeatureKind>) -> CommandResult {
    let features = match kind {
        Some(kind) => registry.of_kind(kind)?,
        None => registry.load_all()?,
    };

    for feature in &features {
        println!(
            "{:<24} {:<9} {}",
            feature.name(),
            feature.kind().to_string(),
            feature.description()
        );
    }
    info!("{} features", features.len());

    Ok(())
}

/// Print the features included by `name`, deduplicated, in expansion order
pub fn closure(registry: &FeatureRegistry, name: &str, direct: bool) -> CommandResult {
    let feature = registry.by_name(name)?;
    let mut seen = Vec::new();

    for included in registry.included_features(feature, !direct) {
        let included = included?;
        if !seen.contains(&included.name()) {
            seen.push(included.name());
            println!("{}", included.name());
        }
    }

    Ok(())
}

/// Verify the feature graph
pub fn check(registry: &FeatureRegistry) -> CommandResult {
    registry.check_integrity()?;
    println!(
        "✅ {} features, all includes resolve, no cycles",
        registry.load_all()?.len()
    );
    Ok(())
}
