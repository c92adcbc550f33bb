//! Flavour set expansion

use super::CommandResult;
use convenient_flavour::{FeatureRegistry, FlavoursFile};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// One expanded flavour as printed by `expand --json`
#[derive(Debug, Serialize)]
struct FlavourRow<'a> {
    flavour_set: &'a str,
    architecture: String,
    platform: &'a str,
    modifiers: &'a [String],
    canonical_name: String,
    filename_prefix: String,
}

/// Expand all (or one named) flavour sets
pub fn expand(
    registry: &FeatureRegistry,
    flavours_file: &Path,
    set_name: Option<&str>,
    json: bool,
) -> CommandResult {
    let file = FlavoursFile::load(flavours_file)?;

    let sets: Vec<_> = match set_name {
        Some(name) => vec![
            file.flavour_set(name)
                .ok_or_else(|| format!("Unknown flavour set: {}", name))?,
        ],
        None => file.flavour_sets.iter().collect(),
    };

    let mut expanded = Vec::new();
    for set in sets {
        let flavours = set.expand(registry)?;
        info!("Flavour set {}: {} flavours", set.name, flavours.len());
        expanded.extend(flavours.into_iter().map(|flavour| (set.name.as_str(), flavour)));
    }

    if json {
        let rows = expanded
            .iter()
            .map(|(set, flavour)| {
                Ok(FlavourRow {
                    flavour_set: set,
                    architecture: flavour.architecture().to_string(),
                    platform: flavour.platform(),
                    modifiers: flavour.modifiers(),
                    canonical_name: registry
                        .canonical_feature_names(flavour.platform(), flavour.modifiers())?
                        .join("-"),
                    filename_prefix: flavour.filename_prefix(),
                })
            })
            .collect::<Result<Vec<_>, convenient_flavour::FlavourError>>()?;
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for (set, flavour) in &expanded {
            println!("{:<16} {}", set, flavour.canonical_name_prefix());
        }
    }

    Ok(())
}
