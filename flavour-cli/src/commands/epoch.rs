//! Build epoch arithmetic

use super::CommandResult;
use convenient_flavour::{epoch_from_str, epoch_from_version_file};
use std::path::Path;

/// Print the epoch of `date`, or the one configured in the version file
pub fn epoch(version_file: &Path, date: Option<&str>) -> CommandResult {
    let epoch = match date {
        Some(date) => epoch_from_str(date)?,
        None => epoch_from_version_file(version_file)?,
    };
    println!("{}", epoch);
    Ok(())
}

/// Print the snapshot date of `epoch`, or of the configured one
pub fn snapshot_date(version_file: &Path, epoch: Option<i64>) -> CommandResult {
    let epoch = match epoch {
        Some(epoch) => epoch,
        None => i64::from(epoch_from_version_file(version_file)?),
    };
    println!("{}", convenient_flavour::snapshot_date(epoch)?);
    Ok(())
}
