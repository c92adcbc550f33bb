//! Build epochs and snapshot dates.
//!
//! The build epoch counts days since the project's inception on 2020-04-01,
//! starting at 1. It doubles as the major version and selects the Debian
//! snapshot repository date the build is pinned to.

use crate::error::{FlavourError, FlavourResult};
use chrono::{DateTime, Days, Local, NaiveDate, NaiveDateTime};
use std::path::Path;
use tracing::debug;

/// Version line token meaning "today's epoch"
pub const TODAY: &str = "today";

/// Date of epoch 1
#[allow(clippy::expect_used)]
pub const INCEPTION_DATE: NaiveDate =
    NaiveDate::from_ymd_opt(2020, 4, 1).expect("valid calendar date");

/// Accept an epoch computed or supplied from outside.
///
/// # Errors
///
/// Returns `EpochBeforeInception` below 1 and `EpochOutOfRange` above `u32::MAX`.
pub fn check_epoch(epoch: i64) -> FlavourResult<u32> {
    if epoch < 1 {
        return Err(FlavourError::EpochBeforeInception(epoch));
    }
    u32::try_from(epoch).map_err(|_| FlavourError::EpochOutOfRange(epoch))
}

/// Epoch of the given date.
///
/// # Errors
///
/// Returns `FlavourError::EpochBeforeInception` for dates before 2020-04-01.
pub fn epoch_for_date(date: NaiveDate) -> FlavourResult<u32> {
    check_epoch((date - INCEPTION_DATE).num_days() + 1)
}

/// Epoch of today (local time).
///
/// # Errors
///
/// Returns `FlavourError::EpochBeforeInception` if the system clock predates inception.
pub fn today_epoch() -> FlavourResult<u32> {
    epoch_for_date(Local::now().date_naive())
}

/// Epoch of an ISO-8601 date (`2020-05-02`) or date-time
/// (`2020-05-02T10:00:00`, optionally with offset).
///
/// # Errors
///
/// Returns `MalformedVersionSpec` if the text is not an ISO-8601 date, and
/// `EpochBeforeInception` for dates before inception.
pub fn epoch_from_str(text: &str) -> FlavourResult<u32> {
    let text = text.trim();
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y%m%d"))
        .or_else(|_| DateTime::parse_from_rfc3339(text).map(|dt| dt.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| FlavourError::MalformedVersionSpec(text.to_string()))?;
    epoch_for_date(date)
}

/// Snapshot repository date (`YYYYMMDD`) of an epoch.
///
/// # Errors
///
/// Returns `FlavourError::EpochBeforeInception` for epochs below 1 and
/// `FlavourError::EpochOutOfRange` past the last representable date.
pub fn snapshot_date(epoch: i64) -> FlavourResult<String> {
    let days = u64::from(check_epoch(epoch)? - 1);
    let date = INCEPTION_DATE
        .checked_add_days(Days::new(days))
        .ok_or(FlavourError::EpochOutOfRange(epoch))?;
    Ok(date.format("%Y%m%d").to_string())
}

/// Epoch configured by the content of a version file.
///
/// Lines are stripped and blank or `#` lines skipped. The first remaining line,
/// without its trailing comment, must be a semver-ish version whose major part
/// is the epoch (`184.0`), or the literal `today`, which yields the epoch of
/// `today`.
///
/// # Errors
///
/// - `MalformedVersionSpec` if no such line exists, it is not understood, or
///   its major part does not fit an epoch
/// - `EpochBeforeInception` if the resulting epoch is below 1
pub fn epoch_from_version_spec(content: &str, today: NaiveDate) -> FlavourResult<u32> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| FlavourError::MalformedVersionSpec(content.to_string()))?;

    let version = line.split('#').next().unwrap_or_default().trim();

    let major = version.split('.').next().unwrap_or_default();
    if let Ok(epoch) = major.parse::<i64>() {
        return check_epoch(epoch).map_err(|e| match e {
            FlavourError::EpochOutOfRange(_) => {
                FlavourError::MalformedVersionSpec(version.to_string())
            }
            other => other,
        });
    }

    if version == TODAY {
        return epoch_for_date(today);
    }

    Err(FlavourError::MalformedVersionSpec(version.to_string()))
}

/// Epoch configured by a version file on disk, resolving `today` with the local date.
///
/// # Errors
///
/// Returns `IoError` if the file cannot be read, otherwise see
/// [`epoch_from_version_spec`].
pub fn epoch_from_version_file(path: impl AsRef<Path>) -> FlavourResult<u32> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| FlavourError::IoError(path.to_path_buf(), e.to_string()))?;
    let epoch = epoch_from_version_spec(&content, Local::now().date_naive())?;
    debug!("Epoch {} from {}", epoch, path.display());
    Ok(epoch)
}
