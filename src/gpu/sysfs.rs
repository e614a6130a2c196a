//! Small sysfs read helpers for the DRM-based GPU backends.

use std::fs;
use std::path::{Path, PathBuf};

pub(crate) const DRM_ROOT: &str = "/sys/class/drm";

/// `cardN` directories only, not connector nodes like `card0-DP-1`.
pub(crate) fn is_card_dir(name: &str) -> bool {
    name.strip_prefix("card")
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

pub(crate) fn read_u64(path: &Path) -> Option<u64> {
    read_trimmed(path)?.parse().ok()
}

/// Device directories (`<card>/device`) of every DRM card under `root`,
/// sorted so probing is deterministic.
pub(crate) fn card_device_dirs(root: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };
    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| is_card_dir(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path().join("device"))
        .collect();
    dirs.sort();
    dirs
}

/// The hwmon directory a DRM device exposes, if any.
pub(crate) fn find_hwmon(device: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(device.join("hwmon")).ok()?;
    entries.flatten().map(|entry| entry.path()).find(|path| path.is_dir())
}
