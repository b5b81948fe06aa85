//! cgroup v2 hierarchy scan
//!
//! Answers "is some other process of this snap still running" by looking for
//! tracking groups named `snap.<snap>.*` anywhere below the cgroup mount.

use std::path::Path;

use super::CgroupError;

/// Check whether any tracking group of `snap_name` exists besides `own_group`.
///
/// `own_group` is the caller's own cgroup path relative to `cgroup_root`
/// (as reported by [`super::CgroupPathAnalyzer`]); it is skipped. Directories
/// that cannot be read during the walk are reported as errors.
pub fn is_tracking_snap(
    cgroup_root: &Path,
    own_group: &str,
    snap_name: &str,
) -> Result<bool, CgroupError> {
    let pattern = format!(
        "{}/**/snap.{}.*",
        glob::Pattern::escape(&cgroup_root.to_string_lossy()),
        glob::Pattern::escape(snap_name)
    );
    let entries = glob::glob(&pattern).map_err(|e| CgroupError::Walk(e.to_string()))?;

    let own_group = own_group.trim_end_matches('/');
    for entry in entries {
        let path = entry.map_err(|e| CgroupError::Walk(e.to_string()))?;
        if !path.is_dir() {
            continue;
        }
        let Ok(relative) = path.strip_prefix(cgroup_root) else {
            continue;
        };
        let group = format!("/{}", relative.to_string_lossy());
        if group == own_group {
            log::debug!("skipping own group {}", group);
            continue;
        }
        log::debug!("found tracking group {} of snap {}", group, snap_name);
        return Ok(true);
    }
    Ok(false)
}
