//! Runtime configuration
//!
//! Resolved once from the environment:
//! - `SNAP_TRACKING_ROOT`: alternate filesystem root (default `/`)
//! - `SNAPD_DEBUG`: enable bus selection diagnostics
//! - `SNAP_TRACKING_CGROUP_HIERARCHY`: `unified`, `named-systemd` or `auto`

use std::path::PathBuf;

use crate::cgroups::HierarchyPolicy;

pub const ROOT_ENV: &str = "SNAP_TRACKING_ROOT";
pub const DEBUG_ENV: &str = "SNAPD_DEBUG";
pub const HIERARCHY_ENV: &str = "SNAP_TRACKING_CGROUP_HIERARCHY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingConfig {
    pub root_dir: PathBuf,
    pub debug: bool,
    pub hierarchy: HierarchyPolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("/"),
            debug: false,
            hierarchy: HierarchyPolicy::default(),
        }
    }
}

impl TrackingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(root) = lookup(ROOT_ENV).filter(|r| !r.is_empty()) {
            config.root_dir = PathBuf::from(root);
        }
        config.debug = lookup(DEBUG_ENV).is_some_and(|v| is_truthy(&v));

        if let Some(value) = lookup(HIERARCHY_ENV) {
            match value.parse() {
                Ok(policy) => config.hierarchy = policy,
                Err(e) => log::warn!("{}, using {:?}", e, config.hierarchy),
            }
        }
        config
    }

    pub fn features_dir(&self) -> PathBuf {
        self.root_dir.join("var/lib/snapd/features")
    }

    pub fn proc_root(&self) -> PathBuf {
        self.root_dir.join("proc")
    }

    pub fn cgroup_root(&self) -> PathBuf {
        self.root_dir.join("sys/fs/cgroup")
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
