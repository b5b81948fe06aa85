//! Feature gate for refresh app awareness
//!
//! The feature is switched on by dropping a marker file into the features
//! directory. Nothing here creates or removes the marker.

use std::path::{Path, PathBuf};

/// Name of the control marker inside the features directory
pub const REFRESH_APP_AWARENESS: &str = "refresh-app-awareness";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureFlag {
    Fixed(bool),
    /// Enabled while the marker file exists
    ControlFile(PathBuf),
}

impl FeatureFlag {
    /// Refresh app awareness, controlled by a marker in `features_dir`
    pub fn refresh_app_awareness(features_dir: &Path) -> Self {
        Self::ControlFile(features_dir.join(REFRESH_APP_AWARENESS))
    }

    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Fixed(enabled) => *enabled,
            Self::ControlFile(path) => path.exists(),
        }
    }
}
