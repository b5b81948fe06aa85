//! Tracking unit names
//!
//! Two naming conventions identify a snap application in the cgroup tree:
//! - `snap.<app>.<random-id>.scope` for transient scopes created at launch
//! - `snap.<app>.service` for applications started as systemd services

use std::fmt;

/// Source of the random component of a scope name
pub trait RandomSource {
    /// Return a fresh identifier. Must never repeat across calls.
    fn random_id(&self) -> String;
}

/// Random version 4 UUIDs in canonical hyphenated form
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl RandomSource for UuidSource {
    fn random_id(&self) -> String {
        uuid::Uuid::new_v4().hyphenated().to_string()
    }
}

/// Name of a transient scope unit, e.g. `snap.pkg.app.<uuid>.scope`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeUnitName(String);

impl ScopeUnitName {
    /// Generate a new scope name for `app_id` with a freshly drawn random id
    pub fn generate(app_id: &str, random: &dyn RandomSource) -> Self {
        Self(format!("snap.{}.{}.scope", app_id, random.random_id()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopeUnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ScopeUnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name of the service unit an application runs under when started by systemd
pub fn service_unit_name(app_id: &str) -> String {
    format!("snap.{}.service", app_id)
}

/// Final segment of a slash-separated cgroup path
pub fn last_segment(cgroup_path: &str) -> &str {
    let trimmed = cgroup_path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
