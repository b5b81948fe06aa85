//! Cgroup membership discovery
//!
//! The kernel reports the groups of a process in `/proc/<pid>/cgroup`, one
//! line per hierarchy:
//!
//! ```text
//! 12:name=systemd:/user.slice/user-1000.slice/user@1000.service/app.slice
//! 0::/user.slice/user-1000.slice/user@1000.service/snap.pkg.app.<uuid>.scope
//! ```
//!
//! Which line is authoritative depends on how the host mounts cgroups, so the
//! extraction rule is a [`HierarchyPolicy`] rather than a fixed parser.

pub mod hierarchy;

pub use hierarchy::is_tracking_snap;

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

/// Reports the cgroup membership path of a process
pub trait CgroupPathAnalyzer {
    fn path_for_process(&self, pid: u32) -> Result<String, CgroupError>;
}

/// Which entry of the membership record carries the tracking path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HierarchyPolicy {
    /// cgroup v2 unified hierarchy (`0::<path>`)
    Unified,
    /// cgroup v1 named systemd hierarchy (`N:name=systemd:<path>`)
    NamedSystemd,
    /// Unified entry if present, named systemd entry otherwise
    #[default]
    Auto,
}

impl HierarchyPolicy {
    fn describe(self) -> &'static str {
        match self {
            Self::Unified => "unified",
            Self::NamedSystemd => "name=systemd",
            Self::Auto => "unified or name=systemd",
        }
    }
}

impl FromStr for HierarchyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unified" => Ok(Self::Unified),
            "named-systemd" => Ok(Self::NamedSystemd),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown cgroup hierarchy policy: {}", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CgroupError {
    #[error("process {0} does not exist")]
    NoSuchProcess(u32),

    #[error("cannot read cgroup membership of process {pid}: {source}")]
    Read {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("no {hierarchy} entry in cgroup membership of process {pid}")]
    EntryNotFound { pid: u32, hierarchy: &'static str },

    #[error("unexpected content of group entry {0}")]
    MalformedEntry(String),

    #[error("cannot walk cgroup hierarchy: {0}")]
    Walk(String),
}

/// Reads membership records from a procfs mount
#[derive(Debug, Clone)]
pub struct ProcCgroupAnalyzer {
    proc_root: PathBuf,
    policy: HierarchyPolicy,
}

impl ProcCgroupAnalyzer {
    pub fn new(proc_root: impl Into<PathBuf>, policy: HierarchyPolicy) -> Self {
        Self {
            proc_root: proc_root.into(),
            policy,
        }
    }

    fn record_path(&self, pid: u32) -> PathBuf {
        self.proc_root.join(pid.to_string()).join("cgroup")
    }
}

impl Default for ProcCgroupAnalyzer {
    fn default() -> Self {
        Self::new("/proc", HierarchyPolicy::default())
    }
}

impl CgroupPathAnalyzer for ProcCgroupAnalyzer {
    fn path_for_process(&self, pid: u32) -> Result<String, CgroupError> {
        let content = std::fs::read_to_string(self.record_path(pid)).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                CgroupError::NoSuchProcess(pid)
            } else {
                CgroupError::Read { pid, source: e }
            }
        })?;

        let path = parse_membership(&content, self.policy)?.ok_or(CgroupError::EntryNotFound {
            pid,
            hierarchy: self.policy.describe(),
        })?;
        log::debug!("process {} is in cgroup {}", pid, path);
        Ok(path)
    }
}

/// Extract the tracking path from a membership record.
///
/// Returns `Ok(None)` when no line matches the policy. The first matching
/// line wins.
pub fn parse_membership(
    content: &str,
    policy: HierarchyPolicy,
) -> Result<Option<String>, CgroupError> {
    match policy {
        HierarchyPolicy::Unified => find_entry(content, Entry::Unified),
        HierarchyPolicy::NamedSystemd => find_entry(content, Entry::NamedSystemd),
        HierarchyPolicy::Auto => match find_entry(content, Entry::Unified)? {
            Some(path) => Ok(Some(path)),
            None => find_entry(content, Entry::NamedSystemd),
        },
    }
}

#[derive(Clone, Copy)]
enum Entry {
    Unified,
    NamedSystemd,
}

fn find_entry(content: &str, entry: Entry) -> Result<Option<String>, CgroupError> {
    for line in content.lines() {
        let mut fields = line.splitn(3, ':');
        let (Some(id), Some(controllers), Some(path)) = (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        let matches = match entry {
            Entry::Unified => id == "0" && controllers.is_empty(),
            Entry::NamedSystemd => controllers == "name=systemd",
        };
        if !matches {
            continue;
        }

        if path.is_empty() {
            return Err(CgroupError::MalformedEntry(format!("{}:{}:", id, controllers)));
        }
        return Ok(Some(normalize(path)));
    }
    Ok(None)
}

fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}
