//! Inspect cgroup membership

use snap_tracking::cgroups::{self, CgroupPathAnalyzer, ProcCgroupAnalyzer};
use snap_tracking::{Tracker, TrackingConfig};

pub fn cgroup(config: &TrackingConfig, pid: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let path = match pid {
        Some(pid) => {
            ProcCgroupAnalyzer::new(config.proc_root(), config.hierarchy).path_for_process(pid)?
        }
        None => Tracker::new(config).own_cgroup_path()?,
    };
    println!("{}", path);
    Ok(())
}

/// Print whether another group of `snap` is tracked and return the answer
pub fn is_tracking(config: &TrackingConfig, snap: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let own = Tracker::new(config).own_cgroup_path()?;
    let tracking = cgroups::is_tracking_snap(&config.cgroup_root(), &own, snap)?;

    println!("{}", if tracking { "yes" } else { "no" });
    Ok(tracking)
}
