mod cgroup;
mod track;

pub use cgroup::{cgroup, is_tracking};
pub use track::{confirm_service, track};
