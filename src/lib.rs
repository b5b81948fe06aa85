//! snap-tracking - track running snap applications in systemd scopes
//!
//! At launch an application asks systemd (over D-Bus) to wrap its pid in a
//! transient scope named after the application, then checks the kernel's
//! cgroup record to confirm it really moved there. A package manager can later
//! look for those groups before refreshing the package.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    Tracker                       │
//! ├─────────────────────────────────────────────────┤
//! │ Identity │ Unit names │ D-Bus (selector, scope)  │
//! ├─────────────────────────────────────────────────┤
//! │          Cgroup membership + hierarchy           │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod cgroups;
pub mod config;
pub mod dbus;
pub mod feature;
pub mod identity;
pub mod tracking;
pub mod units;

pub use config::TrackingConfig;
pub use feature::FeatureFlag;
pub use tracking::{Tracker, TrackingError};
