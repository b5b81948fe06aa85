//! Application process tracking
//!
//! [`Tracker::create_transient_scope_for_tracking`] moves the calling process
//! into a fresh `snap.<app>.<uuid>.scope` so that a later refresh can tell
//! whether the application is still running. The flow is:
//!
//! ```text
//! feature gate → uid/pid → scope name → bus → StartTransientUnit
//!                                         ↑            │ bus unusable, root, session bus
//!                                         └─ system ───┘ (once)
//!                                                      │ ok
//!                                              cgroup path check
//! ```
//!
//! Every internal failure collapses into [`TrackingError::CannotTrackProcess`].

use crate::cgroups::{CgroupPathAnalyzer, ProcCgroupAnalyzer};
use crate::config::TrackingConfig;
use crate::dbus::{
    do_create_transient_scope, session_or_maybe_system_bus, system_bus, BusOpener, ZbusOpener,
};
use crate::feature::FeatureFlag;
use crate::identity::{CallerIdentity, ProcessIdentity};
use crate::units::{last_segment, service_unit_name, RandomSource, ScopeUnitName, UuidSource};

/// Retries on the system bus after the session bus could not create the scope
pub const MAX_FALLBACK_RETRIES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TrackingError {
    #[error("cannot track application process")]
    CannotTrackProcess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BusChoice {
    SessionOrSystem,
    SystemOnly,
}

/// Establishes and confirms tracking of the calling process
pub struct Tracker {
    identity: Box<dyn CallerIdentity + Send>,
    random: Box<dyn RandomSource + Send>,
    buses: Box<dyn BusOpener + Send>,
    cgroups: Box<dyn CgroupPathAnalyzer + Send>,
    feature: FeatureFlag,
    debug: bool,
}

impl Tracker {
    /// Tracker wired to the real process, D-Bus and procfs
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            identity: Box::new(ProcessIdentity),
            random: Box::new(UuidSource),
            buses: Box::new(ZbusOpener),
            cgroups: Box::new(ProcCgroupAnalyzer::new(config.proc_root(), config.hierarchy)),
            feature: FeatureFlag::refresh_app_awareness(&config.features_dir()),
            debug: config.debug,
        }
    }

    pub fn with_identity(mut self, identity: impl CallerIdentity + Send + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    pub fn with_random_source(mut self, random: impl RandomSource + Send + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn with_bus_opener(mut self, buses: impl BusOpener + Send + 'static) -> Self {
        self.buses = Box::new(buses);
        self
    }

    pub fn with_cgroup_analyzer(mut self, cgroups: impl CgroupPathAnalyzer + Send + 'static) -> Self {
        self.cgroups = Box::new(cgroups);
        self
    }

    pub fn with_feature(mut self, feature: FeatureFlag) -> Self {
        self.feature = feature;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Place the calling process in a new transient scope and verify it landed there.
    ///
    /// A no-op when refresh app awareness is disabled.
    pub fn create_transient_scope_for_tracking(&self, app_id: &str) -> Result<(), TrackingError> {
        if !self.feature.is_enabled() {
            return Ok(());
        }

        let uid = self.identity.uid();
        let pid = self.identity.pid();
        let unit = ScopeUnitName::generate(app_id, self.random.as_ref());

        self.start_scope(uid, pid, &unit)?;

        let path = self.cgroups.path_for_process(pid).map_err(|e| {
            log::debug!("cannot read cgroup of pid {}: {}", pid, e);
            TrackingError::CannotTrackProcess
        })?;
        if last_segment(&path) != unit.as_str() {
            log::debug!("pid {} is in {} instead of {}", pid, path, unit);
            return Err(TrackingError::CannotTrackProcess);
        }

        log::debug!("tracking pid {} in {}", pid, unit);
        Ok(())
    }

    fn start_scope(&self, uid: u32, pid: u32, unit: &ScopeUnitName) -> Result<(), TrackingError> {
        let mut choice = BusChoice::SessionOrSystem;

        for attempt in 0..=MAX_FALLBACK_RETRIES {
            let opened = match choice {
                BusChoice::SessionOrSystem => {
                    session_or_maybe_system_bus(self.buses.as_ref(), uid, self.debug)
                }
                BusChoice::SystemOnly => system_bus(self.buses.as_ref(), self.debug),
            };
            let bus = opened.map_err(|e| {
                log::debug!("no bus to create scope {}: {}", unit, e);
                TrackingError::CannotTrackProcess
            })?;

            let err = match do_create_transient_scope(bus.connection(), unit.as_str(), pid) {
                Ok(()) => return Ok(()),
                Err(e) => e,
            };
            log::debug!("cannot create scope {} on {} bus: {}", unit, bus.kind(), err);

            if err.is_bus_unusable() && uid == 0 && bus.is_session() && attempt < MAX_FALLBACK_RETRIES
            {
                choice = BusChoice::SystemOnly;
                continue;
            }
            return Err(TrackingError::CannotTrackProcess);
        }
        Err(TrackingError::CannotTrackProcess)
    }

    /// Check that the calling process runs as the `snap.<app>.service` unit
    pub fn confirm_systemd_service_tracking(&self, app_id: &str) -> Result<(), TrackingError> {
        confirm_service_tracking(self.cgroups.as_ref(), self.identity.pid(), app_id)
    }

    /// cgroup path of the calling process
    pub fn own_cgroup_path(&self) -> Result<String, crate::cgroups::CgroupError> {
        self.cgroups.path_for_process(self.identity.pid())
    }
}

/// Check that `pid` runs inside the service unit of `app_id`
pub fn confirm_service_tracking(
    cgroups: &dyn CgroupPathAnalyzer,
    pid: u32,
    app_id: &str,
) -> Result<(), TrackingError> {
    let path = cgroups.path_for_process(pid).map_err(|e| {
        log::debug!("cannot read cgroup of pid {}: {}", pid, e);
        TrackingError::CannotTrackProcess
    })?;

    if last_segment(&path) == service_unit_name(app_id) {
        Ok(())
    } else {
        Err(TrackingError::CannotTrackProcess)
    }
}
