//! Establish or confirm tracking of this process

use snap_tracking::{Tracker, TrackingConfig};

pub fn track(config: &TrackingConfig, app: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = Tracker::new(config);
    tracker.create_transient_scope_for_tracking(app)?;
    log::info!("{} is tracked", app);
    Ok(())
}

pub fn confirm_service(config: &TrackingConfig, app: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = Tracker::new(config);
    tracker.confirm_systemd_service_tracking(app)?;
    log::info!("{} is tracked as a systemd service", app);
    Ok(())
}
