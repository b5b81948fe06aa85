//! Session or system bus selection
//!
//! Unprivileged callers only ever talk to their session bus. Root may be
//! running without a session bus (e.g. from a service or over sudo), so it
//! falls back to the system bus.

use std::fmt;

use super::{BusConnection, BusError, BusKind, BusOpener};

/// Trace line emitted only when diagnostics are enabled
macro_rules! trace_bus {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            log::debug!($($arg)+);
        }
    };
}

/// An open connection and the bus it belongs to.
///
/// Owned by the call that opened it; the connection closes when this drops.
pub struct BusHandle {
    kind: BusKind,
    connection: Box<dyn BusConnection>,
}

impl BusHandle {
    pub fn new(kind: BusKind, connection: Box<dyn BusConnection>) -> Self {
        Self { kind, connection }
    }

    pub fn kind(&self) -> BusKind {
        self.kind
    }

    pub fn is_session(&self) -> bool {
        self.kind == BusKind::Session
    }

    pub fn connection(&self) -> &dyn BusConnection {
        self.connection.as_ref()
    }
}

impl fmt::Debug for BusHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusHandle").field("kind", &self.kind).finish()
    }
}

/// Open the session bus, falling back to the system bus for root.
///
/// Non-root callers get the session bus error back unchanged.
pub fn session_or_maybe_system_bus(
    opener: &dyn BusOpener,
    uid: u32,
    debug: bool,
) -> Result<BusHandle, BusError> {
    let err = match opener.open(BusKind::Session) {
        Ok(conn) => return Ok(BusHandle::new(BusKind::Session, conn)),
        Err(e) => e,
    };

    trace_bus!(debug, "session bus is not available: {}", err);
    if uid != 0 {
        return Err(err);
    }

    trace_bus!(debug, "falling back to system bus");
    let handle = system_bus(opener, debug)?;
    trace_bus!(debug, "using system bus now, session bus was not available");
    Ok(handle)
}

/// Open the system bus
pub fn system_bus(opener: &dyn BusOpener, debug: bool) -> Result<BusHandle, BusError> {
    match opener.open(BusKind::System) {
        Ok(conn) => Ok(BusHandle::new(BusKind::System, conn)),
        Err(e) => {
            trace_bus!(debug, "system bus is not available: {}", e);
            Err(e)
        }
    }
}
