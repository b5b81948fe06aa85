//! StartTransientUnit for tracking scopes
//!
//! Asks systemd to wrap an existing pid in a new scope unit and maps the
//! structured error reply onto [`ScopeError`].

use zbus::zvariant::Value;

use super::{BusConnection, CallError, RemoteError};

/// Job mode: refuse instead of queueing behind a conflicting job
pub const START_MODE: &str = "fail";

/// Wire body of `StartTransientUnit`: `(ssa(sv)a(sa(sv)))`
pub type StartTransientUnitBody<'a> = (
    &'a str,
    &'a str,
    Vec<(&'a str, Value<'a>)>,
    Vec<(&'a str, Vec<(&'a str, Value<'a>)>)>,
);

/// Parameters of a scope creation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientUnitRequest {
    pub name: String,
    pub mode: &'static str,
    pub pids: Vec<u32>,
}

impl TransientUnitRequest {
    /// Scope unit `name` containing exactly `pid`
    pub fn scope_for_pid(name: &str, pid: u32) -> Self {
        Self {
            name: name.to_string(),
            mode: START_MODE,
            pids: vec![pid],
        }
    }

    pub fn body(&self) -> StartTransientUnitBody<'_> {
        (
            self.name.as_str(),
            self.mode,
            vec![("PIDs", Value::from(self.pids.clone()))],
            Vec::new(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NameHasNoOwner,
    UnknownMethod,
    SpawnChildExited,
    UnitExists,
}

/// Remote error names with dedicated handling; anything else is generic
const ERROR_CLASSES: &[(&str, ErrorClass)] = &[
    ("org.freedesktop.DBus.Error.NameHasNoOwner", ErrorClass::NameHasNoOwner),
    ("org.freedesktop.DBus.Error.UnknownMethod", ErrorClass::UnknownMethod),
    ("org.freedesktop.DBus.Error.Spawn.ChildExited", ErrorClass::SpawnChildExited),
    ("org.freedesktop.systemd1.UnitExists", ErrorClass::UnitExists),
];

pub fn error_class(name: &str) -> Option<ErrorClass> {
    ERROR_CLASSES
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, class)| *class)
}

#[derive(Debug, thiserror::Error)]
pub enum ScopeError {
    /// Nobody owns org.freedesktop.systemd1 on this bus
    #[error("{}", .0.name)]
    NameHasNoOwner(RemoteError),

    /// systemd is too old to know StartTransientUnit
    #[error("org.freedesktop.DBus.Error.UnknownMethod")]
    UnknownMethod,

    /// Socket activation of the bus or of `systemd --user` failed
    #[error("org.freedesktop.DBus.Error.Spawn.ChildExited")]
    SpawnChildExited,

    #[error("cannot create transient scope: scope {unit:?} clashed: {remote}")]
    UnitExists { unit: String, remote: RemoteError },

    #[error("cannot create transient scope: {0}")]
    Remote(RemoteError),

    #[error("cannot create transient scope: {0}")]
    Transport(String),
}

impl ScopeError {
    /// The bus could not carry out the request at all; another bus might
    pub fn is_bus_unusable(&self) -> bool {
        matches!(
            self,
            Self::NameHasNoOwner(_) | Self::UnknownMethod | Self::SpawnChildExited
        )
    }
}

/// Map a structured error reply for `unit_name` onto [`ScopeError`]
pub fn classify(remote: RemoteError, unit_name: &str) -> ScopeError {
    match error_class(&remote.name) {
        Some(ErrorClass::NameHasNoOwner) => ScopeError::NameHasNoOwner(remote),
        Some(ErrorClass::UnknownMethod) => ScopeError::UnknownMethod,
        Some(ErrorClass::SpawnChildExited) => ScopeError::SpawnChildExited,
        Some(ErrorClass::UnitExists) => ScopeError::UnitExists {
            unit: unit_name.to_string(),
            remote,
        },
        None => ScopeError::Remote(remote),
    }
}

/// Create transient scope `unit_name` holding `pid`. No retries.
pub fn do_create_transient_scope(
    conn: &dyn BusConnection,
    unit_name: &str,
    pid: u32,
) -> Result<(), ScopeError> {
    let request = TransientUnitRequest::scope_for_pid(unit_name, pid);
    match conn.start_transient_unit(&request) {
        Ok(job) => {
            log::debug!("requested scope {} for pid {} as job {}", unit_name, pid, job);
            Ok(())
        }
        Err(CallError::Remote(remote)) => Err(classify(remote, unit_name)),
        Err(CallError::Transport(msg)) => Err(ScopeError::Transport(msg)),
    }
}
