//! D-Bus access to the systemd manager
//!
//! Two capabilities are all the tracker needs from D-Bus:
//! - [`BusOpener`]: open a connection to the session or system bus
//! - [`BusConnection`]: issue a blocking StartTransientUnit call
//!
//! Real implementations are backed by `zbus::blocking`; tests substitute
//! their own.

pub mod selector;
pub mod transient;

pub use selector::{session_or_maybe_system_bus, system_bus, BusHandle};
pub use transient::{do_create_transient_scope, ScopeError, TransientUnitRequest};

use std::fmt;

use zbus::zvariant::OwnedObjectPath;

pub const SYSTEMD_DESTINATION: &str = "org.freedesktop.systemd1";
pub const SYSTEMD_PATH: &str = "/org/freedesktop/systemd1";
pub const MANAGER_INTERFACE: &str = "org.freedesktop.systemd1.Manager";

/// Which message bus a connection talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    Session,
    System,
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session => f.write_str("session"),
            Self::System => f.write_str("system"),
        }
    }
}

/// Structured error reply: symbolic name plus argument list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("DBus error {name:?}: {args:?}")]
pub struct RemoteError {
    pub name: String,
    pub args: Vec<String>,
}

impl RemoteError {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// Failure of a single method call
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("{}", .0.name)]
    Remote(RemoteError),

    #[error("{0}")]
    Transport(String),
}

impl From<zbus::Error> for CallError {
    fn from(e: zbus::Error) -> Self {
        use zbus::DBusError;

        match e {
            zbus::Error::MethodError(name, detail, _) => Self::Remote(RemoteError {
                name: name.to_string(),
                args: detail.into_iter().collect(),
            }),
            zbus::Error::FDO(fdo) => Self::Remote(RemoteError {
                name: fdo.name().to_string(),
                args: fdo.description().map(str::to_string).into_iter().collect(),
            }),
            other => Self::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error(transparent)]
    Zbus(#[from] zbus::Error),

    #[error("{0}")]
    Unavailable(String),
}

/// An open bus connection. Dropping it closes the connection.
pub trait BusConnection {
    /// Call `StartTransientUnit` and block for the reply, returning the job path
    fn start_transient_unit(&self, request: &TransientUnitRequest) -> Result<String, CallError>;
}

/// Opens bus connections
pub trait BusOpener {
    fn open(&self, kind: BusKind) -> Result<Box<dyn BusConnection>, BusError>;
}

/// Connection backed by `zbus::blocking`
pub struct ZbusConnection {
    conn: zbus::blocking::Connection,
}

impl BusConnection for ZbusConnection {
    fn start_transient_unit(&self, request: &TransientUnitRequest) -> Result<String, CallError> {
        let reply = self.conn.call_method(
            Some(SYSTEMD_DESTINATION),
            SYSTEMD_PATH,
            Some(MANAGER_INTERFACE),
            "StartTransientUnit",
            &request.body(),
        )?;
        let body = reply.body();
        let job: OwnedObjectPath = body.deserialize()?;
        Ok(job.as_str().to_string())
    }
}

/// Opens real session and system bus connections
#[derive(Debug, Default, Clone, Copy)]
pub struct ZbusOpener;

impl BusOpener for ZbusOpener {
    fn open(&self, kind: BusKind) -> Result<Box<dyn BusConnection>, BusError> {
        let conn = match kind {
            BusKind::Session => zbus::blocking::Connection::session()?,
            BusKind::System => zbus::blocking::Connection::system()?,
        };
        Ok(Box::new(ZbusConnection { conn }))
    }
}
