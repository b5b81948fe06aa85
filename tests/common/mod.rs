//! Test doubles for the tracker's capabilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use snap_tracking::cgroups::{CgroupError, CgroupPathAnalyzer};
use snap_tracking::dbus::{
    BusConnection, BusError, BusKind, BusOpener, CallError, RemoteError, TransientUnitRequest,
};
use snap_tracking::units::RandomSource;

pub const UUID: &str = "cc98cd01-6a25-46bd-b71b-82069b71b770";
pub const PID: u32 = 312123;

pub const SPAWN_CHILD_EXITED: &str = "org.freedesktop.DBus.Error.Spawn.ChildExited";
pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
pub const NAME_HAS_NO_OWNER: &str = "org.freedesktop.DBus.Error.NameHasNoOwner";
pub const UNIT_EXISTS: &str = "org.freedesktop.systemd1.UnitExists";

pub fn scope_name() -> String {
    format!("snap.pkg.app.{}.scope", UUID)
}

pub struct PinnedRandom(pub &'static str);

impl RandomSource for PinnedRandom {
    fn random_id(&self) -> String {
        self.0.to_string()
    }
}

/// Canned reply to one StartTransientUnit call
pub enum Reply {
    Ok,
    Remote(&'static str),
    Transport(&'static str),
}

#[derive(Default)]
pub struct BusState {
    pub session_available: bool,
    pub system_available: bool,
    pub replies: VecDeque<Reply>,
    pub opened: Vec<BusKind>,
    pub calls: Vec<(BusKind, TransientUnitRequest)>,
    /// Connections handed out and not yet dropped
    pub live: usize,
}

#[derive(Clone, Default)]
pub struct MockBuses(pub Arc<Mutex<BusState>>);

impl MockBuses {
    pub fn new(session_available: bool, system_available: bool) -> Self {
        Self(Arc::new(Mutex::new(BusState {
            session_available,
            system_available,
            ..Default::default()
        })))
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.0.lock().unwrap().replies.push_back(reply);
        self
    }

    pub fn opened(&self) -> Vec<BusKind> {
        self.0.lock().unwrap().opened.clone()
    }

    pub fn call_buses(&self) -> Vec<BusKind> {
        self.0.lock().unwrap().calls.iter().map(|(kind, _)| *kind).collect()
    }

    pub fn requests(&self) -> Vec<TransientUnitRequest> {
        self.0.lock().unwrap().calls.iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn live(&self) -> usize {
        self.0.lock().unwrap().live
    }
}

impl BusOpener for MockBuses {
    fn open(&self, kind: BusKind) -> Result<Box<dyn BusConnection>, BusError> {
        let mut state = self.0.lock().unwrap();
        state.opened.push(kind);
        let available = match kind {
            BusKind::Session => state.session_available,
            BusKind::System => state.system_available,
        };
        if !available {
            return Err(BusError::Unavailable(format!(
                "{} bus unavailable for testing",
                kind
            )));
        }
        state.live += 1;
        Ok(Box::new(MockConnection {
            kind,
            state: self.0.clone(),
        }))
    }
}

struct MockConnection {
    kind: BusKind,
    state: Arc<Mutex<BusState>>,
}

impl BusConnection for MockConnection {
    fn start_transient_unit(&self, request: &TransientUnitRequest) -> Result<String, CallError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((self.kind, request.clone()));
        match state.replies.pop_front() {
            Some(Reply::Ok) => Ok("/org/freedesktop/systemd1/job/1462".to_string()),
            Some(Reply::Remote(name)) => Err(CallError::Remote(RemoteError::new(name))),
            Some(Reply::Transport(msg)) => Err(CallError::Transport(msg.to_string())),
            None => panic!("unexpected StartTransientUnit call #{}", state.calls.len()),
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.live -= 1;
        }
    }
}

/// cgroup analyzer returning a fixed path and recording lookups
#[derive(Clone)]
pub struct MockCgroups {
    path: Option<String>,
    pub lookups: Arc<Mutex<Vec<u32>>>,
}

impl MockCgroups {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            lookups: Arc::default(),
        }
    }

    /// Process vanished before the lookup
    pub fn gone() -> Self {
        Self {
            path: None,
            lookups: Arc::default(),
        }
    }

    pub fn lookups(&self) -> Vec<u32> {
        self.lookups.lock().unwrap().clone()
    }
}

impl CgroupPathAnalyzer for MockCgroups {
    fn path_for_process(&self, pid: u32) -> Result<String, CgroupError> {
        self.lookups.lock().unwrap().push(pid);
        self.path.clone().ok_or(CgroupError::NoSuchProcess(pid))
    }
}

thread_local! {
    static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Records log lines per test thread
struct CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let line = format!("{}: {}", record.level(), record.args());
        CAPTURED.with(|lines| lines.borrow_mut().push(line));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

/// Start capturing log lines emitted on the current thread
pub fn capture_logs() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(log::LevelFilter::Debug);
    });
    CAPTURED.with(|lines| lines.borrow_mut().clear());
}

pub fn captured_logs() -> Vec<String> {
    CAPTURED.with(|lines| lines.borrow().clone())
}
