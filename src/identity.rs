//! Caller identity
//!
//! The tracker only needs two facts about the calling process: who runs it
//! (root may fall back to the system bus) and which pid goes into the scope.

/// Reports the user id and process id of the caller
pub trait CallerIdentity {
    fn uid(&self) -> u32;
    fn pid(&self) -> u32;
}

/// Identity of the current process as reported by the kernel
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessIdentity;

impl CallerIdentity for ProcessIdentity {
    fn uid(&self) -> u32 {
        nix::unistd::getuid().as_raw()
    }

    fn pid(&self) -> u32 {
        std::process::id()
    }
}

/// Fixed identity, used when the caller wants to pin uid and pid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIdentity {
    pub uid: u32,
    pub pid: u32,
}

impl CallerIdentity for StaticIdentity {
    fn uid(&self) -> u32 {
        self.uid
    }

    fn pid(&self) -> u32 {
        self.pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_identity_matches_kernel() {
        let id = ProcessIdentity;
        assert_eq!(id.pid(), std::process::id());
        assert_eq!(id.uid(), nix::unistd::getuid().as_raw());
    }

    #[test]
    fn test_static_identity() {
        let id = StaticIdentity { uid: 12345, pid: 312123 };
        assert_eq!(id.uid(), 12345);
        assert_eq!(id.pid(), 312123);
    }
}
