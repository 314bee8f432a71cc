use crate::error::{ModemError, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Lifecycle of a playback or capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SessionState::Running,
            2 => SessionState::Stopping,
            _ => SessionState::Idle,
        }
    }
}

/// Shared start/stop switch for an audio loop
///
/// Clones share one state. The loop owner calls [`start`](Self::start),
/// polls [`is_running`](Self::is_running) between buffers and calls
/// [`finish`](Self::finish) on exit; any other holder (a signal handler, a
/// UI thread) may call [`request_stop`](Self::request_stop).
#[derive(Debug, Clone, Default)]
pub struct SessionControl {
    state: Arc<AtomicU8>,
}

impl SessionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Idle -> Running; fails if a session is already active or stopping
    pub fn start(&self) -> Result<()> {
        self.state
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| ModemError::SessionBusy)
    }

    /// Running -> Stopping; returns false if nothing was running
    pub fn request_stop(&self) -> bool {
        self.state
            .compare_exchange(
                SessionState::Running as u8,
                SessionState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Back to Idle once the loop has wound down
    pub fn finish(&self) {
        self.state.store(SessionState::Idle as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_lifecycle() {
        let control = SessionControl::new();
        assert_eq!(control.state(), SessionState::Idle);

        control.start().unwrap();
        assert!(control.is_running());

        assert!(control.request_stop());
        assert_eq!(control.state(), SessionState::Stopping);
        assert!(!control.is_running());

        control.finish();
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_double_start_rejected() {
        let control = SessionControl::new();
        control.start().unwrap();
        assert!(matches!(control.start(), Err(ModemError::SessionBusy)));

        control.request_stop();
        // still winding down
        assert!(control.start().is_err());
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let control = SessionControl::new();
        assert!(!control.request_stop());
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_stop_from_other_thread() {
        let control = SessionControl::new();
        control.start().unwrap();

        let remote = control.clone();
        thread::spawn(move || {
            remote.request_stop();
        })
        .join()
        .unwrap();

        assert_eq!(control.state(), SessionState::Stopping);
    }
}
