//! Process shutdown.
//!
//! Runtime keybinds live in the compositor, not in this process, so they
//! survive an exit that skips destructors.  The daemon therefore waits on a
//! [`Shutdown`] for a termination signal (or a fatal source error) and
//! releases its shortcuts before exiting.

use log::{debug, info};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::io;
use std::os::raw::c_int;
use std::sync::mpsc::{self, Receiver, Sender};

/// Signals that stop the daemon.
pub const TERMINATION_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Why the daemon is stopping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A termination signal arrived.
    Signal(c_int),
    /// A long-running source stopped with an error.
    SourceFailed(String),
}

impl ShutdownReason {
    /// Process exit status for this reason.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShutdownReason::Signal(_) => 0,
            ShutdownReason::SourceFailed(_) => 1,
        }
    }
}

/// Collects shutdown requests from signal handlers and worker threads.
pub struct Shutdown {
    tx: Sender<ShutdownReason>,
    rx: Receiver<ShutdownReason>,
}

impl Default for Shutdown {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender that worker threads use to request shutdown.
    pub fn notifier(&self) -> Sender<ShutdownReason> {
        self.tx.clone()
    }

    /// Install handlers for `signals` and forward each delivery as
    /// [`ShutdownReason::Signal`] from a background thread.
    ///
    /// Once installed, the signals no longer terminate the process.
    pub fn watch_signals(&self, signals: &[c_int]) -> io::Result<()> {
        let mut signals = Signals::new(signals)?;
        let tx = self.tx.clone();
        std::thread::Builder::new()
            .name("hyprsnap-signals".into())
            .spawn(move || {
                for sig in signals.forever() {
                    debug!("received signal {}", sig);
                    if tx.send(ShutdownReason::Signal(sig)).is_err() {
                        break;
                    }
                }
            })?;
        Ok(())
    }

    /// Block until the first shutdown request.
    pub fn wait(&self) -> ShutdownReason {
        // `self` holds a sender, so the channel cannot disconnect.
        let reason = self
            .rx
            .recv()
            .unwrap_or_else(|_| ShutdownReason::SourceFailed("shutdown channel closed".into()));
        info!("shutting down: {:?}", reason);
        reason
    }
}
