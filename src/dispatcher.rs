//! The serialization point between action sources and the window.
//!
//! Shortcut events and HTTP requests both end up in [`DispatchHandle::submit`],
//! which pushes onto a bounded queue without ever blocking.  A single
//! [`Dispatcher`] drains that queue and calls the [`WindowApplier`] one
//! action at a time, in arrival order.

use crate::action::Action;
use crate::applier::WindowApplier;
use crate::traits::WindowControl;
use log::{debug, error, info, warn};
use std::sync::mpsc;
use std::thread;

/// Default number of actions that may wait while an apply is in flight.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

/// Why an action was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("action queue is full")]
    QueueFull,
    #[error("dispatcher has stopped")]
    Closed,
}

/// Cloneable, thread-safe entry point into the action queue.
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: mpsc::SyncSender<Action>,
}

impl DispatchHandle {
    /// Enqueue `action`.  Never blocks: a full queue is an error, not a wait.
    pub fn submit(&self, action: Action) -> Result<(), DispatchError> {
        self.tx.try_send(action).map_err(|e| match e {
            mpsc::TrySendError::Full(_) => DispatchError::QueueFull,
            mpsc::TrySendError::Disconnected(_) => DispatchError::Closed,
        })
    }
}

/// Create a bare action queue.
///
/// [`Dispatcher::new`] uses this internally; it is public so that sources
/// can be exercised against a plain receiver.
pub fn queue(capacity: usize) -> (DispatchHandle, mpsc::Receiver<Action>) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    (DispatchHandle { tx }, rx)
}

/// Owns the [`WindowApplier`] and runs every queued action through it.
pub struct Dispatcher<W: WindowControl> {
    applier: WindowApplier<W>,
    rx: mpsc::Receiver<Action>,
}

impl<W: WindowControl> Dispatcher<W> {
    /// Create a dispatcher with room for `capacity` pending actions.
    pub fn new(applier: WindowApplier<W>, capacity: usize) -> (Self, DispatchHandle) {
        let (handle, rx) = queue(capacity);
        (Self { applier, rx }, handle)
    }

    /// Apply queued actions until every [`DispatchHandle`] is dropped.
    ///
    /// Failures are logged and never stop the loop.
    pub fn run(self) {
        info!("dispatcher running");
        for action in self.rx.iter() {
            debug!("applying {}", action);
            match self.applier.apply(action) {
                Ok(rect) => info!(
                    "{}: window at {:.0},{:.0} size {:.0}x{:.0}",
                    action, rect.x, rect.y, rect.width, rect.height
                ),
                Err(e) if e.is_unavailable() => warn!("{}: {}", action, e),
                Err(e) => error!("{}: {}", action, e),
            }
        }
        info!("all action sources closed, dispatcher exiting");
    }
}

impl<W> Dispatcher<W>
where
    W: WindowControl + Send + 'static,
{
    /// Run the dispatcher on its own thread.
    pub fn spawn(self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("hyprsnap-dispatch".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Backend that records applied positions and detects overlapping
    /// applies.
    #[derive(Debug, Default, Clone)]
    struct OverlapControl {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
        positions: Arc<Mutex<Vec<(f64, f64)>>>,
        sizes: Arc<AtomicUsize>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("overlap error")]
    struct OverlapErr;

    impl WindowControl for OverlapControl {
        type Window = ();
        type Error = OverlapErr;

        fn focused_window(&self) -> Result<Option<()>, OverlapErr> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            Ok(Some(()))
        }

        fn primary_screen_usable_rect(&self) -> Result<Option<Rect>, OverlapErr> {
            Ok(Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)))
        }

        fn set_position(&self, _: &(), x: f64, y: f64) -> Result<(), OverlapErr> {
            std::thread::sleep(Duration::from_millis(2));
            self.positions.lock().unwrap().push((x, y));
            Ok(())
        }

        fn set_size(&self, _: &(), _: f64, _: f64) -> Result<(), OverlapErr> {
            self.sizes.fetch_add(1, Ordering::SeqCst);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn concurrent_submissions_never_overlap() {
        let control = OverlapControl::default();
        let (dispatcher, handle) = Dispatcher::new(WindowApplier::new(control.clone()), 64);
        let worker = dispatcher.spawn().unwrap();

        let submitters: Vec<_> = (0..8)
            .map(|i| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for j in 0..4 {
                        let action = Action::ALL[(i + j) % Action::ALL.len()];
                        handle.submit(action).unwrap();
                    }
                })
            })
            .collect();
        for s in submitters {
            s.join().unwrap();
        }
        drop(handle);
        worker.join().unwrap();

        assert_eq!(control.sizes.load(Ordering::SeqCst), 32);
        assert_eq!(control.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn actions_apply_in_arrival_order() {
        let control = OverlapControl::default();
        let (dispatcher, handle) = Dispatcher::new(WindowApplier::new(control.clone()), 8);

        handle.submit(Action::RightHalf).unwrap();
        handle.submit(Action::BottomHalf).unwrap();
        handle.submit(Action::LeftHalf).unwrap();
        drop(handle);
        dispatcher.run();

        assert_eq!(
            *control.positions.lock().unwrap(),
            vec![(500.0, 0.0), (0.0, 500.0), (0.0, 0.0)]
        );
    }

    /// Backend with no focused window on its first query.
    #[derive(Debug, Default, Clone)]
    struct FlakyFocus {
        queries: Arc<AtomicUsize>,
        positions: Arc<Mutex<Vec<(f64, f64)>>>,
    }

    impl WindowControl for FlakyFocus {
        type Window = ();
        type Error = OverlapErr;

        fn focused_window(&self) -> Result<Option<()>, OverlapErr> {
            let n = self.queries.fetch_add(1, Ordering::SeqCst);
            Ok(if n == 0 { None } else { Some(()) })
        }

        fn primary_screen_usable_rect(&self) -> Result<Option<Rect>, OverlapErr> {
            Ok(Some(Rect::new(0.0, 0.0, 1000.0, 1000.0)))
        }

        fn set_position(&self, _: &(), x: f64, y: f64) -> Result<(), OverlapErr> {
            self.positions.lock().unwrap().push((x, y));
            Ok(())
        }

        fn set_size(&self, _: &(), _: f64, _: f64) -> Result<(), OverlapErr> {
            Ok(())
        }
    }

    #[test]
    fn keeps_serving_after_missing_window() {
        let control = FlakyFocus::default();
        let (dispatcher, handle) = Dispatcher::new(WindowApplier::new(control.clone()), 8);
        let worker = dispatcher.spawn().unwrap();

        handle.submit(Action::LeftHalf).unwrap();
        handle.submit(Action::RightHalf).unwrap();
        handle.submit(Action::TopHalf).unwrap();
        drop(handle);
        worker.join().unwrap();

        assert_eq!(control.queries.load(Ordering::SeqCst), 3);
        assert_eq!(
            *control.positions.lock().unwrap(),
            vec![(500.0, 0.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let (handle, _rx) = queue(2);
        handle.submit(Action::LeftHalf).unwrap();
        handle.submit(Action::RightHalf).unwrap();
        assert_eq!(handle.submit(Action::Maximize), Err(DispatchError::QueueFull));
    }

    #[test]
    fn stopped_dispatcher_reports_closed() {
        let (handle, rx) = queue(2);
        drop(rx);
        assert_eq!(handle.submit(Action::Centered), Err(DispatchError::Closed));
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let (handle, rx) = queue(0);
        handle.submit(Action::TopHalf).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Action::TopHalf);
    }
}
