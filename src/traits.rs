//! Core traits that decouple hyprsnap from any specific compositor or
//! transport.
//!
//! The [`WindowApplier`](crate::applier::WindowApplier) only talks to a
//! [`WindowControl`]; the [`ShortcutRegistry`](crate::shortcuts::ShortcutRegistry)
//! only talks to a [`ShortcutSurface`].  Hyprland implementations live in
//! [`hyprland`](crate::hyprland); tests use recording doubles.

use crate::dispatcher::DispatchHandle;
use crate::layout::Rect;
use crate::shortcuts::{KeyCombo, ShortcutId};

/// Abstraction over whatever can query and move the focused window.
///
/// Absence is not an error: `Ok(None)` from [`focused_window`] or
/// [`primary_screen_usable_rect`] means "nothing to act on right now"
/// (no window focused, no output, no compositor connection).
///
/// [`focused_window`]: WindowControl::focused_window
/// [`primary_screen_usable_rect`]: WindowControl::primary_screen_usable_rect
pub trait WindowControl {
    /// Backend-specific handle to a window.
    type Window;

    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// The currently focused window, if any.
    fn focused_window(&self) -> Result<Option<Self::Window>, Self::Error>;

    /// The usable area (excluding bars and other reserved space) of the
    /// screen that layouts are computed against.
    fn primary_screen_usable_rect(&self) -> Result<Option<Rect>, Self::Error>;

    /// Move `window` so its top-left corner lands at `(x, y)`.
    fn set_position(&self, window: &Self::Window, x: f64, y: f64) -> Result<(), Self::Error>;

    /// Resize `window` to `width × height`.
    fn set_size(&self, window: &Self::Window, width: f64, height: f64) -> Result<(), Self::Error>;
}

/// Abstraction over a system-wide keyboard shortcut facility.
///
/// The surface only registers and releases combinations.  Delivery of a
/// pressed combination happens out of band: the backend reports the
/// [`ShortcutId`] it issued here to a
/// [`ShortcutTrigger`](crate::shortcuts::ShortcutTrigger).
pub trait ShortcutSurface {
    /// The error type produced by this surface.
    type Error: std::error::Error + Send + 'static;

    /// Start intercepting `combo`.  On success returns a fresh identifier,
    /// unique for the lifetime of the process.
    fn register(&mut self, combo: &KeyCombo) -> Result<ShortcutId, Self::Error>;

    /// Stop intercepting the combination registered under `id`.
    fn unregister(&mut self, id: ShortcutId) -> Result<(), Self::Error>;
}

/// A source of [`Action`](crate::action::Action) requests.
///
/// Implementations listen on some transport (a TCP socket, the
/// compositor's event stream, …) and submit every recognised action
/// through the provided [`DispatchHandle`].
///
/// # Contract
///
/// * [`run`](ActionSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait ActionSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and submit every incoming action into `sink`.
    fn run(&mut self, sink: DispatchHandle) -> Result<(), Self::Error>;
}
