//! **hyprsnap**: snap the focused window into preset layouts.
//!
//! Six layouts (left/right/top/bottom half, maximize, center) can be
//! requested from two independent places: global keyboard shortcuts and a
//! tiny HTTP endpoint (`POST /snap/{action}`).  Both feed one serialized
//! pipeline, so at most one window move is ever in flight.
//!
//! # Architecture
//!
//! ```text
//! shortcut press ─┐
//!                 ├─> DispatchHandle ─> Dispatcher ─> WindowApplier ─> WindowControl
//! HTTP request  ──┘
//! ```
//!
//! The crate is organised around three traits:
//!
//! * [`traits::WindowControl`]: queries and moves the focused window.
//! * [`traits::ShortcutSurface`]: registers system-wide key combinations.
//! * [`traits::ActionSource`]: anything that submits actions (the HTTP
//!   listener, the compositor's shortcut event stream, …).
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC) and
//! [`http`] (TCP request listener).

pub mod action;
pub mod applier;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod hyprland;
pub mod layout;
pub mod shortcuts;
pub mod shutdown;
pub mod traits;
