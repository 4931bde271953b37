//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowControl`](crate::traits::WindowControl) and
//! [`ShortcutSurface`](crate::traits::ShortcutSurface) traits, plus the
//! [`ActionSource`](crate::traits::ActionSource) that delivers shortcut
//! presses, all powered by Hyprland's IPC sockets.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod ipc;
pub mod shortcuts;
pub mod wm;
