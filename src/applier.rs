//! Applies an [`Action`] to whatever window currently has focus.
//!
//! [`WindowApplier`] holds no state between calls.  Each [`apply`] asks the
//! [`WindowControl`] for the focused window and the usable screen area,
//! computes the target with [`layout::calculate`], then sets the position
//! followed by the size.
//!
//! [`apply`]: WindowApplier::apply

use crate::action::Action;
use crate::layout::{self, Rect};
use crate::traits::WindowControl;
use log::debug;

/// Why an [`apply`](WindowApplier::apply) did not move a window.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    /// No window is focused, or the backend could not reach it.
    #[error("no focused window")]
    WindowUnavailable,
    /// The backend reported no usable screen.
    #[error("no usable screen")]
    ScreenUnavailable,
    /// The backend failed while querying or moving the window.
    #[error("window control error: {0}")]
    Surface(String),
}

impl ApplyError {
    /// `true` for the "nothing to act on" conditions, as opposed to a
    /// backend failure.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApplyError::WindowUnavailable | ApplyError::ScreenUnavailable)
    }
}

/// Thin adapter from [`Action`]s to [`WindowControl`] calls.
pub struct WindowApplier<W: WindowControl> {
    control: W,
}

impl<W: WindowControl> WindowApplier<W> {
    pub fn new(control: W) -> Self {
        Self { control }
    }

    /// The underlying backend.
    #[cfg(test)]
    pub fn control(&self) -> &W {
        &self.control
    }

    /// Move and resize the focused window according to `action`.
    ///
    /// Returns the rectangle that was applied.
    pub fn apply(&self, action: Action) -> Result<Rect, ApplyError> {
        let window = self
            .control
            .focused_window()
            .map_err(|e| ApplyError::Surface(e.to_string()))?
            .ok_or(ApplyError::WindowUnavailable)?;
        let screen = self
            .control
            .primary_screen_usable_rect()
            .map_err(|e| ApplyError::Surface(e.to_string()))?
            .ok_or(ApplyError::ScreenUnavailable)?;

        let target = layout::calculate(action, screen);
        debug!("{}: {:?} within {:?}", action, target, screen);

        // Position before size: some surfaces clamp a resize against the
        // current origin.
        self.control
            .set_position(&window, target.x, target.y)
            .map_err(|e| ApplyError::Surface(e.to_string()))?;
        self.control
            .set_size(&window, target.width, target.height)
            .map_err(|e| ApplyError::Surface(e.to_string()))?;

        Ok(target)
    }
}
