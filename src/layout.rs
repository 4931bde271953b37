//! Target geometry for each [`Action`].
//!
//! [`calculate`] is pure: it maps an action and the usable screen rectangle
//! to the rectangle the focused window should occupy.  All arithmetic is
//! done in `f64`; rounding to whole pixels is the backend's business.

use crate::action::Action;

/// Share of each screen dimension used by [`Action::Centered`].
pub const CENTERED_FRACTION: f64 = 0.7;

/// An axis-aligned rectangle in the screen coordinate space of the
/// window-control backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center.
    #[cfg(test)]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[cfg(test)]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Compute the window rectangle for `action` inside `screen`.
pub fn calculate(action: Action, screen: Rect) -> Rect {
    let Rect {
        x,
        y,
        width: w,
        height: h,
    } = screen;

    match action {
        Action::LeftHalf => Rect::new(x, y, w / 2.0, h),
        Action::RightHalf => Rect::new(x + w / 2.0, y, w / 2.0, h),
        Action::TopHalf => Rect::new(x, y, w, h / 2.0),
        Action::BottomHalf => Rect::new(x, y + h / 2.0, w, h / 2.0),
        Action::Maximize => screen,
        Action::Centered => {
            let cw = w * CENTERED_FRACTION;
            let ch = h * CENTERED_FRACTION;
            Rect::new(x + (w - cw) / 2.0, y + (h - ch) / 2.0, cw, ch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn screens() -> Vec<Rect> {
        vec![
            Rect::new(0.0, 0.0, 1920.0, 1080.0),
            Rect::new(0.0, 30.0, 2560.0, 1410.0),
            Rect::new(-1280.0, 0.0, 1280.0, 1024.0),
            Rect::new(1920.0, 0.0, 1366.0, 767.0),
            Rect::new(12.5, 7.25, 1001.0, 333.0),
        ]
    }

    #[test]
    fn left_and_right_halves_tile_horizontally() {
        for r in screens() {
            let left = calculate(Action::LeftHalf, r);
            let right = calculate(Action::RightHalf, r);
            assert!((left.width + right.width - r.width).abs() < EPS);
            assert_eq!(left.height, r.height);
            assert_eq!(right.height, r.height);
            assert_eq!(left.y, r.y);
            assert_eq!(right.y, r.y);
            assert_eq!(left.x, r.x);
            assert!((left.x + left.width - right.x).abs() < EPS);
        }
    }

    #[test]
    fn top_and_bottom_halves_tile_vertically() {
        for r in screens() {
            let top = calculate(Action::TopHalf, r);
            let bottom = calculate(Action::BottomHalf, r);
            assert!((top.height + bottom.height - r.height).abs() < EPS);
            assert_eq!(top.width, r.width);
            assert_eq!(bottom.width, r.width);
            assert_eq!(top.x, r.x);
            assert_eq!(bottom.x, r.x);
            assert!((top.y + top.height - bottom.y).abs() < EPS);
        }
    }

    #[test]
    fn maximize_is_identity() {
        for r in screens() {
            assert_eq!(calculate(Action::Maximize, r), r);
        }
    }

    #[test]
    fn centered_is_seventy_percent_and_centered() {
        for r in screens() {
            let c = calculate(Action::Centered, r);
            assert!((c.width - 0.7 * r.width).abs() < EPS);
            assert!((c.height - 0.7 * r.height).abs() < EPS);
            assert!((c.center_x() - r.center_x()).abs() < EPS);
            assert!((c.center_y() - r.center_y()).abs() < EPS);
        }
    }

    #[test]
    fn concrete_values_on_full_hd() {
        let r = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(calculate(Action::RightHalf, r), Rect::new(960.0, 0.0, 960.0, 1080.0));
        assert_eq!(calculate(Action::BottomHalf, r), Rect::new(0.0, 540.0, 1920.0, 540.0));
        let c = calculate(Action::Centered, r);
        assert!((c.x - 288.0).abs() < EPS);
        assert!((c.y - 162.0).abs() < EPS);
    }
}
