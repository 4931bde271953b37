//! [`WindowControl`] implementation backed by Hyprland IPC.

use super::ipc::{self, HyprlandError};
use crate::layout::Rect;
use crate::traits::WindowControl;
use log::debug;
use serde::Deserialize;

/// Hyprland-backed window control.
///
/// No connection is kept open; each call issues short-lived IPC requests.
#[derive(Debug, Default)]
pub struct HyprlandWm;

impl HyprlandWm {
    pub fn new() -> Self {
        Self
    }
}

/// The focused window as Hyprland reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyprWindow {
    /// Window address, e.g. `0x55d1c0a3e2b0`.
    pub address: String,
    /// Tiled windows ignore pixel moves until they are made floating.
    pub floating: bool,
}

impl HyprWindow {
    fn selector(&self) -> String {
        format!("address:{}", self.address)
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of the JSON object returned by `j/activewindow`.
#[derive(Deserialize)]
struct ActiveWindowJson {
    address: String,
    #[serde(default)]
    floating: bool,
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Clone, Deserialize)]
struct MonitorJson {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: u32,
    /// Reserved space as `[left, top, right, bottom]`.
    #[serde(default)]
    reserved: [i32; 4],
    #[serde(default)]
    focused: bool,
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// Logical rectangle minus reserved space (bars, panels).
    fn usable_rect(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let (mut w, mut h) = (self.width as f64 / scale, self.height as f64 / scale);
        // Odd transforms rotate by 90° or 270°.
        if self.transform % 2 == 1 {
            std::mem::swap(&mut w, &mut h);
        }
        let [left, top, right, bottom] = self.reserved.map(f64::from);
        Rect::new(
            self.x as f64 + left,
            self.y as f64 + top,
            (w - left - right).max(0.0),
            (h - top - bottom).max(0.0),
        )
    }
}

fn parse_active_window(json: &str) -> Result<Option<HyprWindow>, HyprlandError> {
    // Hyprland returns an empty object `{}` when no window is focused.
    if json.trim() == "{}" {
        return Ok(None);
    }
    let w: ActiveWindowJson =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse: {}", e)))?;
    Ok(Some(HyprWindow {
        address: w.address,
        floating: w.floating,
    }))
}

/// The focused monitor's usable area, falling back to the first monitor.
fn parse_usable_rect(json: &str) -> Result<Option<Rect>, HyprlandError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse: {}", e)))?;
    Ok(monitors
        .iter()
        .find(|m| m.focused)
        .or_else(|| monitors.first())
        .map(MonitorJson::usable_rect))
}

//  WindowControl implementation

impl WindowControl for HyprlandWm {
    type Window = HyprWindow;
    type Error = HyprlandError;

    fn focused_window(&self) -> Result<Option<HyprWindow>, HyprlandError> {
        parse_active_window(&ipc::json("activewindow")?)
    }

    fn primary_screen_usable_rect(&self) -> Result<Option<Rect>, HyprlandError> {
        parse_usable_rect(&ipc::json("monitors")?)
    }

    fn set_position(&self, window: &HyprWindow, x: f64, y: f64) -> Result<(), HyprlandError> {
        if !window.floating {
            debug!("making {} floating", window.address);
            ipc::dispatch(&format!("setfloating {}", window.selector()))?;
        }
        ipc::dispatch(&format!(
            "movewindowpixel exact {} {},{}",
            x.round() as i64,
            y.round() as i64,
            window.selector()
        ))
    }

    fn set_size(&self, window: &HyprWindow, width: f64, height: f64) -> Result<(), HyprlandError> {
        ipc::dispatch(&format!(
            "resizewindowpixel exact {} {},{}",
            width.round() as i64,
            height.round() as i64,
            window.selector()
        ))
    }
}
