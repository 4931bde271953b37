//! Global shortcuts through Hyprland keybinds.
//!
//! # How a key press reaches the dispatcher
//!
//! [`HyprlandShortcuts::register`] adds a runtime keybind whose dispatcher
//! is Hyprland's `event`, which does nothing but publish a custom event:
//!
//! ```text
//! keyword bind CTRL ALT SUPER,Left,event,hyprsnap:1
//! ```
//!
//! When the combination is pressed anywhere in the session, Hyprland writes
//! `custom>>hyprsnap:1` to its event socket (`socket2`).
//! [`HyprlandShortcutEvents`] reads that socket and hands the id to a
//! [`ShortcutTrigger`], which queues the bound action.
//!
//! A combination bound by another program is refused.  A bind of our own
//! left behind by a run that exited without unbinding is replaced.

use super::ipc::{self, HyprlandError};
use crate::dispatcher::DispatchHandle;
use crate::shortcuts::{BindingTable, KeyCombo, Modifiers, ShortcutId, ShortcutTrigger};
use crate::traits::{ActionSource, ShortcutSurface};
use log::{debug, error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;

/// Prefix of the custom event payload emitted by our binds.
pub const EVENT_PREFIX: &str = "hyprsnap:";

/// Subset of the JSON object returned by `j/binds`.
#[derive(Debug, Deserialize)]
struct BindJson {
    modmask: u32,
    key: String,
    #[serde(default)]
    submap: String,
    #[serde(default)]
    dispatcher: String,
    #[serde(default)]
    arg: String,
}

impl BindJson {
    /// Whether this bind triggers `combo` in the global submap.
    fn matches(&self, combo: &KeyCombo) -> bool {
        self.submap.is_empty()
            && Modifiers::from_bits_truncate(self.modmask) == combo.modifiers
            && self.key.eq_ignore_ascii_case(&combo.key)
    }

    /// Whether this bind was installed by hyprsnap.
    fn is_ours(&self) -> bool {
        self.dispatcher == "event" && self.arg.starts_with(EVENT_PREFIX)
    }
}

fn parse_binds(binds_json: &str) -> Result<Vec<BindJson>, HyprlandError> {
    serde_json::from_str(binds_json).map_err(|e| HyprlandError(format!("parse: {}", e)))
}

/// Whether another program already binds `combo`.
fn is_claimed(binds: &[BindJson], combo: &KeyCombo) -> bool {
    binds.iter().any(|b| b.matches(combo) && !b.is_ours())
}

/// Whether a bind of ours for `combo` is still installed, left over from a
/// run that exited without unbinding.
fn has_stale_bind(binds: &[BindJson], combo: &KeyCombo) -> bool {
    binds.iter().any(|b| b.matches(combo) && b.is_ours())
}

/// `MODS,KEY` as Hyprland's bind syntax expects it.
fn bind_target(combo: &KeyCombo) -> String {
    format!("{},{}", combo.modifiers, combo.key)
}

/// The shortcut id carried by a socket2 line, if it is one of ours.
pub fn parse_shortcut_event(line: &str) -> Option<ShortcutId> {
    let (event, data) = ipc::parse_event_line(line)?;
    if event != "custom" {
        return None;
    }
    data.trim().strip_prefix(EVENT_PREFIX)?.parse().ok()
}

/// [`ShortcutSurface`] that installs runtime keybinds in Hyprland.
///
/// Identifiers start at 1 and advance only when a bind succeeds.
#[derive(Debug)]
pub struct HyprlandShortcuts {
    next_id: ShortcutId,
    active: HashMap<ShortcutId, KeyCombo>,
}

impl Default for HyprlandShortcuts {
    fn default() -> Self {
        Self {
            next_id: 1,
            active: HashMap::new(),
        }
    }
}

impl HyprlandShortcuts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShortcutSurface for HyprlandShortcuts {
    type Error = HyprlandError;

    fn register(&mut self, combo: &KeyCombo) -> Result<ShortcutId, HyprlandError> {
        let binds = parse_binds(&ipc::json("binds")?)?;
        if is_claimed(&binds, combo) {
            return Err(HyprlandError(format!("{} is already bound", combo)));
        }
        if has_stale_bind(&binds, combo) {
            info!("replacing leftover bind for {}", combo);
            ipc::keyword(&format!("unbind {}", bind_target(combo)))?;
        }
        let id = self.next_id;
        ipc::keyword(&format!(
            "bind {},event,{}{}",
            bind_target(combo),
            EVENT_PREFIX,
            id
        ))?;
        self.next_id += 1;
        self.active.insert(id, combo.clone());
        Ok(id)
    }

    fn unregister(&mut self, id: ShortcutId) -> Result<(), HyprlandError> {
        let combo = self
            .active
            .remove(&id)
            .ok_or_else(|| HyprlandError(format!("unknown shortcut id {}", id)))?;
        ipc::keyword(&format!("unbind {}", bind_target(&combo)))
    }
}

/// [`ActionSource`] that listens to Hyprland's event socket for presses of
/// registered shortcuts.
pub struct HyprlandShortcutEvents {
    bindings: BindingTable,
}

impl HyprlandShortcutEvents {
    /// `bindings` is the registry's shared table
    /// ([`ShortcutRegistry::bindings`](crate::shortcuts::ShortcutRegistry::bindings)).
    pub fn new(bindings: BindingTable) -> Self {
        Self { bindings }
    }
}

/// Forward every shortcut event found in `reader` to `trigger`.
fn pump<R: BufRead>(reader: R, trigger: &ShortcutTrigger) -> Result<(), HyprlandError> {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if let Some(id) = parse_shortcut_event(&line) {
                    debug!("shortcut event {}", id);
                    trigger.fire(id);
                }
            }
            Err(e) => {
                error!("socket2 read error: {}", e);
                return Err(HyprlandError(format!("read error: {}", e)));
            }
        }
    }
    Ok(())
}

impl ActionSource for HyprlandShortcutEvents {
    type Error = HyprlandError;

    /// Connect to socket2 and forward shortcut presses.
    ///
    /// This method **blocks** until the socket closes.
    fn run(&mut self, sink: DispatchHandle) -> Result<(), Self::Error> {
        let path = ipc::socket2_path()?;
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;
        info!("shortcut events connected to {}", path.display());

        let trigger = ShortcutTrigger::new(self.bindings.clone(), sink);
        pump(BufReader::new(stream), &trigger)?;

        warn!("socket2 stream ended");
        Ok(())
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::dispatcher;
    use crate::shortcuts::ShortcutRegistry;
    use crate::traits::ShortcutSurface;
    use std::io::Cursor;

    fn hyper() -> Modifiers {
        Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER
    }

    #[test]
    fn parse_our_events() {
        assert_eq!(parse_shortcut_event("custom>>hyprsnap:3"), Some(3));
        assert_eq!(parse_shortcut_event("custom>>hyprsnap:12\n"), Some(12));
    }

    #[test]
    fn ignore_foreign_events() {
        assert_eq!(parse_shortcut_event("custom>>other:3"), None);
        assert_eq!(parse_shortcut_event("workspace>>hyprsnap:3"), None);
        assert_eq!(parse_shortcut_event("custom>>hyprsnap:abc"), None);
        assert_eq!(parse_shortcut_event("garbage"), None);
    }

    #[test]
    fn bind_target_format() {
        assert_eq!(bind_target(&KeyCombo::new("Left", hyper())), "CTRL ALT SUPER,Left");
    }

    #[test]
    fn claimed_combo_detection() {
        let binds = r#"[
            {"locked":false,"modmask":76,"submap":"","key":"left","dispatcher":"movefocus","arg":"l"},
            {"locked":false,"modmask":64,"submap":"","key":"Return","dispatcher":"exec","arg":"kitty"},
            {"locked":false,"modmask":76,"submap":"resize","key":"Up","dispatcher":"resizeactive","arg":"0 -10"}
        ]"#;
        let binds = parse_binds(binds).unwrap();
        assert!(is_claimed(&binds, &KeyCombo::new("Left", hyper())));
        assert!(!is_claimed(&binds, &KeyCombo::new("Return", hyper())));
        assert!(!is_claimed(&binds, &KeyCombo::new("Up", hyper())));
        assert!(parse_binds("not json").is_err());
    }

    #[test]
    fn leftover_own_bind_is_not_a_claim() {
        let binds = parse_binds(
            r#"[
            {"modmask":76,"submap":"","key":"Left","dispatcher":"event","arg":"hyprsnap:1"},
            {"modmask":76,"submap":"","key":"Right","dispatcher":"event","arg":"other:1"},
            {"modmask":76,"submap":"","key":"Up","dispatcher":"exec","arg":"hyprsnap:2"}
        ]"#,
        )
        .unwrap();
        let left = KeyCombo::new("Left", hyper());
        assert!(!is_claimed(&binds, &left));
        assert!(has_stale_bind(&binds, &left));

        // Someone else's custom event, or our prefix under another dispatcher.
        for key in ["Right", "Up"] {
            let combo = KeyCombo::new(key, hyper());
            assert!(is_claimed(&binds, &combo));
            assert!(!has_stale_bind(&binds, &combo));
        }
        assert!(!has_stale_bind(&binds, &KeyCombo::new("Down", hyper())));
    }

    #[test]
    fn foreign_bind_wins_over_leftover() {
        let binds = parse_binds(
            r#"[
            {"modmask":76,"submap":"","key":"C","dispatcher":"event","arg":"hyprsnap:6"},
            {"modmask":76,"submap":"","key":"C","dispatcher":"exec","arg":"calc"}
        ]"#,
        )
        .unwrap();
        assert!(is_claimed(&binds, &KeyCombo::new("C", hyper())));
    }

    #[test]
    fn unregister_unknown_id_fails() {
        let mut surface = HyprlandShortcuts::new();
        assert!(surface.unregister(42).is_err());
    }

    /// Surface that always succeeds, so the pump can be tested without a
    /// compositor.
    #[derive(Default)]
    struct Accepting(ShortcutId);

    #[derive(Debug, thiserror::Error)]
    #[error("never")]
    struct Never;

    impl ShortcutSurface for Accepting {
        type Error = Never;
        fn register(&mut self, _: &KeyCombo) -> Result<ShortcutId, Never> {
            self.0 += 1;
            Ok(self.0)
        }
        fn unregister(&mut self, _: ShortcutId) -> Result<(), Never> {
            Ok(())
        }
    }

    #[test]
    fn pump_forwards_bound_presses_in_order() {
        let mut registry = ShortcutRegistry::new(Accepting::default());
        registry.register(&KeyCombo::new("Left", hyper()), Action::LeftHalf);
        registry.register(&KeyCombo::new("C", hyper()), Action::Centered);

        let (handle, rx) = dispatcher::queue(8);
        let trigger = ShortcutTrigger::new(registry.bindings(), handle);
        let stream = "workspace>>2\n\
                      custom>>hyprsnap:2\n\
                      activewindow>>kitty,~\n\
                      custom>>hyprsnap:1\n\
                      custom>>hyprsnap:1\n\
                      custom>>hyprsnap:9\n";
        pump(Cursor::new(stream), &trigger).unwrap();

        let got: Vec<Action> = rx.try_iter().collect();
        assert_eq!(got, vec![Action::Centered, Action::LeftHalf, Action::LeftHalf]);
    }
}
