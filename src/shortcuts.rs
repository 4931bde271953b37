//! Global shortcut bookkeeping.
//!
//! [`ShortcutRegistry`] asks a [`ShortcutSurface`] to intercept key
//! combinations and remembers which [`Action`] each issued [`ShortcutId`]
//! stands for.  When the backend observes a combination it hands the id to
//! a [`ShortcutTrigger`], which looks the action up in the shared
//! [`BindingTable`] and submits it to the dispatcher.
//!
//! # Concurrency
//!
//! The table is written only while registering at startup and while
//! unregistering at shutdown, from the thread that owns the registry.
//! Triggers read it from the backend's delivery thread.  The `RwLock` is
//! there for memory visibility across that boundary; readers use
//! `try_read` so that delivery never waits on it.

use crate::action::Action;
use crate::dispatcher::DispatchHandle;
use crate::traits::ShortcutSurface;
use log::{debug, error, info, warn};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, TryLockError};

/// Identifier issued by a [`ShortcutSurface`] for one registered combination.
pub type ShortcutId = u32;

/// A set of modifier keys.
///
/// Bit values follow the X11/Hyprland modifier mask so backends can
/// compare against compositor state directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1 << 0);
    pub const CTRL: Modifiers = Modifiers(1 << 2);
    pub const ALT: Modifiers = Modifiers(1 << 3);
    pub const SUPER: Modifiers = Modifiers(1 << 6);

    const NAMED: [(Modifiers, &'static str); 4] = [
        (Modifiers::SHIFT, "SHIFT"),
        (Modifiers::CTRL, "CTRL"),
        (Modifiers::ALT, "ALT"),
        (Modifiers::SUPER, "SUPER"),
    ];

    /// Raw modifier mask.
    #[cfg(test)]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Build from a raw mask, dropping bits that have no name.
    pub fn from_bits_truncate(bits: u32) -> Self {
        let known = Self::NAMED.iter().fold(0, |acc, (m, _)| acc | m.0);
        Modifiers(bits & known)
    }

    pub fn contains(self, other: Modifiers) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a single modifier name (case-insensitive).
    pub fn parse_name(name: &str) -> Option<Modifiers> {
        match name.trim().to_ascii_uppercase().as_str() {
            "SHIFT" => Some(Modifiers::SHIFT),
            "CTRL" | "CONTROL" => Some(Modifiers::CTRL),
            "ALT" | "OPTION" => Some(Modifiers::ALT),
            "SUPER" | "WIN" | "MOD4" | "CMD" => Some(Modifiers::SUPER),
            _ => None,
        }
    }

    fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(m, _)| self.contains(*m))
            .map(|(_, name)| name)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        Modifiers(self.0 | rhs.0)
    }
}

/// Space-separated names, e.g. `CTRL ALT SUPER`.
impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join(" "))
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

impl<'de> Deserialize<'de> for Modifiers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Modifiers::NONE, |acc, name| {
            Modifiers::parse_name(name)
                .map(|m| acc | m)
                .ok_or_else(|| DeError::custom(format!("invalid modifier: {:?}", name)))
        })
    }
}

/// A key plus the modifiers that must be held with it.
///
/// `key` is a backend key name (`Left`, `Return`, `C`, …).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.modifiers.names() {
            write!(f, "{}+", name)?;
        }
        f.write_str(&self.key)
    }
}

/// Shared id → action map.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    inner: Arc<RwLock<HashMap<ShortcutId, Action>>>,
}

impl BindingTable {
    /// Look up `id` without waiting.
    ///
    /// Returns `None` for unknown ids, and also when the table is being
    /// rewritten at that instant.
    pub fn lookup(&self, id: ShortcutId) -> Option<Action> {
        match self.inner.try_read() {
            Ok(map) => map.get(&id).copied(),
            Err(TryLockError::Poisoned(p)) => p.into_inner().get(&id).copied(),
            Err(TryLockError::WouldBlock) => {
                warn!("binding table busy, dropping shortcut {}", id);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.read(|map| map.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<T>(&self, f: impl FnOnce(&HashMap<ShortcutId, Action>) -> T) -> T {
        match self.inner.read() {
            Ok(map) => f(&*map),
            Err(p) => f(&*p.into_inner()),
        }
    }

    fn write<T>(&self, f: impl FnOnce(&mut HashMap<ShortcutId, Action>) -> T) -> T {
        match self.inner.write() {
            Ok(mut map) => f(&mut *map),
            Err(p) => f(&mut *p.into_inner()),
        }
    }
}

/// Owns every registered shortcut and releases them on drop.
pub struct ShortcutRegistry<S: ShortcutSurface> {
    surface: S,
    bindings: BindingTable,
}

impl<S: ShortcutSurface> ShortcutRegistry<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            bindings: BindingTable::default(),
        }
    }

    /// Register `combo` for `action`.
    ///
    /// A refusal from the surface is logged and returns `None`; it never
    /// affects other registrations.
    pub fn register(&mut self, combo: &KeyCombo, action: Action) -> Option<ShortcutId> {
        match self.surface.register(combo) {
            Ok(id) => {
                debug!("shortcut {} registered as {} for {}", combo, id, action);
                self.bindings.write(|map| map.insert(id, action));
                Some(id)
            }
            Err(e) => {
                error!("failed to register {} for {}: {}", combo, action, e);
                None
            }
        }
    }

    /// Register every `(combo, action)` pair, returning how many succeeded.
    pub fn register_all<'a, I>(&mut self, combos: I) -> usize
    where
        I: IntoIterator<Item = &'a (KeyCombo, Action)>,
    {
        let registered = combos
            .into_iter()
            .filter_map(|(combo, action)| self.register(combo, *action))
            .count();
        info!("{} shortcut(s) registered", registered);
        registered
    }

    /// Release every binding.
    pub fn unregister_all(&mut self) {
        let ids: Vec<ShortcutId> = self.bindings.write(|map| map.drain().map(|(id, _)| id).collect());
        for id in ids {
            if let Err(e) = self.surface.unregister(id) {
                warn!("failed to unregister shortcut {}: {}", id, e);
            }
        }
    }

    /// The shared id → action table, for delivery threads.
    pub fn bindings(&self) -> BindingTable {
        self.bindings.clone()
    }

    /// The action bound to `id`, if any.
    pub fn action_for(&self, id: ShortcutId) -> Option<Action> {
        self.bindings.read(|map| map.get(&id).copied())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    #[cfg(test)]
    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: ShortcutSurface> Drop for ShortcutRegistry<S> {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

/// Turns delivered shortcut ids into dispatcher submissions.
///
/// [`fire`](ShortcutTrigger::fire) is safe to call from a delivery context
/// that must not block: it does one non-waiting table lookup and one
/// non-waiting queue push.
#[derive(Debug, Clone)]
pub struct ShortcutTrigger {
    bindings: BindingTable,
    sink: DispatchHandle,
}

impl ShortcutTrigger {
    pub fn new(bindings: BindingTable, sink: DispatchHandle) -> Self {
        Self { bindings, sink }
    }

    /// Submit the action bound to `id`.  Returns `true` if it was queued.
    pub fn fire(&self, id: ShortcutId) -> bool {
        let Some(action) = self.bindings.lookup(id) else {
            debug!("ignoring unbound shortcut {}", id);
            return false;
        };
        match self.sink.submit(action) {
            Ok(()) => {
                debug!("shortcut {} -> {}", id, action);
                true
            }
            Err(e) => {
                warn!("dropping {} from shortcut {}: {}", action, id, e);
                false
            }
        }
    }
}
