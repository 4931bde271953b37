//! Application configuration.
//!
//! The configuration is read from `$XDG_CONFIG_HOME/hyprsnap/config.json`
//! if present.  Every section is optional and falls back to compiled-in
//! defaults, so a minimal `{}` file is valid.  The file is never written.
//!
//! # Example
//!
//! ```json
//! {
//!   "server": { "address": "127.0.0.1", "port": 42424 },
//!   "dispatcher": { "queue_capacity": 32 },
//!   "shortcuts": {
//!     "modifiers": ["CTRL", "ALT", "SUPER"],
//!     "bindings": [
//!       { "key": "Left", "action": "left" },
//!       { "key": "C", "action": "center" }
//!     ]
//!   }
//! }
//! ```

use crate::action::Action;
use crate::dispatcher::DEFAULT_QUEUE_CAPACITY;
use crate::http::listener::DEFAULT_PORT;
use crate::shortcuts::{KeyCombo, Modifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Action queue settings.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    /// Global shortcut table.
    #[serde(default)]
    pub shortcuts: ShortcutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.  Loopback unless you really mean it: requests
    /// are not authenticated.
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".into(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `address:port`, ready for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Actions that may wait while a window is being moved.
    pub queue_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// One key → action entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Hyprland key name, e.g. `Left`, `Return`, `C`.
    pub key: String,
    pub action: Action,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutConfig {
    /// Modifiers held together with every key below.
    pub modifiers: Modifiers,
    pub bindings: Vec<KeyBinding>,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let binding = |key: &str, action| KeyBinding {
            key: key.into(),
            action,
        };
        Self {
            modifiers: Modifiers::CTRL | Modifiers::ALT | Modifiers::SUPER,
            bindings: vec![
                binding("Left", Action::LeftHalf),
                binding("Right", Action::RightHalf),
                binding("Up", Action::TopHalf),
                binding("Down", Action::BottomHalf),
                binding("Return", Action::Maximize),
                binding("C", Action::Centered),
            ],
        }
    }
}

impl ShortcutConfig {
    /// Every binding as a `(combo, action)` pair, ready for
    /// [`ShortcutRegistry::register_all`](crate::shortcuts::ShortcutRegistry::register_all).
    pub fn combos(&self) -> Vec<(KeyCombo, Action)> {
        self.bindings
            .iter()
            .map(|b| (KeyCombo::new(b.key.clone(), self.modifiers), b.action))
            .collect()
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
