//! The layout vocabulary shared by every component.
//!
//! An [`Action`] is what a shortcut press or an HTTP request asks for.  Its
//! lowercase wire form (`left`, `right`, `top`, `bottom`, `maximize`,
//! `center`) is used in URLs, in the configuration file and in log lines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the six preset layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "left")]
    LeftHalf,
    #[serde(rename = "right")]
    RightHalf,
    #[serde(rename = "top")]
    TopHalf,
    #[serde(rename = "bottom")]
    BottomHalf,
    #[serde(rename = "maximize")]
    Maximize,
    #[serde(rename = "center")]
    Centered,
}

impl Action {
    /// Every action, in a stable order.
    pub const ALL: [Action; 6] = [
        Action::LeftHalf,
        Action::RightHalf,
        Action::TopHalf,
        Action::BottomHalf,
        Action::Maximize,
        Action::Centered,
    ];

    /// The canonical wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            Action::LeftHalf => "left",
            Action::RightHalf => "right",
            Action::TopHalf => "top",
            Action::BottomHalf => "bottom",
            Action::Maximize => "maximize",
            Action::Centered => "center",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that is not one of the six wire identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct ActionParseError(pub String);

impl FromStr for Action {
    type Err = ActionParseError;

    /// Exact, case-sensitive match against [`Action::as_str`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ActionParseError(s.to_string()))
    }
}
