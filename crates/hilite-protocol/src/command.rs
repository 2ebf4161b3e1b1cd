//! Hilite command envelope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ProtocolError;
use crate::predicate::Predicate;

/// Value of the `command` field for every hilite command.
pub const HILITE_COMMAND: &str = "hilite";

/// Effect a hilite command has on the receiving peer's selection.
///
/// Modes serialize in lowercase; decoding accepts any ASCII case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HiliteMode {
    /// Add matching objects to the selection.
    Hilite,
    /// Remove matching objects from the selection.
    Unhilite,
    /// Flip the selection state of matching objects.
    Toggle,
    /// Drop the whole selection; takes no predicate.
    Clear,
}

impl HiliteMode {
    /// Every mode, in wire order.
    pub const ALL: [Self; 4] = [Self::Hilite, Self::Unhilite, Self::Toggle, Self::Clear];

    /// Modes that operate on a predicate (everything except [`HiliteMode::Clear`]).
    pub const SELECTIVE: [Self; 3] = [Self::Hilite, Self::Unhilite, Self::Toggle];

    /// Parses a mode name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidMode`] for any other name.
    pub fn parse(value: &str) -> Result<Self, ProtocolError> {
        match value.to_ascii_lowercase().as_str() {
            "hilite" => Ok(Self::Hilite),
            "unhilite" => Ok(Self::Unhilite),
            "toggle" => Ok(Self::Toggle),
            "clear" => Ok(Self::Clear),
            _ => Err(ProtocolError::invalid_mode(value)),
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hilite => "hilite",
            Self::Unhilite => "unhilite",
            Self::Toggle => "toggle",
            Self::Clear => "clear",
        }
    }

    /// Returns the capitalised label used for menu entries.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hilite => "Hilite",
            Self::Unhilite => "Unhilite",
            Self::Toggle => "Toggle",
            Self::Clear => "Clear",
        }
    }
}

impl fmt::Display for HiliteMode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for HiliteMode {
    type Err = ProtocolError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Self::parse(input)
    }
}

impl<'de> Deserialize<'de> for HiliteMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Self::parse(&name).map_err(serde::de::Error::custom)
    }
}

/// A hilite command as broadcast to peers.
///
/// Commands are built once and never mutated; the `where` clause is omitted
/// from the serialized form when absent rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiliteCommand {
    /// Command name, `"hilite"` for commands built by this crate.
    pub command: String,
    /// Selection effect.
    pub mode: HiliteMode,
    /// Objects the command applies to.
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Predicate>,
}

impl HiliteCommand {
    /// Builds a hilite command without validating the mode/predicate pairing.
    #[must_use]
    pub fn new(mode: HiliteMode, predicate: Option<Predicate>) -> Self {
        Self {
            command: HILITE_COMMAND.to_owned(),
            mode,
            predicate,
        }
    }
}
