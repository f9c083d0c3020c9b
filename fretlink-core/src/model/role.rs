use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side of the pairing a device plays.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Role {
    /// Camera side: detects strums, runs the chart and the score.
    #[serde(rename = "PERFORMER", alias = "PC_PLAYER")]
    Performer,
    /// Touch side: streams fret positions.
    #[serde(rename = "CONTROLLER", alias = "MOBILE_CONTROLLER")]
    Controller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performer => "PERFORMER",
            Self::Controller => "CONTROLLER",
        }
    }

    pub fn counterpart(&self) -> Self {
        match self {
            Self::Performer => Self::Controller,
            Self::Controller => Self::Performer,
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PERFORMER" | "PC_PLAYER" => Ok(Self::Performer),
            "CONTROLLER" | "MOBILE_CONTROLLER" => Ok(Self::Controller),
            _ => Err(CoreError::UnknownRole(s.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
