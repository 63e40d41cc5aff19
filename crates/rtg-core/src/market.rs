//! Instruments traded on the venue.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// One of the two instruments on the venue.
///
/// The wire ids follow the venue numbering: 0 is the future, 1 the ETF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Future,
    Etf,
}

impl Instrument {
    pub fn wire_id(&self) -> u8 {
        match self {
            Self::Future => 0,
            Self::Etf => 1,
        }
    }

    pub fn from_wire_id(id: u8) -> Result<Self, CoreError> {
        match id {
            0 => Ok(Self::Future),
            1 => Ok(Self::Etf),
            other => Err(CoreError::UnknownInstrument(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Etf => "etf",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
