//! Exposure values and the lists a value picker offers for them.
//!
//! Cameras and lenses are described by stop increments and ranges. The
//! functions here turn those into concrete value lists. They also rebuild
//! the lists when an increment or the chosen equipment changes, clearing
//! any value that is no longer offered.

mod aperture;
mod offset;
mod options;
mod shutter;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

pub use aperture::{aperture_range, aperture_values, Aperture};
pub use offset::{compensation_values, ExposureOffset, MAX_OFFSET_STOPS};
pub use options::{FrameValueOptions, MAX_FOCAL_LENGTH};
pub use shutter::{shutter_range, shutter_values, ShutterSpeed};

/// Step between adjacent shutter or aperture values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Increment {
    /// One-third stop.
    #[default]
    Third,
    /// Half stop.
    Half,
    /// Full stop.
    Full,
}

impl fmt::Display for Increment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Third => write!(f, "third"),
            Self::Half => write!(f, "half"),
            Self::Full => write!(f, "full"),
        }
    }
}

impl FromStr for Increment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "third" | "1/3" => Ok(Self::Third),
            "half" | "1/2" => Ok(Self::Half),
            "full" | "1" => Ok(Self::Full),
            _ => Err(ParseError::new("stop increment", s)),
        }
    }
}

/// Step between exposure compensation values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompIncrement {
    /// One-third stop.
    #[default]
    Third,
    /// Half stop.
    Half,
}

impl fmt::Display for CompIncrement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Third => write!(f, "third"),
            Self::Half => write!(f, "half"),
        }
    }
}

impl FromStr for CompIncrement {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "third" | "1/3" => Ok(Self::Third),
            "half" | "1/2" => Ok(Self::Half),
            _ => Err(ParseError::new("compensation increment", s)),
        }
    }
}

/// Keep `current` if the rebuilt `list` still offers it, otherwise clear it.
///
/// Returns `true` when a value was cleared.
pub fn reconcile<T: PartialEq>(list: &[T], current: &mut Option<T>) -> bool {
    match current {
        Some(value) if !list.contains(value) => {
            *current = None;
            true
        }
        _ => false,
    }
}
