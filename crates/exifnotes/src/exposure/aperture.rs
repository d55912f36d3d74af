//! Aperture f-numbers and their stop-increment lists.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Increment;
use crate::error::ParseError;

/// An f-number, stored in tenths (`f/2.8` is `Aperture(28)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Aperture(u32);

const THIRD_STOPS: &[u32] = &[
    10, 11, 12, 14, 16, 18, 20, 22, 25, 28, 32, 35, 40, 45, 50, 56, 63, 71, 80, 90, 100, 110,
    130, 140, 160, 180, 200, 220, 250, 290, 320, 360, 400, 450, 510, 570, 640,
];

const HALF_STOPS: &[u32] = &[
    10, 12, 14, 17, 20, 24, 28, 33, 40, 48, 56, 67, 80, 95, 110, 130, 160, 190, 220, 270, 320,
    380, 450, 540, 640,
];

const FULL_STOPS: &[u32] = &[10, 14, 20, 28, 40, 56, 80, 110, 160, 220, 320, 450, 640];

impl Aperture {
    /// Create an aperture from tenths of an f-stop number.
    ///
    /// Returns `None` for zero.
    #[must_use]
    pub fn from_tenths(tenths: u32) -> Option<Self> {
        (tenths > 0).then_some(Self(tenths))
    }

    /// The f-number in tenths.
    #[must_use]
    pub fn tenths(&self) -> u32 {
        self.0
    }

    /// The f-number as a float, for ExifTool's `FNumber` tag.
    #[must_use]
    pub fn f_number(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Aperture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 100 && self.0 % 10 == 0 {
            write!(f, "{}", self.0 / 10)
        } else {
            write!(f, "{}.{}", self.0 / 10, self.0 % 10)
        }
    }
}

fn aperture_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(?:f\s*/?\s*)?(\d{1,3})(?:\.(\d))?$").expect("valid aperture pattern")
    })
}

impl FromStr for Aperture {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::new("aperture", input);
        let caps = aperture_pattern().captures(input.trim()).ok_or_else(err)?;
        let whole: u32 = caps[1].parse().map_err(|_| err())?;
        let tenth: u32 = caps
            .get(2)
            .map_or(Ok(0), |m| m.as_str().parse())
            .map_err(|_| err())?;
        Self::from_tenths(whole * 10 + tenth).ok_or_else(err)
    }
}

impl From<Aperture> for String {
    fn from(value: Aperture) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Aperture {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// All apertures for an increment, widest first.
#[must_use]
pub fn aperture_values(increment: Increment) -> Vec<Aperture> {
    let tenths = match increment {
        Increment::Third => THIRD_STOPS,
        Increment::Half => HALF_STOPS,
        Increment::Full => FULL_STOPS,
    };
    tenths.iter().map(|&t| Aperture(t)).collect()
}

/// The apertures of an increment's list between `min` (widest) and `max`
/// (narrowest), inclusive.
///
/// Returns the whole list when either bound is missing from it.
#[must_use]
pub fn aperture_range(increment: Increment, min: Aperture, max: Aperture) -> Vec<Aperture> {
    let values = aperture_values(increment);
    let start = values.iter().position(|v| *v == min);
    let end = values.iter().position(|v| *v == max);
    match (start, end) {
        (Some(start), Some(end)) if start <= end => values[start..=end].to_vec(),
        _ => values,
    }
}
