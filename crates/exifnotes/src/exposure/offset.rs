//! Exposure offsets in stops: exposure compensation and push/pull.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::CompIncrement;
use crate::error::ParseError;

/// Largest offset offered in either direction, in stops.
pub const MAX_OFFSET_STOPS: i32 = 3;

/// An exposure offset stored in sixths of a stop, so that both third and
/// half increments are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ExposureOffset(i32);

impl ExposureOffset {
    /// No offset.
    pub const ZERO: Self = Self(0);

    /// Create an offset from sixths of a stop.
    #[must_use]
    pub fn from_sixths(sixths: i32) -> Self {
        Self(sixths)
    }

    /// The offset in sixths of a stop.
    #[must_use]
    pub fn sixths(&self) -> i32 {
        self.0
    }

    /// The offset in stops (EV).
    #[must_use]
    pub fn stops(&self) -> f64 {
        f64::from(self.0) / 6.0
    }

    /// Check whether this is no offset at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Decimal value for ExifTool's `ExposureCompensation` tag.
    #[must_use]
    pub fn exif_value(&self) -> String {
        let rendered = format!("{:.2}", self.stops());
        let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
        if rendered == "-0" {
            "0".to_string()
        } else {
            rendered.to_string()
        }
    }
}

impl fmt::Display for ExposureOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0");
        }
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        let whole = abs / 6;
        let fraction = match abs % 6 {
            0 => None,
            1 => Some("1/6"),
            2 => Some("1/3"),
            3 => Some("1/2"),
            4 => Some("2/3"),
            _ => Some("5/6"),
        };
        match (whole, fraction) {
            (w, None) => write!(f, "{sign}{w}"),
            (0, Some(frac)) => write!(f, "{sign}{frac}"),
            (w, Some(frac)) => write!(f, "{sign}{w} {frac}"),
        }
    }
}

fn offset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([+-])?\s*(?:(\d)(?:\s+(\d)/(\d))?|(\d)/(\d))$").expect("valid offset pattern")
    })
}

fn sixths_of(numerator: u32, denominator: u32) -> Option<i32> {
    if denominator == 0 || 6 % denominator != 0 || numerator >= denominator {
        return None;
    }
    i32::try_from(numerator * (6 / denominator)).ok()
}

impl FromStr for ExposureOffset {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = || ParseError::new("exposure offset", input);
        let caps = offset_pattern().captures(input.trim()).ok_or_else(err)?;
        let digit = |i: usize| -> Option<u32> { caps.get(i).and_then(|m| m.as_str().parse().ok()) };

        let magnitude = if let Some(whole) = digit(2) {
            let fraction = match (digit(3), digit(4)) {
                (Some(n), Some(d)) => sixths_of(n, d).ok_or_else(err)?,
                _ => 0,
            };
            i32::try_from(whole).map_err(|_| err())? * 6 + fraction
        } else {
            match (digit(5), digit(6)) {
                (Some(n), Some(d)) => sixths_of(n, d).ok_or_else(err)?,
                _ => return Err(err()),
            }
        };

        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl From<ExposureOffset> for String {
    fn from(value: ExposureOffset) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ExposureOffset {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// All offsets between -3 and +3 stops for an increment, most negative first.
#[must_use]
pub fn compensation_values(increment: CompIncrement) -> Vec<ExposureOffset> {
    let step = match increment {
        CompIncrement::Third => 2,
        CompIncrement::Half => 3,
    };
    let limit = MAX_OFFSET_STOPS * 6;
    (-limit..=limit)
        .step_by(step)
        .map(ExposureOffset)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ExposureOffset(0).to_string(), "0");
        assert_eq!(ExposureOffset(2).to_string(), "+1/3");
        assert_eq!(ExposureOffset(-3).to_string(), "-1/2");
        assert_eq!(ExposureOffset(8).to_string(), "+1 1/3");
        assert_eq!(ExposureOffset(-16).to_string(), "-2 2/3");
        assert_eq!(ExposureOffset(12).to_string(), "+2");
    }

    #[test]
    fn test_parse() {
        assert_eq!("0".parse::<ExposureOffset>().unwrap(), ExposureOffset(0));
        assert_eq!("+1/3".parse::<ExposureOffset>().unwrap(), ExposureOffset(2));
        assert_eq!("-1 1/2".parse::<ExposureOffset>().unwrap(), ExposureOffset(-9));
        assert_eq!("2".parse::<ExposureOffset>().unwrap(), ExposureOffset(12));
        assert_eq!("-2/3".parse::<ExposureOffset>().unwrap(), ExposureOffset(-4));
    }

    #[test]
    fn test_parse_rejects_odd_fractions() {
        assert!("1/4".parse::<ExposureOffset>().is_err());
        assert!("3/3".parse::<ExposureOffset>().is_err());
        assert!("one".parse::<ExposureOffset>().is_err());
        assert!("".parse::<ExposureOffset>().is_err());
    }

    #[test]
    fn test_display_parse_agree_on_lists() {
        for increment in [CompIncrement::Third, CompIncrement::Half] {
            for value in compensation_values(increment) {
                assert_eq!(value.to_string().parse::<ExposureOffset>().unwrap(), value);
            }
        }
    }

    #[test]
    fn test_compensation_values() {
        let thirds = compensation_values(CompIncrement::Third);
        assert_eq!(thirds.len(), 19);
        assert_eq!(thirds.first().map(ToString::to_string).as_deref(), Some("-3"));
        assert!(thirds.contains(&ExposureOffset::ZERO));

        let halves = compensation_values(CompIncrement::Half);
        assert_eq!(halves.len(), 13);
        assert!(halves.contains(&ExposureOffset(3)));
        assert!(!halves.contains(&ExposureOffset(2)));
    }

    #[test]
    fn test_exif_value() {
        assert_eq!(ExposureOffset(0).exif_value(), "0");
        assert_eq!(ExposureOffset(8).exif_value(), "1.33");
        assert_eq!(ExposureOffset(-3).exif_value(), "-0.5");
        assert_eq!(ExposureOffset(12).exif_value(), "2");
    }
}
