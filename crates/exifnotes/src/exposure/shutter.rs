//! Shutter speeds and the stop-increment lists a camera dial offers.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Increment;
use crate::error::ParseError;

/// A shutter speed as written on a camera dial.
///
/// Equality and ordering follow the exposure duration, so `1/2` and `0.5"`
/// compare equal even though they print differently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ShutterSpeed {
    /// `1/n` of a second.
    Fraction(u32),
    /// Whole or fractional seconds, stored in tenths.
    Seconds(u32),
    /// Bulb: open for as long as the release is held.
    Bulb,
}

const fn f(denominator: u32) -> ShutterSpeed {
    ShutterSpeed::Fraction(denominator)
}

const fn s(tenths: u32) -> ShutterSpeed {
    ShutterSpeed::Seconds(tenths)
}

const THIRD_STOPS: &[ShutterSpeed] = &[
    f(8000), f(6400), f(5000), f(4000), f(3200), f(2500), f(2000), f(1600),
    f(1250), f(1000), f(800), f(640), f(500), f(400), f(320), f(250),
    f(200), f(160), f(125), f(100), f(80), f(60), f(50), f(40),
    f(30), f(25), f(20), f(15), f(13), f(10), f(8), f(6),
    f(5), f(4), s(3), s(4), s(5), s(6), s(8), s(10),
    s(13), s(16), s(20), s(25), s(32), s(40), s(50), s(60),
    s(80), s(100), s(130), s(150), s(200), s(250), s(300),
];

const HALF_STOPS: &[ShutterSpeed] = &[
    f(8000), f(6000), f(4000), f(3000), f(2000), f(1500), f(1000), f(750),
    f(500), f(350), f(250), f(180), f(125), f(90), f(60), f(45),
    f(30), f(20), f(15), f(10), f(8), f(6), f(4), s(3),
    s(5), s(7), s(10), s(15), s(20), s(30), s(40), s(60),
    s(80), s(120), s(160), s(240), s(320),
];

const FULL_STOPS: &[ShutterSpeed] = &[
    f(8000), f(4000), f(2000), f(1000), f(500), f(250), f(125), f(60),
    f(30), f(15), f(8), f(4), f(2), s(10), s(20), s(40),
    s(80), s(150), s(300),
];

impl ShutterSpeed {
    /// Exposure duration in seconds as a reduced `(numerator, denominator)`
    /// pair. Bulb has no fixed duration.
    #[must_use]
    pub fn duration(&self) -> Option<(u64, u64)> {
        let (num, den) = match *self {
            Self::Fraction(d) => (1, u64::from(d.max(1))),
            Self::Seconds(t) => (u64::from(t), 10),
            Self::Bulb => return None,
        };
        let divisor = gcd(num, den);
        Some((num / divisor, den / divisor))
    }

    /// Check whether this is the bulb setting.
    #[must_use]
    pub fn is_bulb(&self) -> bool {
        matches!(self, Self::Bulb)
    }

    /// Value for ExifTool's `ExposureTime` tag. Bulb has none.
    #[must_use]
    pub fn exif_value(&self) -> Option<String> {
        match *self {
            Self::Fraction(d) => Some(format!("1/{d}")),
            Self::Seconds(t) if t % 10 == 0 => Some(format!("{}", t / 10)),
            Self::Seconds(t) => Some(format!("{}.{}", t / 10, t % 10)),
            Self::Bulb => None,
        }
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl PartialEq for ShutterSpeed {
    fn eq(&self, other: &Self) -> bool {
        self.duration() == other.duration()
    }
}

impl Eq for ShutterSpeed {}

impl Hash for ShutterSpeed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.duration().hash(state);
    }
}

impl PartialOrd for ShutterSpeed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ShutterSpeed {
    fn cmp(&self, other: &Self) -> Ordering {
        // Bulb sorts after every timed speed
        match (self.duration(), other.duration()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some((a, b)), Some((c, d))) => (a * d).cmp(&(c * b)),
        }
    }
}

impl fmt::Display for ShutterSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fraction(d) => write!(f, "1/{d}"),
            Self::Seconds(t) if t % 10 == 0 => write!(f, "{}\"", t / 10),
            Self::Seconds(t) => write!(f, "{}.{}\"", t / 10, t % 10),
            Self::Bulb => write!(f, "B"),
        }
    }
}

fn fraction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^1/(\d{1,5})$").expect("valid fraction pattern"))
}

fn seconds_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^(\d{1,4})(?:\.(\d))?\s*(?:"|s)?$"#).expect("valid seconds pattern")
    })
}

impl FromStr for ShutterSpeed {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("b") || trimmed.eq_ignore_ascii_case("bulb") {
            return Ok(Self::Bulb);
        }

        let err = || ParseError::new("shutter speed", input);

        if let Some(caps) = fraction_pattern().captures(trimmed) {
            let denominator: u32 = caps[1].parse().map_err(|_| err())?;
            return if denominator == 0 {
                Err(err())
            } else {
                Ok(Self::Fraction(denominator))
            };
        }

        if let Some(caps) = seconds_pattern().captures(trimmed) {
            let whole: u32 = caps[1].parse().map_err(|_| err())?;
            let tenth: u32 = caps
                .get(2)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| err())?;
            let tenths = whole * 10 + tenth;
            return if tenths == 0 {
                Err(err())
            } else {
                Ok(Self::Seconds(tenths))
            };
        }

        Err(err())
    }
}

impl From<ShutterSpeed> for String {
    fn from(value: ShutterSpeed) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ShutterSpeed {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// All shutter speeds for an increment, fastest first. Bulb is not included.
#[must_use]
pub fn shutter_values(increment: Increment) -> &'static [ShutterSpeed] {
    match increment {
        Increment::Third => THIRD_STOPS,
        Increment::Half => HALF_STOPS,
        Increment::Full => FULL_STOPS,
    }
}

/// The slice of an increment's list between `min` (fastest) and `max`
/// (slowest), inclusive.
///
/// Returns the whole list when either bound is missing from it.
#[must_use]
pub fn shutter_range(
    increment: Increment,
    min: ShutterSpeed,
    max: ShutterSpeed,
) -> Vec<ShutterSpeed> {
    let values = shutter_values(increment);
    let start = values.iter().position(|v| *v == min);
    let end = values.iter().position(|v| *v == max);
    match (start, end) {
        (Some(start), Some(end)) if start <= end => values[start..=end].to_vec(),
        _ => values.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fraction() {
        assert_eq!("1/125".parse::<ShutterSpeed>().unwrap(), ShutterSpeed::Fraction(125));
        assert!("1/0".parse::<ShutterSpeed>().is_err());
        assert!("2/125".parse::<ShutterSpeed>().is_err());
    }

    #[test]
    fn test_parse_seconds() {
        assert_eq!("2\"".parse::<ShutterSpeed>().unwrap(), ShutterSpeed::Seconds(20));
        assert_eq!("0.5".parse::<ShutterSpeed>().unwrap(), ShutterSpeed::Seconds(5));
        assert_eq!("1.3s".parse::<ShutterSpeed>().unwrap(), ShutterSpeed::Seconds(13));
        assert!("0".parse::<ShutterSpeed>().is_err());
        assert!("fast".parse::<ShutterSpeed>().is_err());
    }

    #[test]
    fn test_parse_bulb() {
        assert!("B".parse::<ShutterSpeed>().unwrap().is_bulb());
        assert!("bulb".parse::<ShutterSpeed>().unwrap().is_bulb());
    }

    #[test]
    fn test_display() {
        assert_eq!(ShutterSpeed::Fraction(60).to_string(), "1/60");
        assert_eq!(ShutterSpeed::Seconds(5).to_string(), "0.5\"");
        assert_eq!(ShutterSpeed::Seconds(300).to_string(), "30\"");
        assert_eq!(ShutterSpeed::Bulb.to_string(), "B");
    }

    #[test]
    fn test_equal_durations_compare_equal() {
        assert_eq!(ShutterSpeed::Fraction(2), ShutterSpeed::Seconds(5));
        assert!(ShutterSpeed::Fraction(1000) < ShutterSpeed::Fraction(500));
        assert!(ShutterSpeed::Seconds(300) < ShutterSpeed::Bulb);
    }

    #[test]
    fn test_close_fractions_are_distinct() {
        let off_dial: ShutterSpeed = "1/6401".parse().unwrap();
        assert_ne!(off_dial, ShutterSpeed::Fraction(6400));
        assert!(off_dial < ShutterSpeed::Fraction(6400));
        assert_ne!(ShutterSpeed::Fraction(7999), ShutterSpeed::Fraction(8000));
        assert!(!shutter_values(Increment::Third).contains(&off_dial));
    }

    #[test]
    fn test_duration_is_reduced() {
        assert_eq!(ShutterSpeed::Seconds(5).duration(), Some((1, 2)));
        assert_eq!(ShutterSpeed::Seconds(20).duration(), Some((2, 1)));
        assert_eq!(ShutterSpeed::Fraction(125).duration(), Some((1, 125)));
        assert_eq!(ShutterSpeed::Bulb.duration(), None);
    }

    #[test]
    fn test_lists_are_sorted_fastest_first() {
        for increment in [Increment::Third, Increment::Half, Increment::Full] {
            let values = shutter_values(increment);
            assert!(values.windows(2).all(|w| w[0] < w[1]), "{increment}");
            assert_eq!(values[0], ShutterSpeed::Fraction(8000));
        }
    }

    #[test]
    fn test_range_slices_inclusive() {
        let range = shutter_range(
            Increment::Full,
            ShutterSpeed::Fraction(1000),
            ShutterSpeed::Seconds(10),
        );
        assert_eq!(range.first(), Some(&ShutterSpeed::Fraction(1000)));
        assert_eq!(range.last(), Some(&ShutterSpeed::Seconds(10)));
        assert_eq!(range.len(), 11);
    }

    #[test]
    fn test_range_with_unknown_bound_is_full_list() {
        let range = shutter_range(
            Increment::Full,
            ShutterSpeed::Fraction(1250),
            ShutterSpeed::Seconds(10),
        );
        assert_eq!(range.len(), shutter_values(Increment::Full).len());
    }

    #[test]
    fn test_exif_value() {
        assert_eq!(ShutterSpeed::Fraction(250).exif_value().as_deref(), Some("1/250"));
        assert_eq!(ShutterSpeed::Seconds(20).exif_value().as_deref(), Some("2"));
        assert_eq!(ShutterSpeed::Seconds(13).exif_value().as_deref(), Some("1.3"));
        assert!(ShutterSpeed::Bulb.exif_value().is_none());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&ShutterSpeed::Fraction(30)).unwrap();
        assert_eq!(json, "\"1/30\"");
        let back: ShutterSpeed = serde_json::from_str("\"4\\\"\"").unwrap();
        assert_eq!(back, ShutterSpeed::Seconds(40));
    }
}
