//! Domain records for the film logbook.
//!
//! Each record is a plain value type with public fields and a `validate()`
//! method. Storage calls `validate()` before every write.

mod camera;
mod film_stock;
mod filter;
mod frame;
mod lens;
mod location;
mod roll;

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseError, Result};

pub use camera::Camera;
pub use film_stock::{builtin_catalog, FilmStock, MAX_ISO};
pub use filter::Filter;
pub use frame::{Frame, MAX_FRAME_COUNT};
pub use lens::Lens;
pub use location::Location;
pub use roll::Roll;

/// Storage and display format for timestamps.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats accepted when a user types a date.
const INPUT_DATE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Current local time, truncated to whole seconds.
#[must_use]
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Parse a user-entered date or date-time. A bare date means midnight.
///
/// # Errors
///
/// Returns a [`ParseError`] if the input matches none of the accepted formats.
pub fn parse_datetime(input: &str) -> std::result::Result<NaiveDateTime, ParseError> {
    let trimmed = input.trim();
    for format in INPUT_DATE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ParseError::new("date", input))
}

/// Reject blank required text fields.
fn require_text(entity: &'static str, field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::validation(entity, format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

/// Physical film format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilmFormat {
    /// 135 film.
    #[default]
    #[serde(rename = "35mm")]
    Mm35,
    /// 120 roll film.
    #[serde(rename = "120")]
    Mm120,
    /// 220 roll film.
    #[serde(rename = "220")]
    Mm220,
    /// 110 cartridge.
    #[serde(rename = "110")]
    Mm110,
    /// 126 cartridge.
    #[serde(rename = "126")]
    Mm126,
    /// 127 roll film.
    #[serde(rename = "127")]
    Mm127,
    /// Advanced Photo System.
    #[serde(rename = "aps")]
    Aps,
    /// 4x5 inch sheet film.
    #[serde(rename = "4x5")]
    Sheet4x5,
    /// 5x7 inch sheet film.
    #[serde(rename = "5x7")]
    Sheet5x7,
    /// 8x10 inch sheet film.
    #[serde(rename = "8x10")]
    Sheet8x10,
    /// Anything else.
    #[serde(rename = "other")]
    Other,
}

impl FilmFormat {
    /// Every format, in menu order.
    pub const ALL: [Self; 11] = [
        Self::Mm35,
        Self::Mm120,
        Self::Mm220,
        Self::Mm110,
        Self::Mm126,
        Self::Mm127,
        Self::Aps,
        Self::Sheet4x5,
        Self::Sheet5x7,
        Self::Sheet8x10,
        Self::Other,
    ];

    /// Stable text used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mm35 => "35mm",
            Self::Mm120 => "120",
            Self::Mm220 => "220",
            Self::Mm110 => "110",
            Self::Mm126 => "126",
            Self::Mm127 => "127",
            Self::Aps => "aps",
            Self::Sheet4x5 => "4x5",
            Self::Sheet5x7 => "5x7",
            Self::Sheet8x10 => "8x10",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FilmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilmFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let wanted = if wanted == "135" { "35mm" } else { wanted.as_str() };
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| ParseError::new("film format", s))
    }
}

/// Emulsion type of a film stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmType {
    /// Not recorded.
    #[default]
    Unknown,
    /// Black and white negative.
    BwNegative,
    /// Black and white reversal (slide).
    BwReversal,
    /// Color negative.
    ColorNegative,
    /// Color reversal (slide).
    ColorReversal,
    /// Color motion picture negative.
    ColorCine,
    /// Black and white motion picture film.
    BwCine,
}

impl FilmType {
    /// Every film type.
    pub const ALL: [Self; 7] = [
        Self::Unknown,
        Self::BwNegative,
        Self::BwReversal,
        Self::ColorNegative,
        Self::ColorReversal,
        Self::ColorCine,
        Self::BwCine,
    ];

    /// Stable text used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::BwNegative => "bw_negative",
            Self::BwReversal => "bw_reversal",
            Self::ColorNegative => "color_negative",
            Self::ColorReversal => "color_reversal",
            Self::ColorCine => "color_cine",
            Self::BwCine => "bw_cine",
        }
    }
}

impl fmt::Display for FilmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::BwNegative => "B&W negative",
            Self::BwReversal => "B&W reversal",
            Self::ColorNegative => "color negative",
            Self::ColorReversal => "color reversal",
            Self::ColorCine => "color cine",
            Self::BwCine => "B&W cine",
        };
        f.write_str(label)
    }
}

impl FromStr for FilmType {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ParseError::new("film type", s))
    }
}

/// Development process of a film stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilmProcess {
    /// Not recorded.
    #[default]
    Unknown,
    /// Black and white.
    Bw,
    /// C-41 color negative.
    C41,
    /// E-6 color reversal.
    E6,
    /// ECN-2 motion picture.
    Ecn2,
}

impl FilmProcess {
    /// Every process.
    pub const ALL: [Self; 5] = [Self::Unknown, Self::Bw, Self::C41, Self::E6, Self::Ecn2];

    /// Stable text used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Bw => "bw",
            Self::C41 => "c41",
            Self::E6 => "e6",
            Self::Ecn2 => "ecn2",
        }
    }
}

impl fmt::Display for FilmProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unknown => "unknown",
            Self::Bw => "B&W",
            Self::C41 => "C-41",
            Self::E6 => "E-6",
            Self::Ecn2 => "ECN-2",
        };
        f.write_str(label)
    }
}

impl FromStr for FilmProcess {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', '&', ' '], "");
        Self::ALL
            .into_iter()
            .find(|process| process.as_str() == wanted)
            .ok_or_else(|| ParseError::new("film process", s))
    }
}

/// Light source at the time of exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightSource {
    /// Not recorded.
    #[default]
    Unknown,
    /// Daylight.
    Daylight,
    /// Direct sun.
    Sunny,
    /// Overcast.
    Cloudy,
    /// Open shade.
    Shade,
    /// Fluorescent lamps.
    Fluorescent,
    /// Tungsten lamps.
    Tungsten,
    /// Electronic flash.
    Flash,
}

impl LightSource {
    /// Every light source.
    pub const ALL: [Self; 8] = [
        Self::Unknown,
        Self::Daylight,
        Self::Sunny,
        Self::Cloudy,
        Self::Shade,
        Self::Fluorescent,
        Self::Tungsten,
        Self::Flash,
    ];

    /// Stable text used in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Daylight => "daylight",
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Shade => "shade",
            Self::Fluorescent => "fluorescent",
            Self::Tungsten => "tungsten",
            Self::Flash => "flash",
        }
    }

    /// Numeric code of ExifTool's `LightSource` tag.
    #[must_use]
    pub fn exif_code(&self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Daylight => 1,
            Self::Fluorescent => 2,
            Self::Tungsten => 3,
            Self::Flash => 4,
            Self::Sunny => 9,
            Self::Cloudy => 10,
            Self::Shade => 11,
        }
    }
}

impl fmt::Display for LightSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightSource {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|source| source.as_str() == wanted)
            .ok_or_else(|| ParseError::new("light source", s))
    }
}
