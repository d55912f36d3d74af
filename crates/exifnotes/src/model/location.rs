use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseError, Result};

/// GPS coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl Location {
    /// Create a location, rejecting out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns a validation error if latitude is outside [-90, 90] or
    /// longitude outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::validation("location", format!("latitude {latitude} out of range")));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::validation("location", format!("longitude {longitude} out of range")));
        }
        Ok(Self { latitude, longitude })
    }

    /// Degrees, minutes and seconds with hemisphere letters,
    /// e.g. `60° 10' 11.6" N, 24° 56' 18.2" E`.
    #[must_use]
    pub fn to_dms(&self) -> String {
        format!(
            "{} {}, {} {}",
            dms(self.latitude),
            self.latitude_ref(),
            dms(self.longitude),
            self.longitude_ref()
        )
    }

    /// `N` or `S`.
    #[must_use]
    pub fn latitude_ref(&self) -> char {
        if self.latitude < 0.0 {
            'S'
        } else {
            'N'
        }
    }

    /// `E` or `W`.
    #[must_use]
    pub fn longitude_ref(&self) -> char {
        if self.longitude < 0.0 {
            'W'
        } else {
            'E'
        }
    }

    /// ExifTool GPS tag assignments.
    #[must_use]
    pub fn exif_args(&self) -> Vec<String> {
        vec![
            format!("-GPSLatitude={:.6}", self.latitude.abs()),
            format!("-GPSLatitudeRef={}", self.latitude_ref()),
            format!("-GPSLongitude={:.6}", self.longitude.abs()),
            format!("-GPSLongitudeRef={}", self.longitude_ref()),
        ]
    }
}

fn dms(decimal: f64) -> String {
    let abs = decimal.abs();
    let degrees = abs.trunc();
    let minutes_full = (abs - degrees) * 60.0;
    let minutes = minutes_full.trunc();
    let seconds = (minutes_full - minutes) * 60.0;
    format!("{degrees:.0}° {minutes:.0}' {seconds:.1}\"")
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} {:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for Location {
    type Err = ParseError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        let err = || ParseError::new("location", input);
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();
        let [lat, lng] = parts.as_slice() else {
            return Err(err());
        };
        let latitude: f64 = lat.parse().map_err(|_| err())?;
        let longitude: f64 = lng.parse().map_err(|_| err())?;
        Self::new(latitude, longitude).map_err(|_| err())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_ranges() {
        assert!(Location::new(60.17, 24.94).is_ok());
        assert!(Location::new(90.5, 0.0).is_err());
        assert!(Location::new(0.0, -180.5).is_err());
    }

    #[test]
    fn test_parse() {
        let loc: Location = "60.1699, 24.9384".parse().unwrap();
        assert!((loc.latitude - 60.1699).abs() < 1e-9);
        assert!((loc.longitude - 24.9384).abs() < 1e-9);

        let loc: Location = "-33.8688 151.2093".parse().unwrap();
        assert_eq!(loc.latitude_ref(), 'S');
        assert_eq!(loc.longitude_ref(), 'E');

        assert!("60.1699".parse::<Location>().is_err());
        assert!("north, east".parse::<Location>().is_err());
        assert!("95 10".parse::<Location>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let loc = Location::new(48.858_37, 2.294_481).unwrap();
        let back: Location = loc.to_string().parse().unwrap();
        assert!((back.latitude - loc.latitude).abs() < 1e-6);
        assert!((back.longitude - loc.longitude).abs() < 1e-6);
    }

    #[test]
    fn test_to_dms() {
        let loc = Location::new(60.5, -24.25).unwrap();
        assert_eq!(loc.to_dms(), "60° 30' 0.0\" N, 24° 15' 0.0\" W");
    }

    #[test]
    fn test_exif_args() {
        let loc = Location::new(-12.5, 130.25).unwrap();
        let args = loc.exif_args();
        assert_eq!(args[0], "-GPSLatitude=12.500000");
        assert_eq!(args[1], "-GPSLatitudeRef=S");
        assert_eq!(args[3], "-GPSLongitudeRef=E");
    }
}
