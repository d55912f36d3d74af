use std::fmt;

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::{Error, Result};
use crate::exposure::{aperture_range, aperture_values, reconcile, Aperture, Increment, MAX_FOCAL_LENGTH};

const ENTITY: &str = "lens";

/// An interchangeable lens.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lens {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Lens serial number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Widest aperture (smallest f-number).
    pub min_aperture: Option<Aperture>,
    /// Narrowest aperture (largest f-number).
    pub max_aperture: Option<Aperture>,
    /// Shortest focal length in millimetres.
    pub min_focal_length: Option<u32>,
    /// Longest focal length in millimetres.
    pub max_focal_length: Option<u32>,
    /// Step of the aperture ring.
    pub aperture_increments: Increment,
}

impl Lens {
    /// Create a lens with default increments and no ranges.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Apertures this lens offers, widest first.
    #[must_use]
    pub fn aperture_values(&self) -> Vec<Aperture> {
        match (self.min_aperture, self.max_aperture) {
            (Some(min), Some(max)) => aperture_range(self.aperture_increments, min, max),
            _ => aperture_values(self.aperture_increments),
        }
    }

    /// Focal lengths this lens covers, or `None` when not recorded.
    #[must_use]
    pub fn focal_range(&self) -> Option<(u32, u32)> {
        self.min_focal_length.zip(self.max_focal_length)
    }

    /// Check whether the lens is a prime.
    #[must_use]
    pub fn is_prime(&self) -> bool {
        matches!(self.focal_range(), Some((min, max)) if min == max)
    }

    /// Switch the aperture increment and drop bounds the new ring does not
    /// have.
    ///
    /// Returns `true` if the aperture range was cleared.
    pub fn set_aperture_increments(&mut self, increment: Increment) -> bool {
        self.aperture_increments = increment;
        let list = aperture_values(increment);
        let min_cleared = reconcile(&list, &mut self.min_aperture);
        let max_cleared = reconcile(&list, &mut self.max_aperture);
        if min_cleared || max_cleared {
            self.min_aperture = None;
            self.max_aperture = None;
            true
        } else {
            false
        }
    }

    /// Check the lens before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when make or model is blank, or when the
    /// aperture or focal range is incomplete or inverted.
    pub fn validate(&self) -> Result<()> {
        require_text(ENTITY, "make", &self.make)?;
        require_text(ENTITY, "model", &self.model)?;
        self.validate_apertures()?;
        self.validate_focal_lengths()
    }

    fn validate_apertures(&self) -> Result<()> {
        match (self.min_aperture, self.max_aperture) {
            (None, None) => Ok(()),
            (Some(min), Some(max)) => {
                if min >= max {
                    return Err(Error::validation(
                        ENTITY,
                        format!("minimum aperture f/{min} must be wider than maximum f/{max}"),
                    ));
                }
                let list = aperture_values(self.aperture_increments);
                for bound in [min, max] {
                    if !list.contains(&bound) {
                        return Err(Error::validation(
                            ENTITY,
                            format!("f/{bound} is not a {} stop aperture", self.aperture_increments),
                        ));
                    }
                }
                Ok(())
            }
            _ => Err(Error::validation(
                ENTITY,
                "set both minimum and maximum aperture or neither",
            )),
        }
    }

    fn validate_focal_lengths(&self) -> Result<()> {
        match (self.min_focal_length, self.max_focal_length) {
            (None, None) => Ok(()),
            (Some(min), Some(max)) => {
                if min == 0 || min > max {
                    Err(Error::validation(
                        ENTITY,
                        format!("focal range {min}-{max} mm is invalid"),
                    ))
                } else if max > MAX_FOCAL_LENGTH {
                    Err(Error::validation(
                        ENTITY,
                        format!("focal length cannot exceed {MAX_FOCAL_LENGTH} mm"),
                    ))
                } else {
                    Ok(())
                }
            }
            _ => Err(Error::validation(
                ENTITY,
                "set both minimum and maximum focal length or neither",
            )),
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zoom() -> Lens {
        let mut lens = Lens::new("Nikon", "Zoom-Nikkor 35-70mm f/3.3-4.5");
        lens.min_aperture = "3.5".parse().ok();
        lens.max_aperture = "22".parse().ok();
        lens.min_focal_length = Some(35);
        lens.max_focal_length = Some(70);
        lens
    }

    #[test]
    fn test_valid_lens() {
        assert!(zoom().validate().is_ok());
        assert!(Lens::new("Zeiss", "Planar 50").validate().is_ok());
    }

    #[test]
    fn test_blank_model_rejected() {
        assert!(Lens::new("Zeiss", "").validate().is_err());
    }

    #[test]
    fn test_inverted_aperture_rejected() {
        let mut lens = zoom();
        std::mem::swap(&mut lens.min_aperture, &mut lens.max_aperture);
        assert!(lens.validate().is_err());
    }

    #[test]
    fn test_half_focal_range_rejected() {
        let mut lens = zoom();
        lens.max_focal_length = None;
        assert!(lens.validate().is_err());
    }

    #[test]
    fn test_focal_bounds() {
        let mut lens = zoom();
        lens.min_focal_length = Some(80);
        assert!(lens.validate().is_err());

        lens.min_focal_length = Some(50);
        lens.max_focal_length = Some(50);
        assert!(lens.validate().is_ok());
        assert!(lens.is_prime());

        lens.max_focal_length = Some(MAX_FOCAL_LENGTH + 1);
        assert!(lens.validate().is_err());
    }

    #[test]
    fn test_aperture_values_follow_range() {
        let values: Vec<String> = zoom().aperture_values().iter().map(ToString::to_string).collect();
        assert_eq!(values.first().map(String::as_str), Some("3.5"));
        assert_eq!(values.last().map(String::as_str), Some("22"));
    }

    #[test]
    fn test_increment_change_clears_off_ring_bounds() {
        let mut lens = zoom();
        // 3.5 is not a full stop
        assert!(lens.set_aperture_increments(Increment::Full));
        assert!(lens.min_aperture.is_none());
        assert!(lens.max_aperture.is_none());
        assert_eq!(lens.aperture_increments, Increment::Full);
    }
}
