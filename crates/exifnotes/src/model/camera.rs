use std::fmt;

use serde::{Deserialize, Serialize};

use super::require_text;
use crate::error::{Error, Result};
use crate::exposure::{reconcile, shutter_range, shutter_values, CompIncrement, Increment, ShutterSpeed};

const ENTITY: &str = "camera";

/// A camera body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Body serial number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    /// Fastest shutter speed.
    pub min_shutter: Option<ShutterSpeed>,
    /// Slowest timed shutter speed.
    pub max_shutter: Option<ShutterSpeed>,
    /// Step of the shutter speed dial.
    pub shutter_increments: Increment,
    /// Step of the exposure compensation dial.
    pub exposure_comp_increments: CompIncrement,
}

impl Camera {
    /// Create a camera with default increments and no shutter range.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            ..Self::default()
        }
    }

    /// Shutter speeds this camera offers, fastest first, without bulb.
    #[must_use]
    pub fn shutter_values(&self) -> Vec<ShutterSpeed> {
        match (self.min_shutter, self.max_shutter) {
            (Some(min), Some(max)) => shutter_range(self.shutter_increments, min, max),
            _ => shutter_values(self.shutter_increments).to_vec(),
        }
    }

    /// Switch the shutter increment and drop range bounds the new dial does
    /// not have.
    ///
    /// Returns `true` if the range was cleared.
    pub fn set_shutter_increments(&mut self, increment: Increment) -> bool {
        self.shutter_increments = increment;
        let list = shutter_values(increment);
        let min_cleared = reconcile(list, &mut self.min_shutter);
        let max_cleared = reconcile(list, &mut self.max_shutter);
        if min_cleared || max_cleared {
            self.min_shutter = None;
            self.max_shutter = None;
            true
        } else {
            false
        }
    }

    /// Check the camera before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when make or model is blank or the
    /// shutter range is incomplete, inverted or off the dial.
    pub fn validate(&self) -> Result<()> {
        require_text(ENTITY, "make", &self.make)?;
        require_text(ENTITY, "model", &self.model)?;

        match (self.min_shutter, self.max_shutter) {
            (None, None) => Ok(()),
            (Some(min), Some(max)) => {
                if min.is_bulb() || max.is_bulb() {
                    return Err(Error::validation(ENTITY, "bulb cannot bound the shutter range"));
                }
                if min >= max {
                    return Err(Error::validation(
                        ENTITY,
                        format!("minimum shutter {min} must be faster than maximum {max}"),
                    ));
                }
                let list = shutter_values(self.shutter_increments);
                for bound in [min, max] {
                    if !list.contains(&bound) {
                        return Err(Error::validation(
                            ENTITY,
                            format!("{bound} is not a {} stop shutter speed", self.shutter_increments),
                        ));
                    }
                }
                Ok(())
            }
            _ => Err(Error::validation(
                ENTITY,
                "set both minimum and maximum shutter or neither",
            )),
        }
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}
