use super::{
    aperture_values, compensation_values, reconcile, shutter_values, Aperture, CompIncrement,
    ExposureOffset, Increment, ShutterSpeed,
};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{Camera, Frame, Lens};

/// Longest focal length accepted anywhere, in millimetres.
pub const MAX_FOCAL_LENGTH: u32 = 1500;

/// The values a frame editor offers for one frame.
///
/// Built from the roll's camera and the frame's lens. When the camera or lens
/// changes the options are rebuilt and [`FrameValueOptions::reconcile`]
/// clears whatever the new lists no longer hold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameValueOptions {
    /// Shutter speeds, fastest first, ending with bulb.
    pub shutter_values: Vec<ShutterSpeed>,
    /// Apertures, widest first.
    pub aperture_values: Vec<Aperture>,
    /// Inclusive focal length range in millimetres.
    pub focal_length_range: (u32, u32),
    /// Exposure compensation values, most negative first.
    pub compensation_values: Vec<ExposureOffset>,
    /// Lenses that fit the roll's camera. `None` means any lens.
    pub lens_ids: Option<Vec<i64>>,
    /// Filters that fit the frame's lens. `None` means any filter.
    pub filter_ids: Option<Vec<i64>>,
}

impl FrameValueOptions {
    /// Build the options for a frame.
    ///
    /// `mountable_lenses` is consulted only with a camera and
    /// `mountable_filters` only with a lens.
    #[must_use]
    pub fn for_frame(
        camera: Option<&Camera>,
        lens: Option<&Lens>,
        mountable_lenses: &[i64],
        mountable_filters: &[i64],
    ) -> Self {
        let mut shutter = camera.map_or_else(
            || shutter_values(Increment::Third).to_vec(),
            Camera::shutter_values,
        );
        shutter.push(ShutterSpeed::Bulb);

        let aperture = lens.map_or_else(|| aperture_values(Increment::Third), Lens::aperture_values);

        let focal_length_range = lens
            .and_then(Lens::focal_range)
            .unwrap_or((0, MAX_FOCAL_LENGTH));

        let comp_increment = camera.map_or(CompIncrement::Third, |c| c.exposure_comp_increments);

        Self {
            shutter_values: shutter,
            aperture_values: aperture,
            focal_length_range,
            compensation_values: compensation_values(comp_increment),
            lens_ids: camera.map(|_| mountable_lenses.to_vec()),
            filter_ids: lens.map(|_| mountable_filters.to_vec()),
        }
    }

    /// Check that every value set on `frame` is on offer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] naming the first field that is not.
    pub fn check(&self, frame: &Frame) -> Result<()> {
        if let Some(shutter) = frame.shutter {
            if !self.shutter_values.contains(&shutter) {
                return Err(Error::invalid_value("shutter", shutter.to_string(), &self.shutter_values));
            }
        }
        if let Some(aperture) = frame.aperture {
            if !self.aperture_values.contains(&aperture) {
                return Err(Error::invalid_value(
                    "aperture",
                    aperture.to_string(),
                    &self.aperture_values,
                ));
            }
        }
        if let Some(focal) = frame.focal_length {
            let (min, max) = self.focal_length_range;
            if focal < min || focal > max {
                return Err(Error::InvalidValue {
                    field: "focal_length",
                    value: focal.to_string(),
                    allowed: format!("{min}-{max} mm"),
                });
            }
        }
        if let Some(comp) = frame.exposure_comp {
            if !self.compensation_values.contains(&comp) {
                return Err(Error::invalid_value(
                    "exposure_comp",
                    comp.to_string(),
                    &self.compensation_values,
                ));
            }
        }
        if let (Some(lens_id), Some(allowed)) = (frame.lens_id, &self.lens_ids) {
            if !allowed.contains(&lens_id) {
                return Err(Error::invalid_value("lens", lens_id.to_string(), allowed));
            }
        }
        if let Some(allowed) = &self.filter_ids {
            if let Some(filter_id) = frame.filter_ids.iter().find(|id| !allowed.contains(id)) {
                return Err(Error::invalid_value("filter", filter_id.to_string(), allowed));
            }
        }
        Ok(())
    }

    /// Clear the values on `frame` these options no longer offer.
    ///
    /// Returns the names of the cleared fields.
    pub fn reconcile(&self, frame: &mut Frame) -> Vec<&'static str> {
        let mut cleared = Vec::new();
        if reconcile(&self.shutter_values, &mut frame.shutter) {
            cleared.push("shutter");
        }
        if reconcile(&self.aperture_values, &mut frame.aperture) {
            cleared.push("aperture");
        }
        if reconcile(&self.compensation_values, &mut frame.exposure_comp) {
            cleared.push("exposure_comp");
        }
        let (min, max) = self.focal_length_range;
        if frame.focal_length.is_some_and(|f| f < min || f > max) {
            frame.focal_length = None;
            cleared.push("focal_length");
        }
        if let Some(allowed) = &self.lens_ids {
            if reconcile(allowed, &mut frame.lens_id) {
                cleared.push("lens");
            }
        }
        if let Some(allowed) = &self.filter_ids {
            let before = frame.filter_ids.len();
            frame.filter_ids.retain(|id| allowed.contains(id));
            if frame.filter_ids.len() != before {
                cleared.push("filters");
            }
        }
        cleared
    }
}
