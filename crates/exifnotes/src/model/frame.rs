use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{now_local, LightSource, Location};
use crate::error::{Error, Result};
use crate::exposure::{Aperture, ExposureOffset, ShutterSpeed, MAX_FOCAL_LENGTH};

const ENTITY: &str = "frame";

/// Highest frame number accepted on a roll.
pub const MAX_FRAME_COUNT: u32 = 100;

/// One exposure on a roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Roll the frame belongs to.
    pub roll_id: i64,
    /// Frame number on the roll.
    pub count: u32,
    /// When the exposure was made.
    pub date: NaiveDateTime,
    /// Lens used.
    pub lens_id: Option<i64>,
    /// Shutter speed used.
    pub shutter: Option<ShutterSpeed>,
    /// Aperture used.
    pub aperture: Option<Aperture>,
    /// Free-text note.
    pub note: Option<String>,
    /// Where the exposure was made.
    pub location: Option<Location>,
    /// Address resolved for `location`.
    pub formatted_address: Option<String>,
    /// Exposure compensation dialled in.
    pub exposure_comp: Option<ExposureOffset>,
    /// Number of exposures on this frame, more than one for multiple exposures.
    pub no_of_exposures: u32,
    /// Whether flash was fired.
    pub flash_used: bool,
    /// Focal length in millimetres.
    pub focal_length: Option<u32>,
    /// Light source.
    pub light_source: LightSource,
    /// File name of the complementary picture.
    pub picture_filename: Option<String>,
    /// Filters used, by id.
    pub filter_ids: Vec<i64>,
}

impl Frame {
    /// Create an empty frame dated now.
    #[must_use]
    pub fn new(roll_id: i64, count: u32) -> Self {
        Self {
            id: None,
            roll_id,
            count,
            date: now_local(),
            lens_id: None,
            shutter: None,
            aperture: None,
            note: None,
            location: None,
            formatted_address: None,
            exposure_comp: None,
            no_of_exposures: 1,
            flash_used: false,
            focal_length: None,
            light_source: LightSource::default(),
            picture_filename: None,
            filter_ids: Vec::new(),
        }
    }

    /// The frame that follows `previous` on the same roll.
    ///
    /// Lens, focal length and filters carry over; exposure values and
    /// notes start blank.
    #[must_use]
    pub fn next_after(previous: &Frame) -> Self {
        let mut next = Self::new(previous.roll_id, previous.count + 1);
        next.lens_id = previous.lens_id;
        next.focal_length = previous.focal_length;
        next.filter_ids.clone_from(&previous.filter_ids);
        next
    }

    /// Check the frame before it is written.
    ///
    /// This covers only what the frame knows about itself. Values that
    /// depend on the roll's camera and the chosen lens are checked by
    /// [`crate::exposure::FrameValueOptions::check`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a count above [`MAX_FRAME_COUNT`],
    /// zero exposures or an impossible focal length.
    pub fn validate(&self) -> Result<()> {
        if self.count > MAX_FRAME_COUNT {
            return Err(Error::validation(
                ENTITY,
                format!("frame count {} exceeds {MAX_FRAME_COUNT}", self.count),
            ));
        }
        if self.no_of_exposures == 0 {
            return Err(Error::validation(ENTITY, "number of exposures must be at least 1"));
        }
        if let Some(focal) = self.focal_length {
            if focal == 0 || focal > MAX_FOCAL_LENGTH {
                return Err(Error::validation(
                    ENTITY,
                    format!("focal length {focal} mm is out of range"),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_defaults() {
        let frame = Frame::new(3, 1);
        assert_eq!(frame.roll_id, 3);
        assert_eq!(frame.no_of_exposures, 1);
        assert_eq!(frame.light_source, LightSource::Unknown);
        assert!(frame.validate().is_ok());
    }

    #[test]
    fn test_next_after_carries_equipment() {
        let mut first = Frame::new(1, 5);
        first.lens_id = Some(9);
        first.focal_length = Some(50);
        first.filter_ids = vec![2, 4];
        first.shutter = Some(ShutterSpeed::Fraction(125));
        first.note = Some("window light".to_string());

        let next = Frame::next_after(&first);
        assert_eq!(next.count, 6);
        assert_eq!(next.lens_id, Some(9));
        assert_eq!(next.focal_length, Some(50));
        assert_eq!(next.filter_ids, vec![2, 4]);
        assert!(next.shutter.is_none());
        assert!(next.note.is_none());
        assert!(next.id.is_none());
    }

    #[test]
    fn test_validate_limits() {
        let mut frame = Frame::new(1, MAX_FRAME_COUNT + 1);
        assert!(frame.validate().is_err());

        frame.count = 12;
        frame.no_of_exposures = 0;
        assert!(frame.validate().is_err());

        frame.no_of_exposures = 2;
        frame.focal_length = Some(0);
        assert!(frame.validate().is_err());

        frame.focal_length = Some(85);
        assert!(frame.validate().is_ok());
    }
}
