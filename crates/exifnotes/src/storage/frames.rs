use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    ensure_found, format_date, parsed_column, require_id, required_date_column,
    required_parsed_column, Storage,
};
use crate::error::{Error, ParseError, Result};
use crate::exposure::FrameValueOptions;
use crate::model::{Frame, Location, Roll};

const ENTITY: &str = "frame";

const SELECT_FRAME: &str = r"
    SELECT frames.id, frames.roll_id, frames.count, frames.date, frames.lens_id,
           frames.shutter, frames.aperture, frames.note, frames.latitude, frames.longitude,
           frames.formatted_address, frames.exposure_comp, frames.no_of_exposures,
           frames.flash_used, frames.focal_length, frames.light_source, frames.picture_filename
    FROM frames
";

/// Ordering of [`Storage::list_frames`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameSort {
    /// Frame number.
    #[default]
    Count,
    /// Exposure date.
    Date,
    /// Aperture, widest first. Frames without one go last.
    FStop,
    /// Shutter speed, fastest first. Frames without one go last.
    Shutter,
    /// Lens make and model. Frames without a lens go last.
    Lens,
}

impl fmt::Display for FrameSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::Date => write!(f, "date"),
            Self::FStop => write!(f, "f_stop"),
            Self::Shutter => write!(f, "shutter"),
            Self::Lens => write!(f, "lens"),
        }
    }
}

impl FromStr for FrameSort {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "count" => Ok(Self::Count),
            "date" => Ok(Self::Date),
            "f_stop" | "fstop" | "aperture" => Ok(Self::FStop),
            "shutter" => Ok(Self::Shutter),
            "lens" => Ok(Self::Lens),
            _ => Err(ParseError::new("frame sort", s)),
        }
    }
}

/// `None` sorts after every value.
fn none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl Storage {
    /// Insert a frame and its filter links in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the roll does not exist, a validation error for
    /// an invalid frame, or a database error.
    pub fn add_frame(&self, frame: &Frame) -> Result<i64> {
        frame.validate()?;
        if self.get_roll(frame.roll_id)?.is_none() {
            return Err(Error::not_found("roll", frame.roll_id));
        }

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            r"
            INSERT INTO frames (roll_id, count, date, lens_id, shutter, aperture, note,
                                latitude, longitude, formatted_address, exposure_comp,
                                no_of_exposures, flash_used, focal_length, light_source,
                                picture_filename)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            ",
            params![
                frame.roll_id,
                frame.count,
                format_date(&frame.date),
                frame.lens_id,
                frame.shutter.map(|s| s.to_string()),
                frame.aperture.map(|a| a.to_string()),
                frame.note,
                frame.location.map(|l| l.latitude),
                frame.location.map(|l| l.longitude),
                frame.formatted_address,
                frame.exposure_comp.map(|c| c.to_string()),
                frame.no_of_exposures,
                frame.flash_used,
                frame.focal_length,
                frame.light_source.as_str(),
                frame.picture_filename,
            ],
        )?;
        let id = tx.last_insert_rowid();
        write_frame_filters(&tx, id, &frame.filter_ids)?;
        tx.commit()?;

        debug!("Inserted frame {} (#{} on roll {})", id, frame.count, frame.roll_id);
        Ok(id)
    }

    /// Overwrite a stored frame and replace its filter links.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no frame has the record's id.
    pub fn update_frame(&self, frame: &Frame) -> Result<()> {
        let id = require_id(ENTITY, frame.id)?;
        frame.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        let affected = tx.execute(
            r"
            UPDATE frames SET roll_id = ?2, count = ?3, date = ?4, lens_id = ?5, shutter = ?6,
                              aperture = ?7, note = ?8, latitude = ?9, longitude = ?10,
                              formatted_address = ?11, exposure_comp = ?12,
                              no_of_exposures = ?13, flash_used = ?14, focal_length = ?15,
                              light_source = ?16, picture_filename = ?17
            WHERE id = ?1
            ",
            params![
                id,
                frame.roll_id,
                frame.count,
                format_date(&frame.date),
                frame.lens_id,
                frame.shutter.map(|s| s.to_string()),
                frame.aperture.map(|a| a.to_string()),
                frame.note,
                frame.location.map(|l| l.latitude),
                frame.location.map(|l| l.longitude),
                frame.formatted_address,
                frame.exposure_comp.map(|c| c.to_string()),
                frame.no_of_exposures,
                frame.flash_used,
                frame.focal_length,
                frame.light_source.as_str(),
                frame.picture_filename,
            ],
        )?;
        ensure_found(ENTITY, id, affected)?;
        tx.execute("DELETE FROM link_frame_filter WHERE frame_id = ?1", [id])?;
        write_frame_filters(&tx, id, &frame.filter_ids)?;
        tx.commit()?;

        debug!("Updated frame {}", id);
        Ok(())
    }

    /// Get a frame by id, filters included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_frame(&self, id: i64) -> Result<Option<Frame>> {
        let frame = self
            .conn
            .query_row(&format!("{SELECT_FRAME} WHERE frames.id = ?1"), [id], row_to_frame)
            .optional()?;
        match frame {
            Some(mut frame) => {
                frame.filter_ids = self.frame_filter_ids(id)?;
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }

    /// Frames of a roll in the requested order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_frames(&self, roll_id: i64, sort: FrameSort) -> Result<Vec<Frame>> {
        let order = match sort {
            FrameSort::Date => "frames.date, frames.count",
            FrameSort::Lens => {
                "lenses.id IS NULL, lenses.make COLLATE NOCASE, lenses.model COLLATE NOCASE, frames.count"
            }
            FrameSort::Count | FrameSort::FStop | FrameSort::Shutter => "frames.count, frames.id",
        };
        let sql = format!(
            "{SELECT_FRAME} LEFT JOIN lenses ON lenses.id = frames.lens_id \
             WHERE frames.roll_id = ?1 ORDER BY {order}"
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut frames = stmt
            .query_map([roll_id], row_to_frame)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Stored as display text, so these orderings are applied here.
        match sort {
            FrameSort::FStop => frames.sort_by(|a, b| none_last(a.aperture, b.aperture)),
            FrameSort::Shutter => frames.sort_by(|a, b| none_last(a.shutter, b.shutter)),
            _ => {}
        }

        for frame in &mut frames {
            if let Some(id) = frame.id {
                frame.filter_ids = self.frame_filter_ids(id)?;
            }
        }
        Ok(frames)
    }

    /// Delete a frame.
    ///
    /// Returns `true` if a frame was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_frame(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM frames WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted frame {}", id);
        }
        Ok(affected > 0)
    }

    /// Frame number that follows the highest on the roll.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn next_frame_count(&self, roll_id: i64) -> Result<u32> {
        let last: Option<u32> = self.conn.query_row(
            "SELECT MAX(count) FROM frames WHERE roll_id = ?1",
            [roll_id],
            |row| row.get(0),
        )?;
        Ok(last.map_or(1, |count| count + 1))
    }

    /// An unsaved frame for the next exposure on a roll.
    ///
    /// The count follows the highest stored frame and the date is now. Lens,
    /// focal length and filters are copied from that frame.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the roll does not exist.
    pub fn new_frame_for_roll(&self, roll_id: i64) -> Result<Frame> {
        if self.get_roll(roll_id)?.is_none() {
            return Err(Error::not_found("roll", roll_id));
        }
        let last_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM frames WHERE roll_id = ?1 ORDER BY count DESC, id DESC LIMIT 1",
                [roll_id],
                |row| row.get(0),
            )
            .optional()?;

        match last_id {
            Some(id) => {
                let previous = self
                    .get_frame(id)?
                    .ok_or_else(|| Error::not_found(ENTITY, id))?;
                Ok(Frame::next_after(&previous))
            }
            None => Ok(Frame::new(roll_id, 1)),
        }
    }

    /// The values a frame on `roll` may take with the given lens.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the roll's camera or the lens does not exist.
    pub fn frame_options(&self, roll: &Roll, lens_id: Option<i64>) -> Result<FrameValueOptions> {
        let camera = match roll.camera_id {
            Some(id) => Some(self.get_camera(id)?.ok_or_else(|| Error::not_found("camera", id))?),
            None => None,
        };
        let lens = match lens_id {
            Some(id) => Some(self.get_lens(id)?.ok_or_else(|| Error::not_found("lens", id))?),
            None => None,
        };

        let mountable_lenses: Vec<i64> = match roll.camera_id {
            Some(id) => self.lenses_for_camera(id)?.into_iter().filter_map(|l| l.id).collect(),
            None => Vec::new(),
        };
        let mountable_filters: Vec<i64> = match lens_id {
            Some(id) => self.filters_for_lens(id)?.into_iter().filter_map(|f| f.id).collect(),
            None => Vec::new(),
        };

        Ok(FrameValueOptions::for_frame(
            camera.as_ref(),
            lens.as_ref(),
            &mountable_lenses,
            &mountable_filters,
        ))
    }

    fn frame_filter_ids(&self, frame_id: i64) -> Result<Vec<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT filter_id FROM link_frame_filter WHERE frame_id = ?1 ORDER BY filter_id")?;
        let ids = stmt
            .query_map([frame_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ids)
    }
}

fn write_frame_filters(conn: &Connection, frame_id: i64, filter_ids: &[i64]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO link_frame_filter (frame_id, filter_id) VALUES (?1, ?2)")?;
    for filter_id in filter_ids {
        stmt.execute([frame_id, *filter_id])?;
    }
    Ok(())
}

fn row_to_frame(row: &Row) -> rusqlite::Result<Frame> {
    let latitude: Option<f64> = row.get(8)?;
    let longitude: Option<f64> = row.get(9)?;
    Ok(Frame {
        id: Some(row.get(0)?),
        roll_id: row.get(1)?,
        count: row.get(2)?,
        date: required_date_column(row, 3)?,
        lens_id: row.get(4)?,
        shutter: parsed_column(row, 5)?,
        aperture: parsed_column(row, 6)?,
        note: row.get(7)?,
        location: latitude
            .zip(longitude)
            .map(|(latitude, longitude)| Location { latitude, longitude }),
        formatted_address: row.get(10)?,
        exposure_comp: parsed_column(row, 11)?,
        no_of_exposures: row.get(12)?,
        flash_used: row.get(13)?,
        focal_length: row.get(14)?,
        light_source: required_parsed_column(row, 15)?,
        picture_filename: row.get(16)?,
        filter_ids: Vec::new(),
    })
}
