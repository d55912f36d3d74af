//! Roll export: CSV, ExifTool command files and JSON.
//!
//! [`RollExport`] gathers a roll with everything its frames reference so the
//! writers never touch the database.

pub mod csv;
pub mod exiftool;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::config::ExifConfig;
use crate::error::{Error, ParseError, Result};
use crate::model::{Camera, FilmStock, Filter, Frame, Lens, Roll};
use crate::storage::{FrameSort, Storage};

/// A frame with its lens and filters resolved.
#[derive(Debug, Clone, Serialize)]
pub struct FrameExport {
    /// The frame itself.
    #[serde(flatten)]
    pub frame: Frame,
    /// Lens used, if any.
    pub lens: Option<Lens>,
    /// Filters used.
    pub filters: Vec<Filter>,
}

/// A roll with its camera, film stock and frames resolved.
#[derive(Debug, Clone, Serialize)]
pub struct RollExport {
    /// The roll itself.
    pub roll: Roll,
    /// Camera the roll was shot in.
    pub camera: Option<Camera>,
    /// Film stock of the roll.
    pub film_stock: Option<FilmStock>,
    /// Frames ordered by frame count.
    pub frames: Vec<FrameExport>,
}

impl RollExport {
    /// Load a roll and everything it references.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the roll does not exist.
    pub fn load(storage: &Storage, roll_id: i64) -> Result<Self> {
        let roll = storage
            .get_roll(roll_id)?
            .ok_or_else(|| Error::not_found("roll", roll_id))?;
        let camera = match roll.camera_id {
            Some(id) => storage.get_camera(id)?,
            None => None,
        };
        let film_stock = match roll.film_stock_id {
            Some(id) => storage.get_film_stock(id)?,
            None => None,
        };

        let mut frames = Vec::new();
        for frame in storage.list_frames(roll_id, FrameSort::Count)? {
            let lens = match frame.lens_id {
                Some(id) => storage.get_lens(id)?,
                None => None,
            };
            let mut filters = Vec::with_capacity(frame.filter_ids.len());
            for id in &frame.filter_ids {
                if let Some(filter) = storage.get_filter(*id)? {
                    filters.push(filter);
                }
            }
            frames.push(FrameExport { frame, lens, filters });
        }

        Ok(Self {
            roll,
            camera,
            film_stock,
            frames,
        })
    }

    /// Render the export in the given format.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn render(&self, format: ExportFormat, exif: &ExifConfig) -> Result<String> {
        match format {
            ExportFormat::Csv => Ok(csv::roll_to_csv(self, exif)),
            ExportFormat::Exiftool => Ok(exiftool::roll_to_commands(self, exif)),
            ExportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Output format of a roll export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma separated values.
    #[default]
    Csv,
    /// Shell commands for ExifTool.
    Exiftool,
    /// Pretty-printed JSON.
    Json,
}

impl ExportFormat {
    /// Conventional file extension.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Exiftool => "sh",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Csv => "csv",
            Self::Exiftool => "exiftool",
            Self::Json => "json",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "exiftool" | "sh" => Ok(Self::Exiftool),
            "json" => Ok(Self::Json),
            _ => Err(ParseError::new("export format", s)),
        }
    }
}
