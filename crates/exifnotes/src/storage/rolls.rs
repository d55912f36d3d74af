use std::fmt;
use std::str::FromStr;

use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    date_column, ensure_found, format_date, parsed_column, require_id, required_date_column,
    required_parsed_column, Storage,
};
use crate::error::{ParseError, Result};
use crate::model::Roll;

const ENTITY: &str = "roll";

const SELECT_ROLL: &str = r"
    SELECT rolls.id, rolls.name, rolls.date, rolls.unloaded, rolls.developed, rolls.note,
           rolls.camera_id, rolls.film_stock_id, rolls.iso, rolls.push_pull, rolls.format,
           rolls.archived
    FROM rolls
";

/// Which rolls [`Storage::list_rolls`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollFilter {
    /// Rolls not archived.
    #[default]
    Active,
    /// Archived rolls only.
    Archived,
    /// Everything.
    All,
}

/// Ordering of [`Storage::list_rolls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollSort {
    /// Newest load date first.
    #[default]
    Date,
    /// By name.
    Name,
    /// By camera make and model, then newest first.
    Camera,
}

impl fmt::Display for RollSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Name => write!(f, "name"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

impl FromStr for RollSort {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "name" => Ok(Self::Name),
            "camera" => Ok(Self::Camera),
            _ => Err(ParseError::new("roll sort", s)),
        }
    }
}

/// A roll with what a roll list shows beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSummary {
    /// The roll itself.
    #[serde(flatten)]
    pub roll: Roll,
    /// Number of frames on the roll.
    pub frame_count: u32,
    /// "Make model" of the roll's camera.
    pub camera: Option<String>,
    /// "Make model" of the roll's film stock.
    pub film_stock: Option<String>,
}

impl Storage {
    /// Insert a roll and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid roll, or a database error.
    pub fn add_roll(&self, roll: &Roll) -> Result<i64> {
        roll.validate()?;
        self.conn.execute(
            r"
            INSERT INTO rolls (name, date, unloaded, developed, note, camera_id, film_stock_id,
                               iso, push_pull, format, archived)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                roll.name.trim(),
                format_date(&roll.date),
                roll.unloaded.as_ref().map(format_date),
                roll.developed.as_ref().map(format_date),
                roll.note,
                roll.camera_id,
                roll.film_stock_id,
                roll.iso,
                roll.push_pull.map(|p| p.to_string()),
                roll.format.as_str(),
                roll.archived,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted roll {} ({})", id, roll.name);
        Ok(id)
    }

    /// Overwrite a stored roll.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no roll has the record's id.
    pub fn update_roll(&self, roll: &Roll) -> Result<()> {
        let id = require_id(ENTITY, roll.id)?;
        roll.validate()?;
        let affected = self.conn.execute(
            r"
            UPDATE rolls SET name = ?2, date = ?3, unloaded = ?4, developed = ?5, note = ?6,
                             camera_id = ?7, film_stock_id = ?8, iso = ?9, push_pull = ?10,
                             format = ?11, archived = ?12
            WHERE id = ?1
            ",
            params![
                id,
                roll.name.trim(),
                format_date(&roll.date),
                roll.unloaded.as_ref().map(format_date),
                roll.developed.as_ref().map(format_date),
                roll.note,
                roll.camera_id,
                roll.film_stock_id,
                roll.iso,
                roll.push_pull.map(|p| p.to_string()),
                roll.format.as_str(),
                roll.archived,
            ],
        )?;
        ensure_found(ENTITY, id, affected)?;
        debug!("Updated roll {}", id);
        Ok(())
    }

    /// Get a roll by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_roll(&self, id: i64) -> Result<Option<Roll>> {
        let roll = self
            .conn
            .query_row(&format!("{SELECT_ROLL} WHERE rolls.id = ?1"), [id], row_to_roll)
            .optional()?;
        Ok(roll)
    }

    /// Rolls with their frame counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_rolls(&self, filter: RollFilter, sort: RollSort) -> Result<Vec<RollSummary>> {
        let condition = match filter {
            RollFilter::Active => "WHERE rolls.archived = 0",
            RollFilter::Archived => "WHERE rolls.archived = 1",
            RollFilter::All => "",
        };
        let order = match sort {
            RollSort::Date => "rolls.date DESC, rolls.id DESC",
            RollSort::Name => "rolls.name COLLATE NOCASE, rolls.date DESC",
            RollSort::Camera => {
                "cameras.id IS NULL, cameras.make COLLATE NOCASE, cameras.model COLLATE NOCASE, rolls.date DESC"
            }
        };
        let sql = format!(
            r"
            SELECT rolls.id, rolls.name, rolls.date, rolls.unloaded, rolls.developed, rolls.note,
                   rolls.camera_id, rolls.film_stock_id, rolls.iso, rolls.push_pull,
                   rolls.format, rolls.archived,
                   (SELECT COUNT(*) FROM frames WHERE frames.roll_id = rolls.id),
                   cameras.make || ' ' || cameras.model,
                   film_stocks.make || ' ' || film_stocks.model
            FROM rolls
            LEFT JOIN cameras ON cameras.id = rolls.camera_id
            LEFT JOIN film_stocks ON film_stocks.id = rolls.film_stock_id
            {condition}
            ORDER BY {order}
            "
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rolls = stmt
            .query_map([], |row| {
                Ok(RollSummary {
                    roll: row_to_roll(row)?,
                    frame_count: row.get(12)?,
                    camera: row.get(13)?,
                    film_stock: row.get(14)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rolls)
    }

    /// Archive or restore a roll.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the roll does not exist.
    pub fn set_roll_archived(&self, id: i64, archived: bool) -> Result<()> {
        let affected = self.conn.execute(
            "UPDATE rolls SET archived = ?2 WHERE id = ?1",
            params![id, archived],
        )?;
        ensure_found(ENTITY, id, affected)?;
        debug!("Set roll {} archived={}", id, archived);
        Ok(())
    }

    /// Delete a roll and all of its frames.
    ///
    /// Returns `true` if a roll was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_roll(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM rolls WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted roll {}", id);
        }
        Ok(affected > 0)
    }
}

fn row_to_roll(row: &Row) -> rusqlite::Result<Roll> {
    Ok(Roll {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        date: required_date_column(row, 2)?,
        unloaded: date_column(row, 3)?,
        developed: date_column(row, 4)?,
        note: row.get(5)?,
        camera_id: row.get(6)?,
        film_stock_id: row.get(7)?,
        iso: row.get(8)?,
        push_pull: parsed_column(row, 9)?,
        format: required_parsed_column(row, 10)?,
        archived: row.get(11)?,
    })
}
