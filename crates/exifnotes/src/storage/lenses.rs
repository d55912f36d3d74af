use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{ensure_found, parsed_column, require_id, required_parsed_column, Storage};
use crate::error::Result;
use crate::model::Lens;

const ENTITY: &str = "lens";

pub(super) const SELECT_LENS: &str = r"
    SELECT lenses.id, lenses.make, lenses.model, lenses.serial_number,
           lenses.min_aperture, lenses.max_aperture,
           lenses.min_focal_length, lenses.max_focal_length, lenses.aperture_increments
    FROM lenses
";

impl Storage {
    /// Insert a lens and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid lens, or a database error.
    pub fn add_lens(&self, lens: &Lens) -> Result<i64> {
        lens.validate()?;
        self.conn.execute(
            r"
            INSERT INTO lenses (make, model, serial_number, min_aperture, max_aperture,
                                min_focal_length, max_focal_length, aperture_increments)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ",
            params![
                lens.make.trim(),
                lens.model.trim(),
                lens.serial_number,
                lens.min_aperture.map(|a| a.to_string()),
                lens.max_aperture.map(|a| a.to_string()),
                lens.min_focal_length,
                lens.max_focal_length,
                lens.aperture_increments.to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted lens {} ({})", id, lens);
        Ok(id)
    }

    /// Overwrite a stored lens.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no lens has the record's id.
    pub fn update_lens(&self, lens: &Lens) -> Result<()> {
        let id = require_id(ENTITY, lens.id)?;
        lens.validate()?;
        let affected = self.conn.execute(
            r"
            UPDATE lenses SET make = ?2, model = ?3, serial_number = ?4, min_aperture = ?5,
                              max_aperture = ?6, min_focal_length = ?7,
                              max_focal_length = ?8, aperture_increments = ?9
            WHERE id = ?1
            ",
            params![
                id,
                lens.make.trim(),
                lens.model.trim(),
                lens.serial_number,
                lens.min_aperture.map(|a| a.to_string()),
                lens.max_aperture.map(|a| a.to_string()),
                lens.min_focal_length,
                lens.max_focal_length,
                lens.aperture_increments.to_string(),
            ],
        )?;
        ensure_found(ENTITY, id, affected)?;
        debug!("Updated lens {}", id);
        Ok(())
    }

    /// Get a lens by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_lens(&self, id: i64) -> Result<Option<Lens>> {
        let lens = self
            .conn
            .query_row(&format!("{SELECT_LENS} WHERE lenses.id = ?1"), [id], row_to_lens)
            .optional()?;
        Ok(lens)
    }

    /// All lenses ordered by make and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_lenses(&self) -> Result<Vec<Lens>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_LENS} ORDER BY lenses.make COLLATE NOCASE, lenses.model COLLATE NOCASE"
        ))?;
        let lenses = stmt
            .query_map([], row_to_lens)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lenses)
    }

    /// Delete a lens. Frames shot with it lose the reference and its
    /// mountable links are removed.
    ///
    /// Returns `true` if a lens was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_lens(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM lenses WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted lens {}", id);
        }
        Ok(affected > 0)
    }

    /// Check whether any frame references the lens.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_lens_in_use(&self, id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM frames WHERE lens_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

pub(super) fn row_to_lens(row: &Row) -> rusqlite::Result<Lens> {
    Ok(Lens {
        id: Some(row.get(0)?),
        make: row.get(1)?,
        model: row.get(2)?,
        serial_number: row.get(3)?,
        min_aperture: parsed_column(row, 4)?,
        max_aperture: parsed_column(row, 5)?,
        min_focal_length: row.get(6)?,
        max_focal_length: row.get(7)?,
        aperture_increments: required_parsed_column(row, 8)?,
    })
}
