use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{ensure_found, require_id, Storage};
use crate::error::Result;
use crate::model::Filter;

const ENTITY: &str = "filter";

pub(super) const SELECT_FILTER: &str = "SELECT filters.id, filters.make, filters.model FROM filters";

impl Storage {
    /// Insert a filter and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid filter, or a database error.
    pub fn add_filter(&self, filter: &Filter) -> Result<i64> {
        filter.validate()?;
        self.conn.execute(
            "INSERT INTO filters (make, model) VALUES (?1, ?2)",
            params![filter.make.trim(), filter.model.trim()],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted filter {} ({})", id, filter);
        Ok(id)
    }

    /// Overwrite a stored filter.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no filter has the record's id.
    pub fn update_filter(&self, filter: &Filter) -> Result<()> {
        let id = require_id(ENTITY, filter.id)?;
        filter.validate()?;
        let affected = self.conn.execute(
            "UPDATE filters SET make = ?2, model = ?3 WHERE id = ?1",
            params![id, filter.make.trim(), filter.model.trim()],
        )?;
        ensure_found(ENTITY, id, affected)
    }

    /// Get a filter by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_filter(&self, id: i64) -> Result<Option<Filter>> {
        let filter = self
            .conn
            .query_row(&format!("{SELECT_FILTER} WHERE filters.id = ?1"), [id], row_to_filter)
            .optional()?;
        Ok(filter)
    }

    /// All filters ordered by make and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_filters(&self) -> Result<Vec<Filter>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_FILTER} ORDER BY filters.make COLLATE NOCASE, filters.model COLLATE NOCASE"
        ))?;
        let filters = stmt
            .query_map([], row_to_filter)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(filters)
    }

    /// Delete a filter along with its lens and frame links.
    ///
    /// Returns `true` if a filter was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_filter(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM filters WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    /// Check whether any frame used the filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_filter_in_use(&self, id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM link_frame_filter WHERE filter_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

pub(super) fn row_to_filter(row: &Row) -> rusqlite::Result<Filter> {
    Ok(Filter {
        id: Some(row.get(0)?),
        make: row.get(1)?,
        model: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frame, Roll};

    #[test]
    fn test_crud() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.add_filter(&Filter::new(" Hoya ", "K2")).unwrap();

        let mut filter = storage.get_filter(id).unwrap().unwrap();
        assert_eq!(filter.make, "Hoya");

        filter.model = "X0".to_string();
        storage.update_filter(&filter).unwrap();
        assert_eq!(storage.list_filters().unwrap(), vec![filter]);

        assert!(storage.delete_filter(id).unwrap());
        assert!(storage.get_filter(id).unwrap().is_none());
    }

    #[test]
    fn test_blank_filter_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.add_filter(&Filter::new("Hoya", " ")).is_err());
    }

    #[test]
    fn test_delete_removes_frame_links() {
        let storage = Storage::open_in_memory().unwrap();
        let filter_id = storage.add_filter(&Filter::new("B+W", "090 red")).unwrap();
        let roll_id = storage.add_roll(&Roll::new("Red")).unwrap();
        let mut frame = Frame::new(roll_id, 1);
        frame.filter_ids = vec![filter_id];
        let frame_id = storage.add_frame(&frame).unwrap();

        assert!(storage.is_filter_in_use(filter_id).unwrap());
        assert!(storage.delete_filter(filter_id).unwrap());
        assert!(storage.get_frame(frame_id).unwrap().unwrap().filter_ids.is_empty());
    }
}
