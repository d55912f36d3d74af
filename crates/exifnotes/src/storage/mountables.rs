//! Which lenses fit which cameras and which filters fit which lenses.

use rusqlite::params;
use tracing::debug;

use super::cameras::row_to_camera;
use super::filters::{row_to_filter, SELECT_FILTER};
use super::lenses::{row_to_lens, SELECT_LENS};
use super::Storage;
use crate::error::{Error, Result};
use crate::model::{Camera, Filter, Lens};

impl Storage {
    /// Mark a lens as mountable on a camera. Linking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either record does not exist.
    pub fn add_camera_lens(&self, camera_id: i64, lens_id: i64) -> Result<()> {
        if self.get_camera(camera_id)?.is_none() {
            return Err(Error::not_found("camera", camera_id));
        }
        if self.get_lens(lens_id)?.is_none() {
            return Err(Error::not_found("lens", lens_id));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO link_camera_lens (camera_id, lens_id) VALUES (?1, ?2)",
            params![camera_id, lens_id],
        )?;
        debug!("Linked lens {} to camera {}", lens_id, camera_id);
        Ok(())
    }

    /// Remove a camera/lens link. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_camera_lens(&self, camera_id: i64, lens_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM link_camera_lens WHERE camera_id = ?1 AND lens_id = ?2",
            params![camera_id, lens_id],
        )?;
        Ok(affected > 0)
    }

    /// Lenses mountable on a camera.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn lenses_for_camera(&self, camera_id: i64) -> Result<Vec<Lens>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_LENS} JOIN link_camera_lens AS link ON link.lens_id = lenses.id \
             WHERE link.camera_id = ?1 \
             ORDER BY lenses.make COLLATE NOCASE, lenses.model COLLATE NOCASE"
        ))?;
        let lenses = stmt
            .query_map([camera_id], row_to_lens)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lenses)
    }

    /// Cameras a lens can be mounted on.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cameras_for_lens(&self, lens_id: i64) -> Result<Vec<Camera>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT cameras.id, cameras.make, cameras.model, cameras.serial_number,
                   cameras.min_shutter, cameras.max_shutter,
                   cameras.shutter_increments, cameras.exposure_comp_increments
            FROM cameras
            JOIN link_camera_lens AS link ON link.camera_id = cameras.id
            WHERE link.lens_id = ?1
            ORDER BY cameras.make COLLATE NOCASE, cameras.model COLLATE NOCASE
            ",
        )?;
        let cameras = stmt
            .query_map([lens_id], row_to_camera)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cameras)
    }

    /// Mark a filter as mountable on a lens. Linking twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either record does not exist.
    pub fn add_lens_filter(&self, lens_id: i64, filter_id: i64) -> Result<()> {
        if self.get_lens(lens_id)?.is_none() {
            return Err(Error::not_found("lens", lens_id));
        }
        if self.get_filter(filter_id)?.is_none() {
            return Err(Error::not_found("filter", filter_id));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO link_lens_filter (lens_id, filter_id) VALUES (?1, ?2)",
            params![lens_id, filter_id],
        )?;
        debug!("Linked filter {} to lens {}", filter_id, lens_id);
        Ok(())
    }

    /// Remove a lens/filter link. Returns `true` if one existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_lens_filter(&self, lens_id: i64, filter_id: i64) -> Result<bool> {
        let affected = self.conn.execute(
            "DELETE FROM link_lens_filter WHERE lens_id = ?1 AND filter_id = ?2",
            params![lens_id, filter_id],
        )?;
        Ok(affected > 0)
    }

    /// Filters mountable on a lens.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn filters_for_lens(&self, lens_id: i64) -> Result<Vec<Filter>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_FILTER} JOIN link_lens_filter AS link ON link.filter_id = filters.id \
             WHERE link.lens_id = ?1 \
             ORDER BY filters.make COLLATE NOCASE, filters.model COLLATE NOCASE"
        ))?;
        let filters = stmt
            .query_map([lens_id], row_to_filter)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(filters)
    }

    /// Lenses a filter fits.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn lenses_for_filter(&self, filter_id: i64) -> Result<Vec<Lens>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_LENS} JOIN link_lens_filter AS link ON link.lens_id = lenses.id \
             WHERE link.filter_id = ?1 \
             ORDER BY lenses.make COLLATE NOCASE, lenses.model COLLATE NOCASE"
        ))?;
        let lenses = stmt
            .query_map([filter_id], row_to_lens)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(lenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Storage, i64, i64, i64) {
        let storage = Storage::open_in_memory().unwrap();
        let camera = storage.add_camera(&Camera::new("Nikon", "F3")).unwrap();
        let lens = storage.add_lens(&Lens::new("Nikon", "AI 50mm")).unwrap();
        let filter = storage.add_filter(&Filter::new("Nikon", "Y48")).unwrap();
        (storage, camera, lens, filter)
    }

    #[test]
    fn test_camera_lens_links() {
        let (storage, camera, lens, _) = setup();
        storage.add_camera_lens(camera, lens).unwrap();
        storage.add_camera_lens(camera, lens).unwrap();

        let lenses = storage.lenses_for_camera(camera).unwrap();
        assert_eq!(lenses.len(), 1);
        assert_eq!(lenses[0].id, Some(lens));
        assert_eq!(storage.cameras_for_lens(lens).unwrap()[0].id, Some(camera));

        assert!(storage.remove_camera_lens(camera, lens).unwrap());
        assert!(!storage.remove_camera_lens(camera, lens).unwrap());
        assert!(storage.lenses_for_camera(camera).unwrap().is_empty());
    }

    #[test]
    fn test_lens_filter_links() {
        let (storage, _, lens, filter) = setup();
        storage.add_lens_filter(lens, filter).unwrap();

        assert_eq!(storage.filters_for_lens(lens).unwrap()[0].id, Some(filter));
        assert_eq!(storage.lenses_for_filter(filter).unwrap()[0].id, Some(lens));

        assert!(storage.remove_lens_filter(lens, filter).unwrap());
        assert!(storage.filters_for_lens(lens).unwrap().is_empty());
    }

    #[test]
    fn test_link_to_missing_record() {
        let (storage, camera, lens, _) = setup();
        assert!(storage.add_camera_lens(camera, lens + 10).unwrap_err().is_not_found());
        assert!(storage.add_lens_filter(lens, 77).unwrap_err().is_not_found());
    }

    #[test]
    fn test_deleting_lens_removes_links() {
        let (storage, camera, lens, filter) = setup();
        storage.add_camera_lens(camera, lens).unwrap();
        storage.add_lens_filter(lens, filter).unwrap();

        storage.delete_lens(lens).unwrap();
        assert!(storage.lenses_for_camera(camera).unwrap().is_empty());
        assert!(storage.lenses_for_filter(filter).unwrap().is_empty());
    }
}
