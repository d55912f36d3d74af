use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{ensure_found, parsed_column, require_id, required_parsed_column, Storage};
use crate::error::Result;
use crate::model::Camera;

const ENTITY: &str = "camera";

const SELECT_CAMERA: &str = r"
    SELECT id, make, model, serial_number, min_shutter, max_shutter,
           shutter_increments, exposure_comp_increments
    FROM cameras
";

impl Storage {
    /// Insert a camera and return its id.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an invalid camera, or a database error.
    pub fn add_camera(&self, camera: &Camera) -> Result<i64> {
        camera.validate()?;
        self.conn.execute(
            r"
            INSERT INTO cameras (make, model, serial_number, min_shutter, max_shutter,
                                 shutter_increments, exposure_comp_increments)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                camera.make.trim(),
                camera.model.trim(),
                camera.serial_number,
                camera.min_shutter.map(|s| s.to_string()),
                camera.max_shutter.map(|s| s.to_string()),
                camera.shutter_increments.to_string(),
                camera.exposure_comp_increments.to_string(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!("Inserted camera {} ({})", id, camera);
        Ok(id)
    }

    /// Overwrite a stored camera.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no camera has the record's id.
    pub fn update_camera(&self, camera: &Camera) -> Result<()> {
        let id = require_id(ENTITY, camera.id)?;
        camera.validate()?;
        let affected = self.conn.execute(
            r"
            UPDATE cameras SET make = ?2, model = ?3, serial_number = ?4, min_shutter = ?5,
                               max_shutter = ?6, shutter_increments = ?7,
                               exposure_comp_increments = ?8
            WHERE id = ?1
            ",
            params![
                id,
                camera.make.trim(),
                camera.model.trim(),
                camera.serial_number,
                camera.min_shutter.map(|s| s.to_string()),
                camera.max_shutter.map(|s| s.to_string()),
                camera.shutter_increments.to_string(),
                camera.exposure_comp_increments.to_string(),
            ],
        )?;
        ensure_found(ENTITY, id, affected)?;
        debug!("Updated camera {}", id);
        Ok(())
    }

    /// Get a camera by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_camera(&self, id: i64) -> Result<Option<Camera>> {
        let camera = self
            .conn
            .query_row(&format!("{SELECT_CAMERA} WHERE id = ?1"), [id], row_to_camera)
            .optional()?;
        Ok(camera)
    }

    /// All cameras ordered by make and model.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_cameras(&self) -> Result<Vec<Camera>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_CAMERA} ORDER BY make COLLATE NOCASE, model COLLATE NOCASE"))?;
        let cameras = stmt
            .query_map([], row_to_camera)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(cameras)
    }

    /// Delete a camera. Rolls shot with it keep their frames but lose the
    /// reference.
    ///
    /// Returns `true` if a camera was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_camera(&self, id: i64) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM cameras WHERE id = ?1", [id])?;
        if affected > 0 {
            debug!("Deleted camera {}", id);
        }
        Ok(affected > 0)
    }

    /// Check whether any roll references the camera.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_camera_in_use(&self, id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rolls WHERE camera_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

pub(super) fn row_to_camera(row: &Row) -> rusqlite::Result<Camera> {
    Ok(Camera {
        id: Some(row.get(0)?),
        make: row.get(1)?,
        model: row.get(2)?,
        serial_number: row.get(3)?,
        min_shutter: parsed_column(row, 4)?,
        max_shutter: parsed_column(row, 5)?,
        shutter_increments: required_parsed_column(row, 6)?,
        exposure_comp_increments: required_parsed_column(row, 7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exposure::{CompIncrement, Increment, ShutterSpeed};
    use crate::model::Roll;

    fn fm2() -> Camera {
        let mut camera = Camera::new("Nikon", "FM2");
        camera.serial_number = Some("N123".to_string());
        camera.min_shutter = Some(ShutterSpeed::Fraction(4000));
        camera.max_shutter = Some(ShutterSpeed::Seconds(10));
        camera.shutter_increments = Increment::Full;
        camera.exposure_comp_increments = CompIncrement::Half;
        camera
    }

    #[test]
    fn test_add_and_get() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.add_camera(&fm2()).unwrap();

        let stored = storage.get_camera(id).unwrap().unwrap();
        let mut expected = fm2();
        expected.id = Some(id);
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_empty_make_and_model_rejected() {
        let storage = Storage::open_in_memory().unwrap();
        let err = storage.add_camera(&Camera::new("", "")).unwrap_err();
        assert!(err.is_validation());
        assert!(storage.list_cameras().unwrap().is_empty());
    }

    #[test]
    fn test_update() {
        let storage = Storage::open_in_memory().unwrap();
        let id = storage.add_camera(&fm2()).unwrap();

        let mut camera = storage.get_camera(id).unwrap().unwrap();
        camera.model = "FM3A".to_string();
        storage.update_camera(&camera).unwrap();
        assert_eq!(storage.get_camera(id).unwrap().unwrap().model, "FM3A");
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let storage = Storage::open_in_memory().unwrap();
        let mut camera = fm2();
        camera.id = Some(42);
        assert!(storage.update_camera(&camera).unwrap_err().is_not_found());

        camera.id = None;
        assert!(storage.update_camera(&camera).unwrap_err().is_validation());
    }

    #[test]
    fn test_list_sorted() {
        let storage = Storage::open_in_memory().unwrap();
        storage.add_camera(&Camera::new("Pentax", "MX")).unwrap();
        storage.add_camera(&Camera::new("canon", "AE-1")).unwrap();
        storage.add_camera(&Camera::new("Nikon", "F3")).unwrap();

        let makes: Vec<String> = storage
            .list_cameras()
            .unwrap()
            .into_iter()
            .map(|c| c.make)
            .collect();
        assert_eq!(makes, vec!["canon", "Nikon", "Pentax"]);
    }

    #[test]
    fn test_delete_clears_roll_reference() {
        let storage = Storage::open_in_memory().unwrap();
        let camera_id = storage.add_camera(&fm2()).unwrap();
        let mut roll = Roll::new("Street");
        roll.camera_id = Some(camera_id);
        let roll_id = storage.add_roll(&roll).unwrap();

        assert!(storage.is_camera_in_use(camera_id).unwrap());
        assert!(storage.delete_camera(camera_id).unwrap());
        assert!(!storage.delete_camera(camera_id).unwrap());

        let roll = storage.get_roll(roll_id).unwrap().unwrap();
        assert!(roll.camera_id.is_none());
    }
}
