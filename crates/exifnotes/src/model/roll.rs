use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{now_local, require_text, FilmFormat, MAX_ISO};
use crate::error::{Error, Result};
use crate::exposure::{ExposureOffset, MAX_OFFSET_STOPS};

const ENTITY: &str = "roll";

/// One roll of film.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roll {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Display name.
    pub name: String,
    /// When the roll was loaded.
    pub date: NaiveDateTime,
    /// When the roll was taken out of the camera.
    pub unloaded: Option<NaiveDateTime>,
    /// When the roll was developed.
    pub developed: Option<NaiveDateTime>,
    /// Free-text note.
    pub note: Option<String>,
    /// Camera the roll was shot in.
    pub camera_id: Option<i64>,
    /// Film stock of the roll.
    pub film_stock_id: Option<i64>,
    /// Speed the roll was rated at.
    pub iso: u32,
    /// Push or pull in stops.
    pub push_pull: Option<ExposureOffset>,
    /// Physical format.
    pub format: FilmFormat,
    /// Hidden from the active list.
    pub archived: bool,
}

impl Roll {
    /// Create a roll loaded now.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            date: now_local(),
            unloaded: None,
            developed: None,
            note: None,
            camera_id: None,
            film_stock_id: None,
            iso: 0,
            push_pull: None,
            format: FilmFormat::default(),
            archived: false,
        }
    }

    /// Check the roll before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a blank name, out-of-order dates,
    /// an ISO above [`MAX_ISO`] or a push/pull beyond three stops.
    pub fn validate(&self) -> Result<()> {
        require_text(ENTITY, "name", &self.name)?;

        if self.iso > MAX_ISO {
            return Err(Error::validation(ENTITY, format!("ISO {} exceeds {MAX_ISO}", self.iso)));
        }

        if let Some(unloaded) = self.unloaded {
            if unloaded < self.date {
                return Err(Error::validation(ENTITY, "unloaded date is before the load date"));
            }
        }

        match (self.unloaded, self.developed) {
            (None, Some(_)) => {
                return Err(Error::validation(ENTITY, "a developed roll must have an unloaded date"));
            }
            (Some(unloaded), Some(developed)) if developed < unloaded => {
                return Err(Error::validation(ENTITY, "developed date is before the unloaded date"));
            }
            _ => {}
        }

        if let Some(push_pull) = self.push_pull {
            if push_pull.sixths().abs() > MAX_OFFSET_STOPS * 6 {
                return Err(Error::validation(
                    ENTITY,
                    format!("push/pull {push_pull} exceeds {MAX_OFFSET_STOPS} stops"),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_datetime;

    #[test]
    fn test_new_roll_defaults_date_to_now() {
        let before = now_local();
        let roll = Roll::new("Summer");
        let after = now_local();
        assert!(roll.date >= before && roll.date <= after);
        assert!(!roll.archived);
        assert_eq!(roll.format, FilmFormat::Mm35);
        assert!(roll.validate().is_ok());
    }

    #[test]
    fn test_blank_name_rejected() {
        assert!(Roll::new(" ").validate().is_err());
    }

    #[test]
    fn test_date_order() {
        let mut roll = Roll::new("Trip");
        roll.date = parse_datetime("2024-06-01").unwrap();
        roll.unloaded = Some(parse_datetime("2024-05-31").unwrap());
        assert!(roll.validate().is_err());

        roll.unloaded = Some(parse_datetime("2024-06-10").unwrap());
        roll.developed = Some(parse_datetime("2024-06-09").unwrap());
        assert!(roll.validate().is_err());

        roll.developed = Some(parse_datetime("2024-06-20").unwrap());
        assert!(roll.validate().is_ok());
    }

    #[test]
    fn test_developed_requires_unloaded() {
        let mut roll = Roll::new("Trip");
        roll.developed = Some(now_local());
        let err = roll.validate().unwrap_err();
        assert!(err.to_string().contains("unloaded"));
    }

    #[test]
    fn test_push_pull_limit() {
        let mut roll = Roll::new("Pushed");
        roll.push_pull = Some(ExposureOffset::from_sixths(12));
        assert!(roll.validate().is_ok());
        roll.push_pull = Some(ExposureOffset::from_sixths(24));
        assert!(roll.validate().is_err());
    }
}
