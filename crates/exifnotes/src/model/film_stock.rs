use std::fmt;

use serde::{Deserialize, Serialize};

use super::{require_text, FilmProcess, FilmType};
use crate::error::{Error, Result};

/// Highest ISO accepted for a film stock or roll.
pub const MAX_ISO: u32 = 1_000_000;

/// A type of film.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilmStock {
    /// Row id, `None` until stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Manufacturer.
    pub make: String,
    /// Model name.
    pub model: String,
    /// Box speed, 0 when unknown.
    pub iso: u32,
    /// Emulsion type.
    pub film_type: FilmType,
    /// Development process.
    pub process: FilmProcess,
    /// Whether the stock came from the built-in catalog.
    pub preadded: bool,
}

impl FilmStock {
    /// Create a user-defined film stock.
    #[must_use]
    pub fn new(make: impl Into<String>, model: impl Into<String>, iso: u32) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            iso,
            ..Self::default()
        }
    }

    fn catalog(make: &str, model: &str, iso: u32, film_type: FilmType, process: FilmProcess) -> Self {
        Self {
            id: None,
            make: make.to_string(),
            model: model.to_string(),
            iso,
            film_type,
            process,
            preadded: true,
        }
    }

    /// Check the film stock before it is written.
    ///
    /// # Errors
    ///
    /// Returns a validation error when make or model is blank or the ISO is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        require_text("film stock", "make", &self.make)?;
        require_text("film stock", "model", &self.model)?;
        if self.iso > MAX_ISO {
            return Err(Error::validation(
                "film stock",
                format!("ISO {} exceeds {MAX_ISO}", self.iso),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for FilmStock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.make, self.model)
    }
}

/// Film stocks seeded into a new database.
#[must_use]
pub fn builtin_catalog() -> Vec<FilmStock> {
    use FilmProcess::{Bw, Ecn2, C41, E6};
    use FilmType::{BwNegative, ColorCine, ColorNegative, ColorReversal};

    vec![
        FilmStock::catalog("Kodak", "Portra 160", 160, ColorNegative, C41),
        FilmStock::catalog("Kodak", "Portra 400", 400, ColorNegative, C41),
        FilmStock::catalog("Kodak", "Portra 800", 800, ColorNegative, C41),
        FilmStock::catalog("Kodak", "Ektar 100", 100, ColorNegative, C41),
        FilmStock::catalog("Kodak", "Gold 200", 200, ColorNegative, C41),
        FilmStock::catalog("Kodak", "ColorPlus 200", 200, ColorNegative, C41),
        FilmStock::catalog("Kodak", "UltraMax 400", 400, ColorNegative, C41),
        FilmStock::catalog("Kodak", "Ektachrome E100", 100, ColorReversal, E6),
        FilmStock::catalog("Kodak", "Tri-X 400", 400, BwNegative, Bw),
        FilmStock::catalog("Kodak", "T-Max 100", 100, BwNegative, Bw),
        FilmStock::catalog("Kodak", "T-Max 400", 400, BwNegative, Bw),
        FilmStock::catalog("Kodak", "Vision3 250D", 250, ColorCine, Ecn2),
        FilmStock::catalog("Kodak", "Vision3 500T", 500, ColorCine, Ecn2),
        FilmStock::catalog("Ilford", "HP5 Plus", 400, BwNegative, Bw),
        FilmStock::catalog("Ilford", "FP4 Plus", 125, BwNegative, Bw),
        FilmStock::catalog("Ilford", "Delta 100", 100, BwNegative, Bw),
        FilmStock::catalog("Ilford", "Delta 400", 400, BwNegative, Bw),
        FilmStock::catalog("Ilford", "Delta 3200", 3200, BwNegative, Bw),
        FilmStock::catalog("Ilford", "Pan F Plus", 50, BwNegative, Bw),
        FilmStock::catalog("Ilford", "XP2 Super", 400, BwNegative, C41),
        FilmStock::catalog("Fujifilm", "Velvia 50", 50, ColorReversal, E6),
        FilmStock::catalog("Fujifilm", "Velvia 100", 100, ColorReversal, E6),
        FilmStock::catalog("Fujifilm", "Provia 100F", 100, ColorReversal, E6),
        FilmStock::catalog("Fujifilm", "Superia X-TRA 400", 400, ColorNegative, C41),
        FilmStock::catalog("Fujifilm", "Acros 100 II", 100, BwNegative, Bw),
        FilmStock::catalog("CineStill", "800T", 800, ColorNegative, C41),
        FilmStock::catalog("CineStill", "50D", 50, ColorNegative, C41),
        FilmStock::catalog("Foma", "Fomapan 100", 100, BwNegative, Bw),
        FilmStock::catalog("Foma", "Fomapan 400", 400, BwNegative, Bw),
    ]
}
