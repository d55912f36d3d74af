//! Configuration management for exifnotes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::storage::{FrameSort, RollSort};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "exifnotes";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "exifnotes.db";

/// Default directory name for complementary pictures.
const PICTURES_DIR_NAME: &str = "pictures";

/// Environment variable prefix. Nested keys are separated by `__`,
/// e.g. `EXIFNOTES_GEOCODING__API_KEY`.
const ENV_PREFIX: &str = "EXIFNOTES_";

/// Google Geocoding API endpoint.
pub const DEFAULT_GEOCODING_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `EXIFNOTES_`)
/// 2. TOML config file at `~/.config/exifnotes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// EXIF export configuration.
    pub exif: ExifConfig,
    /// Geocoding configuration.
    pub geocoding: GeocodingConfig,
    /// Complementary picture configuration.
    pub pictures: PicturesConfig,
    /// List display configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/exifnotes/exifnotes.db`
    pub database_path: Option<PathBuf>,
    /// Directory for complementary pictures.
    /// Defaults to `~/.local/share/exifnotes/pictures`
    pub pictures_dir: Option<PathBuf>,
}

/// Settings used when exporting a roll as CSV or ExifTool commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExifConfig {
    /// Written to the `Artist` tag.
    pub artist_name: Option<String>,
    /// Written to the `Copyright` tag.
    pub copyright_info: Option<String>,
    /// ExifTool executable. Defaults to `exiftool` on the `PATH`.
    pub exiftool_path: Option<PathBuf>,
    /// Directory holding the scanned pictures.
    pub pictures_path: Option<PathBuf>,
    /// Extension of the scanned pictures, dot included.
    pub file_ending: String,
    /// Pass `-m` so ExifTool ignores minor warnings.
    pub ignore_warnings: bool,
}

/// Geocoding-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    /// API key for the geocoding service.
    pub api_key: Option<String>,
    /// Endpoint URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Complementary picture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PicturesConfig {
    /// Longest edge of a stored picture in pixels.
    pub max_dimension: u32,
    /// JPEG quality, 1 to 100.
    pub jpeg_quality: u8,
}

/// Default ordering of lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Ordering of `roll list`.
    pub roll_sort: RollSort,
    /// Ordering of `frame list`.
    pub frame_sort: FrameSort,
}

impl Default for ExifConfig {
    fn default() -> Self {
        Self {
            artist_name: None,
            copyright_info: None,
            exiftool_path: None,
            pictures_path: None,
            file_ending: ".jpg".to_string(),
            ignore_warnings: false,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_GEOCODING_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for PicturesConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1024,
            jpeg_quality: 80,
        }
    }
}

impl ExifConfig {
    /// The ExifTool executable to invoke.
    #[must_use]
    pub fn exiftool(&self) -> PathBuf {
        self.exiftool_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("exiftool"))
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `EXIFNOTES_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.pictures.jpeg_quality) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "jpeg_quality must be between 1 and 100, got {}",
                    self.pictures.jpeg_quality
                ),
            });
        }

        if self.pictures.max_dimension == 0 {
            return Err(Error::ConfigValidation {
                message: "max_dimension must be greater than 0".to_string(),
            });
        }

        if self.geocoding.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        let endpoint = self.geocoding.endpoint.as_str();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(Error::ConfigValidation {
                message: format!("geocoding endpoint must be an http(s) URL: {endpoint}"),
            });
        }

        let ending = self.exif.file_ending.as_str();
        if ending.len() < 2 || !ending.starts_with('.') {
            return Err(Error::ConfigValidation {
                message: format!("file_ending must start with '.', got '{ending}'"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the pictures directory, resolving defaults if not set.
    #[must_use]
    pub fn pictures_dir(&self) -> PathBuf {
        self.storage
            .pictures_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(PICTURES_DIR_NAME))
    }

    /// Get the geocoding timeout as a Duration.
    #[must_use]
    pub fn geocoding_timeout(&self) -> Duration {
        Duration::from_secs(self.geocoding.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.exif.file_ending, ".jpg");
        assert!(!config.exif.ignore_warnings);
        assert_eq!(config.geocoding.endpoint, DEFAULT_GEOCODING_ENDPOINT);
        assert_eq!(config.geocoding.timeout_secs, 10);
        assert_eq!(config.pictures.max_dimension, 1024);
        assert_eq!(config.pictures.jpeg_quality, 80);
        assert_eq!(config.display.roll_sort, RollSort::Date);
        assert_eq!(config.display.frame_sort, FrameSort::Count);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_jpeg_quality() {
        let mut config = Config::default();
        config.pictures.jpeg_quality = 0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("jpeg_quality"));

        config.pictures.jpeg_quality = 101;
        assert!(config.validate().is_err());

        config.pictures.jpeg_quality = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_dimension_and_timeout() {
        let mut config = Config::default();
        config.pictures.max_dimension = 0;
        assert!(config.validate().unwrap_err().to_string().contains("max_dimension"));

        let mut config = Config::default();
        config.geocoding.timeout_secs = 0;
        assert!(config.validate().unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validate_endpoint_scheme() {
        let mut config = Config::default();
        config.geocoding.endpoint = "ftp://example.com".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("endpoint"));

        config.geocoding.endpoint = "http://localhost:8080/geocode".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_file_ending() {
        let mut config = Config::default();
        config.exif.file_ending = "jpg".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("file_ending"));

        config.exif.file_ending = ".".to_string();
        assert!(config.validate().is_err());

        config.exif.file_ending = ".tif".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("exifnotes.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));
        assert_eq!(config.database_path(), PathBuf::from("/custom/path/db.sqlite"));
    }

    #[test]
    fn test_pictures_dir_default() {
        let path = Config::default().pictures_dir();
        assert!(path.ends_with("exifnotes/pictures"));
    }

    #[test]
    fn test_exiftool_default() {
        let mut exif = ExifConfig::default();
        assert_eq!(exif.exiftool(), PathBuf::from("exiftool"));
        exif.exiftool_path = Some(PathBuf::from("/opt/bin/exiftool"));
        assert_eq!(exif.exiftool(), PathBuf::from("/opt/bin/exiftool"));
    }

    #[test]
    fn test_geocoding_timeout() {
        assert_eq!(Config::default().geocoding_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("exifnotes"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.pictures, PicturesConfig::default());
        assert_eq!(config.exif.file_ending, ".jpg");
    }

    #[test]
    fn test_load_toml_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [exif]
            artist_name = "Ansel Adams"
            ignore_warnings = true

            [pictures]
            jpeg_quality = 90

            [display]
            roll_sort = "name"
            frame_sort = "f_stop"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.exif.artist_name.as_deref(), Some("Ansel Adams"));
        assert!(config.exif.ignore_warnings);
        assert_eq!(config.exif.file_ending, ".jpg");
        assert_eq!(config.pictures.jpeg_quality, 90);
        assert_eq!(config.pictures.max_dimension, 1024);
        assert_eq!(config.display.roll_sort, RollSort::Name);
        assert_eq!(config.display.frame_sort, FrameSort::FStop);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pictures]\njpeg_quality = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("jpeg_quality"));
        assert!(json.contains("\"roll_sort\":\"date\""));
    }
}
