//! `exifnotes` - A metadata logbook for film photographers
//!
//! This library records cameras, lenses, filters and film stocks, the rolls
//! loaded into those cameras and the exposure settings of every frame, and
//! exports a roll as CSV or as ExifTool commands for the scanned pictures.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod exposure;
pub mod geocode;
pub mod logging;
pub mod model;
pub mod pictures;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use exposure::{Aperture, ExposureOffset, FrameValueOptions, Increment, ShutterSpeed};
pub use logging::init_logging;
pub use model::{Camera, FilmStock, Filter, Frame, Lens, Location, Roll};
pub use storage::{Storage, StorageStats};
