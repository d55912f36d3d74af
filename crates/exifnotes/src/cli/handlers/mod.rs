//! Command handlers.
//!
//! Every handler follows the same flow: load what the command refers to,
//! apply the flags, validate, write, then print the result to `out`.

mod frames;
mod gear;
mod rolls;
mod tools;

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tracing::debug;

use super::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::geocode::{Geocoder, GoogleGeocoder};
use crate::pictures::PictureStore;
use crate::storage::Storage;

/// Everything a command needs: configuration, the open database and the
/// geocoding service.
pub struct Context {
    config: Config,
    storage: Storage,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("storage", &self.storage)
            .field("geocoder", &self.geocoder.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl Context {
    /// Create a context over an already opened database.
    #[must_use]
    pub fn new(config: Config, storage: Storage) -> Self {
        Self {
            config,
            storage,
            geocoder: None,
        }
    }

    /// Open the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: Config) -> Result<Self> {
        let storage = Storage::open(config.database_path())?;
        Ok(Self::new(config, storage))
    }

    /// Use `geocoder` instead of the configured Google client.
    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The open database.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    fn geocoder(&self) -> Result<Arc<dyn Geocoder>> {
        match &self.geocoder {
            Some(geocoder) => Ok(Arc::clone(geocoder)),
            None => Ok(Arc::new(GoogleGeocoder::from_config(&self.config.geocoding)?)),
        }
    }

    fn pictures(&self) -> PictureStore {
        PictureStore::from_config(&self.config)
    }

    /// Execute one command, writing its output to `out`.
    ///
    /// # Errors
    ///
    /// Returns the first error the command hits. Validation problems come
    /// back as [`Error::Validation`], [`Error::InvalidValue`] or
    /// [`Error::InUse`] and leave the database untouched.
    pub async fn execute(&self, command: Command, out: &mut dyn Write) -> Result<()> {
        debug!(?command, "Executing command");
        match command {
            Command::Camera(cmd) => gear::camera(self, cmd, out),
            Command::Lens(cmd) => gear::lens(self, cmd, out),
            Command::Filter(cmd) => gear::filter(self, cmd, out),
            Command::Film(cmd) => gear::film(self, cmd, out),
            Command::Roll(cmd) => rolls::roll(self, cmd, out),
            Command::Frame(cmd) => frames::frame(self, cmd, out).await,
            Command::Mount(cmd) => gear::mount(self, cmd, out),
            Command::Values(cmd) => tools::values(self, cmd, out),
            Command::Geocode(cmd) => tools::geocode(self, cmd, out).await,
            Command::Pictures(cmd) => tools::pictures(self, cmd, out),
            Command::Db(cmd) => tools::db(self, cmd, out),
            Command::Status(cmd) => tools::status(self, cmd.json, out),
            Command::Config(cmd) => tools::config(&self.config, cmd, out),
        }
    }
}

/// Run a command against the configured database.
///
/// Configuration commands run without opening the database.
///
/// # Errors
///
/// Returns the error of the command.
pub async fn run(command: Command, config: Config, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Config(cmd) => tools::config(&config, cmd, out),
        other => Context::open(config)?.execute(other, out).await,
    }
}

/// Refuse to delete a record that other records still reference.
fn guard_delete(entity: &'static str, id: i64, in_use: bool, force: bool) -> Result<()> {
    if in_use && !force {
        return Err(Error::InUse { entity, id });
    }
    Ok(())
}

/// Turn a `false` from a delete into `NotFound`.
fn deleted(entity: &'static str, id: i64, removed: bool) -> Result<()> {
    if removed {
        Ok(())
    } else {
        Err(Error::not_found(entity, id))
    }
}

/// Treat an empty string as "clear this field".
fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
