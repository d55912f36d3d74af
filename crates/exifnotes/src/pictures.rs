//! Complementary pictures: reference snapshots attached to frames.
//!
//! Imported pictures are downsized, re-encoded as JPEG and stored under a
//! content-derived name so importing the same file twice is idempotent.

use std::collections::BTreeSet;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};

const NAME_HASH_LEN: usize = 16;
const PARTIAL_SUFFIX: &str = ".part";

/// Directory of compressed complementary pictures.
#[derive(Debug, Clone)]
pub struct PictureStore {
    dir: PathBuf,
    max_dimension: u32,
    jpeg_quality: u8,
}

impl PictureStore {
    /// Create a store rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_dimension: u32, jpeg_quality: u8) -> Self {
        Self {
            dir: dir.into(),
            max_dimension,
            jpeg_quality,
        }
    }

    /// Create a store from the `[storage]` and `[pictures]` settings.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.pictures_dir(),
            config.pictures.max_dimension,
            config.pictures.jpeg_quality,
        )
    }

    /// Directory the pictures live in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stored picture.
    #[must_use]
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Import an image file and return the stored file name.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the source cannot be read or the result
    /// cannot be written, and a picture error if decoding or encoding fails.
    pub fn import(&self, source: &Path) -> Result<String> {
        let bytes = fs::read(source)?;
        let hash = blake3::hash(&bytes).to_hex();
        let filename = format!("{}.jpg", &hash.as_str()[..NAME_HASH_LEN]);
        let target = self.path_of(&filename);

        if target.exists() {
            debug!("Picture {} already stored", filename);
            return Ok(filename);
        }

        let mut image = image::load_from_memory(&bytes)?;
        if image.width() > self.max_dimension || image.height() > self.max_dimension {
            image = image.resize(self.max_dimension, self.max_dimension, FilterType::Lanczos3);
        }

        fs::create_dir_all(&self.dir).map_err(|e| Error::DirectoryCreate {
            path: self.dir.clone(),
            source: e,
        })?;

        // Encode to a partial file, rename once complete
        let partial = self.path_of(&format!(".{filename}{PARTIAL_SUFFIX}"));
        if let Err(e) = self.write_jpeg(&image, &partial) {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!("No partial picture to remove at {}: {}", partial.display(), cleanup);
            }
            return Err(e);
        }
        fs::rename(&partial, &target)?;

        info!(
            "Stored picture {} ({}x{}) from {}",
            filename,
            image.width(),
            image.height(),
            source.display()
        );
        Ok(filename)
    }

    fn write_jpeg(&self, image: &image::DynamicImage, path: &Path) -> Result<()> {
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, self.jpeg_quality).encode_image(&image.to_rgb8())?;
        writer.flush()?;
        Ok(())
    }

    /// Run [`PictureStore::import`] on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Same as [`PictureStore::import`], plus an internal error if the task
    /// panics.
    pub async fn import_in_background(&self, source: PathBuf) -> Result<String> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.import(&source))
            .await
            .map_err(|e| Error::internal(format!("picture import task failed: {e}")))?
    }

    /// Stored pictures whose names are not in `referenced`, sorted.
    ///
    /// Only files named the way [`PictureStore::import`] names them are
    /// considered. Anything else in the directory is left alone.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be listed.
    pub fn unused(&self, referenced: &BTreeSet<String>) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut unused = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_stored_name(&name) && !referenced.contains(&name) {
                unused.push(name);
            }
        }
        unused.sort();
        Ok(unused)
    }

    /// Delete stored pictures whose names are not in `referenced`.
    /// Returns the deleted names.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be listed.
    pub fn remove_unused(&self, referenced: &BTreeSet<String>) -> Result<Vec<String>> {
        let mut removed = Vec::new();
        for name in self.unused(referenced)? {
            match fs::remove_file(self.path_of(&name)) {
                Ok(()) => removed.push(name),
                Err(e) => warn!("Could not remove unused picture {}: {}", name, e),
            }
        }

        if !removed.is_empty() {
            info!("Removed {} unused picture(s)", removed.len());
        }
        Ok(removed)
    }
}

/// Whether `name` has the shape of a name [`PictureStore::import`] produces:
/// lowercase hex hash prefix plus `.jpg`.
#[must_use]
pub fn is_stored_name(name: &str) -> bool {
    name.strip_suffix(".jpg").is_some_and(|stem| {
        stem.len() == NAME_HASH_LEN
            && stem
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}
